use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use handlebars::Handlebars;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_MESSAGE: &str = "An error occurred";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Authentication Error</title>
</head>
<body>
  <main>
    <h1>Authentication Error</h1>
    <p>{{message}}</p>
    <a href="/login">Return to Login</a>
  </main>
</body>
</html>
"#;

#[derive(Debug, Default, Deserialize)]
pub struct ErrorPageQuery {
    pub message: Option<String>,
}

/// Render the page. `{{message}}` is HTML-escaped by handlebars.
pub fn render(message: Option<&str>) -> Result<String, handlebars::RenderError> {
    let message = message
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_MESSAGE);
    Handlebars::new().render_template(TEMPLATE, &json!({ "message": message }))
}

pub async fn error_page(Query(query): Query<ErrorPageQuery>) -> Response {
    match render(query.message.as_deref()) {
        Ok(page) => Html(page).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render error page");
            (StatusCode::INTERNAL_SERVER_ERROR, "500").into_response()
        }
    }
}
