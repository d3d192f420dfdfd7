use crate::api::AppState;
use crate::config::Config;
use crate::records::RecordClient;
use axum::{
    Router,
    extract::{Extension, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{any, get},
};
use chrono::SecondsFormat;
use dropvault_utils::version_info::{RuntimeEnv, format_version_for_runtime_env};
use opentelemetry::{global, propagation::Extractor};
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub mod api;
pub mod config;
pub mod file_ids;
pub mod files;
pub mod guard;
pub mod pages;
pub mod records;
pub mod telemetry;
pub mod uploads;

mod table;

struct HeaderExtractor<'a>(&'a axum::http::HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Current UTC time as `2026-01-01T00:00:00.000Z`.
pub(crate) fn iso8601_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the application router over `client`.
///
/// `None` serves every route, but each service call yields its neutral
/// default and the health check reports 502.
pub fn routes<C: RecordClient>(client: Option<C>, config: Config) -> Router {
    let state = AppState::new(client, config.file_url_base());

    Router::new()
        .route("/is-health", get(health_check::<C>))
        .route("/error", get(pages::error::error_page))
        .nest("/api", api::routes::<C>())
        .fallback(any(catch_all))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let parent_context = global::get_text_map_propagator(|propagator| {
                    propagator.extract(&HeaderExtractor(request.headers()))
                });

                let span = tracing::info_span!(
                    "http_request",
                    http_request.method = ?request.method(),
                    http_request.uri = ?request.uri(),
                    http_request.version = ?request.version(),
                    http_request.user_agent = ?request.headers().get(axum::http::header::USER_AGENT),
                );
                span.set_parent(parent_context);

                span
            }),
        )
        .layer(Extension(config))
        .with_state(state)
}

async fn health_check<C: RecordClient>(
    State(state): State<AppState<C>>,
    Extension(config): Extension<Config>,
) -> impl IntoResponse {
    let mut response = if state.is_available() {
        (StatusCode::OK, "OK").into_response()
    } else {
        (StatusCode::BAD_GATEWAY, "502").into_response()
    };

    let headers = response.headers_mut();
    if let Ok(env) = HeaderValue::from_str(&config.environment().to_string()) {
        headers.insert(HeaderName::from_static("x-service-env"), env);
    }
    let runtime_env: RuntimeEnv = config.environment().into();
    if let Ok(version) = HeaderValue::from_str(&format_version_for_runtime_env(runtime_env)) {
        headers.insert(HeaderName::from_static("x-service-version"), version);
    }

    response
}

async fn catch_all() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
