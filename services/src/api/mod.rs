//! JSON endpoints over the record services, mounted at `/api`.
//!
//! Handlers translate the services' neutral defaults into status codes:
//! `None`/`false` become 404, a failed create becomes 502.

mod files;
mod uploads;

use crate::files::FileService;
use crate::records::RecordClient;
use crate::uploads::UploadService;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

/// Shared handler state: both services over the same client.
#[derive(Clone, Debug)]
pub struct AppState<C> {
    pub files: FileService<C>,
    pub uploads: UploadService<C>,
}

impl<C: RecordClient> AppState<C> {
    pub fn new(client: Option<C>, file_url_base: &str) -> Self {
        Self {
            files: FileService::new(client.clone()).with_file_url_base(file_url_base),
            uploads: UploadService::new(client),
        }
    }

    pub fn is_available(&self) -> bool {
        self.files.is_available() && self.uploads.is_available()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: "not_found".to_owned(),
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            error: "bad_gateway".to_owned(),
            message: message.into(),
        }
    }
}

fn found<T: Serialize>(value: Option<T>, what: &str) -> Response {
    match value {
        Some(value) => (StatusCode::OK, Json(value)).into_response(),
        None => not_found(what),
    }
}

fn created<T: Serialize>(value: Option<T>, what: &str) -> Response {
    match value {
        Some(value) => (StatusCode::CREATED, Json(value)).into_response(),
        None => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::bad_gateway(format!("{what} could not be created"))),
        )
            .into_response(),
    }
}

fn deleted(ok: bool, what: &str) -> Response {
    if ok {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(what)
    }
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found(format!("{what} not found"))),
    )
        .into_response()
}

pub fn routes<C: RecordClient>() -> Router<AppState<C>> {
    Router::new()
        .route("/files", get(files::list::<C>).post(files::create::<C>))
        .route(
            "/files/{id}",
            get(files::get::<C>)
                .patch(files::update::<C>)
                .delete(files::delete::<C>),
        )
        .route("/files/{id}/progress", post(files::progress::<C>))
        .route(
            "/uploads",
            get(uploads::list::<C>).post(uploads::create::<C>),
        )
        .route("/uploads/recent", get(uploads::recent::<C>))
        .route("/uploads/share/{link}", get(uploads::by_share_link::<C>))
        .route(
            "/uploads/{id}",
            get(uploads::get::<C>)
                .patch(uploads::update::<C>)
                .delete(uploads::delete::<C>),
        )
}
