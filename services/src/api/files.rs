//! `/api/files` handlers.

use super::{AppState, created, deleted, found};
use crate::files::{FileRecord, FileUpdate, NewFile};
use crate::records::RecordClient;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: u32,
}

pub async fn list<C: RecordClient>(
    State(state): State<AppState<C>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<FileRecord>> {
    let files = match query.status {
        Some(status) => state.files.get_by_status(status).await,
        None => state.files.get_all().await,
    };
    Json(files)
}

pub async fn create<C: RecordClient>(
    State(state): State<AppState<C>>,
    Json(file): Json<NewFile>,
) -> Response {
    created(state.files.create(file).await, "file")
}

pub async fn get<C: RecordClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Response {
    found(state.files.get_by_id(id).await, "file")
}

pub async fn update<C: RecordClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(update): Json<FileUpdate>,
) -> Response {
    found(state.files.update(id, update).await, "file")
}

pub async fn delete<C: RecordClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Response {
    deleted(state.files.delete(id).await, "file")
}

pub async fn progress<C: RecordClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(request): Json<ProgressRequest>,
) -> Response {
    found(
        state.files.update_progress(id, request.progress).await,
        "file",
    )
}
