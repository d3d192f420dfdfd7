//! `/api/uploads` handlers.

use super::{AppState, created, deleted, found};
use crate::records::RecordClient;
use crate::uploads::{NewUpload, UploadRecord, UploadUpdate};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

pub async fn list<C: RecordClient>(State(state): State<AppState<C>>) -> Json<Vec<UploadRecord>> {
    Json(state.uploads.get_all().await)
}

pub async fn create<C: RecordClient>(
    State(state): State<AppState<C>>,
    Json(upload): Json<NewUpload>,
) -> Response {
    created(state.uploads.create(upload).await, "upload")
}

pub async fn recent<C: RecordClient>(
    State(state): State<AppState<C>>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<UploadRecord>> {
    Json(state.uploads.get_recent(query.limit).await)
}

pub async fn by_share_link<C: RecordClient>(
    State(state): State<AppState<C>>,
    Path(link): Path<String>,
) -> Response {
    found(state.uploads.get_by_share_link(&link).await, "upload")
}

pub async fn get<C: RecordClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Response {
    found(state.uploads.get_by_id(id).await, "upload")
}

pub async fn update<C: RecordClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(update): Json<UploadUpdate>,
) -> Response {
    found(state.uploads.update(id, update).await, "upload")
}

pub async fn delete<C: RecordClient>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Response {
    deleted(state.uploads.delete(id).await, "upload")
}
