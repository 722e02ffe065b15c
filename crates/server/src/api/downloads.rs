//! Tracked-download and recording handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use mediathek_core::{DownloadListRow, DownloadStatus, Recording, StoreError};

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadsQuery {
    /// Comma-separated status filters (codes or names); empty means all.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddDownloadsRequest {
    pub ids: Vec<String>,
    /// Defaults to queued.
    #[serde(default)]
    pub status: Option<DownloadStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveDownloadsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadsResponse {
    pub downloads: Vec<DownloadListRow>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AddDownloadsResponse {
    /// Newly tracked entries; re-selections are ignored.
    pub added: usize,
    /// Ids not present in the current catalog.
    pub unknown: usize,
}

#[derive(Debug, Serialize)]
pub struct RemoveDownloadsResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct RecordingsResponse {
    pub recordings: Vec<Recording>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRecordingsRequest {
    pub file_paths: Vec<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal(e: StoreError) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::json(e))
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<DownloadStatus>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|e: String| (StatusCode::BAD_REQUEST, ErrorResponse::json(e)))
        })
        .collect()
}

/// GET /api/v1/downloads?status=V,F
pub async fn list_downloads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadsQuery>,
) -> Result<Json<DownloadsResponse>, ApiError> {
    let statuses = parse_statuses(params.status.as_deref())?;
    let downloads = state
        .store()
        .read_download_list(&statuses)
        .map_err(internal)?;
    let total = downloads.len();
    Ok(Json(DownloadsResponse { downloads, total }))
}

/// POST /api/v1/downloads - track catalog entries by id.
pub async fn add_downloads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddDownloadsRequest>,
) -> Result<Json<AddDownloadsResponse>, ApiError> {
    let entries = state
        .store()
        .films_by_ids(&request.ids)
        .map_err(internal)?;
    let unknown = request.ids.len() - entries.len();
    let added = state
        .store()
        .save_downloads(&entries, request.status.unwrap_or(DownloadStatus::Queued))
        .map_err(internal)?;
    Ok(Json(AddDownloadsResponse { added, unknown }))
}

/// DELETE /api/v1/downloads
pub async fn remove_downloads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RemoveDownloadsRequest>,
) -> Result<Json<RemoveDownloadsResponse>, ApiError> {
    let removed = state
        .store()
        .delete_downloads(&request.ids)
        .map_err(internal)?;
    Ok(Json(RemoveDownloadsResponse { removed }))
}

/// GET /api/v1/recordings
pub async fn list_recordings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecordingsResponse>, ApiError> {
    let recordings = state.store().read_recordings().map_err(internal)?;
    let total = recordings.len();
    Ok(Json(RecordingsResponse { recordings, total }))
}

/// DELETE /api/v1/recordings
pub async fn remove_recordings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RemoveRecordingsRequest>,
) -> Result<Json<RemoveDownloadsResponse>, ApiError> {
    let removed = state
        .store()
        .delete_recordings(&request.file_paths)
        .map_err(internal)?;
    Ok(Json(RemoveDownloadsResponse { removed }))
}
