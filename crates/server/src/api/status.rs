//! Status reporting handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use mediathek_core::{STATUS_CATALOG_SIZE, STATUS_LAST_DOWNLOAD, STATUS_LAST_REFRESH};

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// When the live catalog was last replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    /// Entry count of the live catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_size: Option<u64>,
    /// When a download batch last finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_download: Option<DateTime<Utc>>,
}

/// GET /api/v1/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let rows = state
        .store()
        .read_status(&[STATUS_LAST_REFRESH, STATUS_CATALOG_SIZE, STATUS_LAST_DOWNLOAD])
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::json(e)))?;

    let mut response = StatusResponse {
        last_refresh: None,
        catalog_size: None,
        last_download: None,
    };
    for row in rows {
        match row.key.as_str() {
            STATUS_LAST_REFRESH => response.last_refresh = Some(row.timestamp),
            STATUS_LAST_DOWNLOAD => response.last_download = Some(row.timestamp),
            STATUS_CATALOG_SIZE => {
                response.catalog_size = row.text.as_deref().and_then(|t| t.parse().ok());
            }
            _ => {}
        }
    }
    Ok(Json(response))
}
