//! Catalog search handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use mediathek_core::{FilmEntry, StoreError};

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Whitespace-separated search terms.
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub terms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub entries: Vec<FilmEntry>,
    pub total: usize,
}

/// GET /api/v1/search?q=...
pub async fn search_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let terms: Vec<String> = params
        .q
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    run_search(&state, &terms)
}

/// POST /api/v1/search with an explicit token list.
pub async fn search_post(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    run_search(&state, &request.terms)
}

fn run_search(
    state: &AppState,
    terms: &[String],
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().search(terms) {
        Ok(entries) => {
            let total = entries.len();
            Ok(Json(SearchResponse { entries, total }))
        }
        Err(StoreError::Query(e)) => Err((StatusCode::BAD_REQUEST, ErrorResponse::json(e))),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::json(e))),
    }
}
