use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{downloads, handlers, search, status};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Status reporting (last refresh, catalog size, last batch)
        .route("/status", get(status::get_status))
        // Catalog search
        .route("/search", get(search::search_get))
        .route("/search", post(search::search_post))
        // Tracked downloads
        .route("/downloads", get(downloads::list_downloads))
        .route("/downloads", post(downloads::add_downloads))
        .route("/downloads", delete(downloads::remove_downloads))
        // Provenance
        .route("/recordings", get(downloads::list_recordings))
        .route("/recordings", delete(downloads::remove_recordings))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
