pub mod downloads;
pub mod handlers;
pub mod routes;
pub mod search;
pub mod status;

pub use routes::create_router;

use axum::Json;
use serde::Serialize;

/// Error payload shared by all endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn json(message: impl ToString) -> Json<Self> {
        Json(Self {
            error: message.to_string(),
        })
    }
}
