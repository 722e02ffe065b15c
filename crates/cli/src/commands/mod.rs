//! Subcommand implementations.

pub mod download;
pub mod list;
pub mod search;
pub mod select;
pub mod update;

use std::sync::Arc;

use mediathek_core::{Config, SqliteFilmStore};

/// Everything a subcommand needs.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteFilmStore>,
    /// Non-interactive mode: selections include every match.
    pub batch: bool,
}
