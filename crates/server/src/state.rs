use std::sync::Arc;

use mediathek_core::{Config, SqliteFilmStore};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<SqliteFilmStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<SqliteFilmStore>) -> Self {
        Self { config, store }
    }

    #[allow(dead_code)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SqliteFilmStore {
        self.store.as_ref()
    }
}
