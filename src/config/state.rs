// Application state module
// Holds the loaded configuration and the catalog accessor shared by all connections

use crate::catalog::Catalog;

use super::types::Config;

/// Application state, passed explicitly to the server loop and handlers
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            catalog: Catalog::new(&config.store.db_file),
            config: config.clone(),
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
