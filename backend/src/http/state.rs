//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::db::repository::FullRepository;
use crate::services::SpatialQueryEngine;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for store access
    pub repository: Arc<dyn FullRepository>,
    /// Search engine over the same repository
    pub engine: SpatialQueryEngine,
}

impl AppState {
    /// Create a new application state with the given repository and search defaults.
    pub fn new(repository: Arc<dyn FullRepository>, config: SearchConfig) -> Self {
        let engine = SpatialQueryEngine::new(Arc::clone(&repository), config);
        Self { repository, engine }
    }
}
