//! Application state shared across all handlers.

use iv_search::ImageSearch;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<ImageSearch>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(search: ImageSearch) -> Self {
        Self {
            search: Arc::new(search),
            start_time: Instant::now(),
        }
    }
}
