use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::FilterState;
use crate::services::{RecommendationProvider, RequestController};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub controller: Arc<RequestController>,
}

/// Inner state that can be modified
pub struct AppStateInner {
    /// Filter selections for the session
    pub filters: FilterState,
}

impl AppState {
    /// Creates a fresh session backed by `provider`
    pub fn new(provider: Arc<dyn RecommendationProvider>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                filters: FilterState::new(),
            })),
            controller: Arc::new(RequestController::new(provider)),
        }
    }
}
