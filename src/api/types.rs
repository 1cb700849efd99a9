//! Shared context handed to every endpoint handler.

use std::sync::Arc;

use crate::core_state::AppState;

/// Cloneable handler state — one `Arc<AppState>` behind every route.
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
}

impl ApiContext {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}
