//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::AppState;

/// Build the API router.
///
/// The transport body limit sits above the configured image cap so the
/// size check in the detect handler is the one that answers with 413.
pub fn api_router(state: Arc<AppState>) -> Router {
    let ctx = ApiContext::new(state);
    let body_limit = ctx.state.settings.max_image_size_bytes() + 64 * 1024;

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/detect-image", post(endpoints::detect::detect_image))
        .route("/nearby-alerts", get(endpoints::alerts::nearby))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
}
