//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mock_inference: bool,
    pub version: &'static str,
}

/// `GET /api/health` — liveness check.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        mock_inference: ctx.state.settings.use_mock_inference,
        version: crate::config::APP_VERSION,
    }))
}
