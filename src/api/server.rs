//! HTTP server lifecycle — bind, serve, shut down cleanly on Ctrl-C.

use std::sync::Arc;

use crate::api::router::api_router;
use crate::core_state::AppState;

/// Bind the configured address and serve the API until shutdown.
pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let addr = state.settings.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "API server listening");

    let app = api_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[tokio::test]
    async fn serve_fails_fast_on_unbindable_address() {
        let settings = Settings {
            bind_addr: "256.0.0.1:0".into(),
            use_mock_inference: true,
            ..Settings::default()
        };
        let state = Arc::new(AppState::new(settings));
        assert!(serve(state).await.is_err());
    }
}
