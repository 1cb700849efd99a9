use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use arogya_krishi::api;
use arogya_krishi::config::{Settings, APP_NAME, APP_VERSION};
use arogya_krishi::core_state::AppState;
use arogya_krishi::db;
use arogya_krishi::pipeline::remedy;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    tracing::info!(
        version = APP_VERSION,
        database = %settings.database_url.display(),
        mock_inference = settings.use_mock_inference,
        "{APP_NAME} starting"
    );

    // Fail fast if the database cannot be created/migrated.
    db::open_database(&settings.database_url)?;
    tracing::info!(
        diseases = remedy::known_diseases().count(),
        "Remedy knowledge base loaded"
    );

    let state = Arc::new(AppState::new(settings));
    api::server::serve(state).await?;

    Ok(())
}
