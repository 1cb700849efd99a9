//! Shared application state.
//!
//! One `AppState` is built at startup, wrapped in `Arc` and handed to the
//! router. It owns the settings, the advisory generator, and the lazily
//! initialized classifier: the model load is expensive, so it happens at
//! most once, on first use, behind a `OnceCell` — concurrent first
//! requests wait for the single load instead of racing their own.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::Settings;
use crate::db::{self, DatabaseError};
use crate::pipeline::advisory::{AdvisoryGenerator, OllamaAdvisory};
use crate::pipeline::classifier::{DiseaseClassifier, MockClassifier};
use crate::pipeline::orchestrator::DetectionPipeline;
use crate::pipeline::DetectionError;

pub struct AppState {
    pub settings: Settings,
    classifier: OnceCell<Arc<dyn DiseaseClassifier>>,
    advisory: Arc<dyn AdvisoryGenerator>,
}

impl AppState {
    /// Production state: Ollama-backed advisory, classifier resolved from
    /// settings on first use.
    pub fn new(settings: Settings) -> Self {
        let advisory = Arc::new(OllamaAdvisory::from_settings(&settings));
        Self {
            settings,
            classifier: OnceCell::new(),
            advisory,
        }
    }

    /// State with injected components — used by tests and embedders that
    /// bring their own classifier or advisory generator.
    pub fn with_components(
        settings: Settings,
        classifier: Arc<dyn DiseaseClassifier>,
        advisory: Arc<dyn AdvisoryGenerator>,
    ) -> Self {
        Self {
            settings,
            classifier: OnceCell::new_with(Some(classifier)),
            advisory,
        }
    }

    /// Open a database connection for this request.
    ///
    /// Scoped per request: acquired in the handler, dropped on every exit
    /// path when the handler returns.
    pub fn open_db(&self) -> Result<rusqlite::Connection, DatabaseError> {
        db::open_database(&self.settings.database_url)
    }

    /// The process-wide classifier, loading it on first call.
    ///
    /// `OnceCell` guarantees a single load; callers arriving during the
    /// load wait for it. A failed load is reported to this caller and
    /// retried by the next one rather than poisoning the process.
    pub async fn classifier(&self) -> Result<Arc<dyn DiseaseClassifier>, DetectionError> {
        self.classifier
            .get_or_try_init(|| async { build_classifier(&self.settings) })
            .await
            .cloned()
    }

    /// A detection pipeline wired with the shared components.
    pub async fn detection_pipeline(&self) -> Result<DetectionPipeline, DetectionError> {
        let classifier = self.classifier().await?;
        Ok(DetectionPipeline::new(classifier, self.advisory.clone()))
    }
}

/// Select and construct the classifier backend from settings.
fn build_classifier(settings: &Settings) -> Result<Arc<dyn DiseaseClassifier>, DetectionError> {
    if settings.use_mock_inference {
        tracing::info!("Using mock inference mode");
        return Ok(Arc::new(MockClassifier::new()));
    }

    #[cfg(feature = "onnx-inference")]
    {
        use crate::pipeline::classifier::OnnxClassifier;
        let classifier = OnnxClassifier::load(&settings.model_path)?;
        Ok(Arc::new(classifier))
    }

    #[cfg(not(feature = "onnx-inference"))]
    {
        tracing::warn!(
            "Built without the onnx-inference feature; serving mock classifications"
        );
        Ok(Arc::new(MockClassifier::new()))
    }
}
