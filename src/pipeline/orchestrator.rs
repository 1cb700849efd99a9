//! Detection orchestrator — composes the preprocessing, classification,
//! remedy, advisory and persistence stages into one detect-image call.

use std::sync::Arc;

use rusqlite::Connection;

use super::advisory::AdvisoryGenerator;
use super::classifier::{humanize, split_label, DiseaseClassifier};
use super::{preprocess, remedy, DetectionError};
use crate::db::repository::detection::save_event;
use crate::models::{DetectionOutcome, NewDetectionEvent};

/// Crop reported when the model label carries no crop prefix.
const UNKNOWN_CROP: &str = "Unknown";

/// One fully-wired detection pipeline.
///
/// Construction is cheap (two `Arc` clones); the expensive part — the
/// classifier — is resolved once by the application state and shared.
pub struct DetectionPipeline {
    classifier: Arc<dyn DiseaseClassifier>,
    advisory: Arc<dyn AdvisoryGenerator>,
}

impl DetectionPipeline {
    pub fn new(
        classifier: Arc<dyn DiseaseClassifier>,
        advisory: Arc<dyn AdvisoryGenerator>,
    ) -> Self {
        Self {
            classifier,
            advisory,
        }
    }

    /// Run the full request lifecycle for one uploaded image.
    ///
    /// Decode failures and classifier failures abort with an error.
    /// Advisory generation never fails (the generator degrades internally)
    /// and a failed event insert is logged but does not fail the call —
    /// the farmer already has the result in hand, the event log is
    /// enrichment for nearby alerts.
    pub async fn detect(
        &self,
        image_bytes: &[u8],
        latitude: Option<f64>,
        longitude: Option<f64>,
        language: &str,
        conn: &Connection,
    ) -> Result<DetectionOutcome, DetectionError> {
        let tensor = preprocess::preprocess(image_bytes)?;

        let classification = self.classifier.classify(&tensor)?;
        let confidence = classification.confidence.clamp(0.0, 1.0);

        let (crop_part, disease_label) = split_label(&classification.label);
        let crop = crop_part.map(humanize).unwrap_or_else(|| UNKNOWN_CROP.into());
        let disease_display = humanize(disease_label);

        let language = remedy::validate_language(language);
        let remedies = remedy::remedies_list(disease_label);
        let disease_name = remedy::translate(disease_label, language);

        tracing::info!(
            disease = disease_label,
            crop = %crop,
            confidence,
            "Disease classified"
        );

        let advisory_text = self.advisory.generate(&disease_display).await;

        let event = NewDetectionEvent {
            crop: crop.clone(),
            disease: disease_label.to_string(),
            confidence,
            latitude,
            longitude,
        };
        if let Err(e) = save_event(conn, &event) {
            tracing::error!(error = %e, "Failed to record detection event, continuing");
        }

        Ok(DetectionOutcome {
            crop,
            disease: disease_display,
            confidence,
            remedies,
            language: language.to_string(),
            disease_name,
            advisory_text,
        })
    }
}
