//! Detection event entity and the transient per-request result type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One recorded classification. Append-only: rows are never updated or
/// deleted after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// Rowid assigned by the database on insert.
    pub id: i64,
    pub crop: String,
    /// Canonical disease label, e.g. `Early_Blight`.
    pub disease: String,
    /// Classifier confidence in [0, 1].
    pub confidence: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Server-assigned insert timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// Insert payload for a detection event — identity and timestamp are
/// assigned by the database.
#[derive(Debug, Clone)]
pub struct NewDetectionEvent {
    pub crop: String,
    pub disease: String,
    pub confidence: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Assembled answer for one detect-image request. Not persisted —
/// a `NewDetectionEvent` is derived from it for the event log.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutcome {
    pub crop: String,
    /// Human-readable disease name (separators replaced with spaces).
    pub disease: String,
    pub confidence: f64,
    pub remedies: Vec<String>,
    /// Language the `disease_name` field is localized to.
    pub language: String,
    /// Localized display name for the detected disease.
    pub disease_name: String,
    /// Six-section farmer-facing advisory report.
    pub advisory_text: String,
}
