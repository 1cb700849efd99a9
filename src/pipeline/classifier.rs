//! Disease classifier — ONNX-backed model behind the `onnx-inference`
//! feature, plus the mock variant used for demos and environments without
//! model weights.

use ndarray::Array3;
use rand::Rng;

use super::DetectionError;

/// Crops the model is trained on.
pub const CROP_TYPES: &[&str] = &["Tomato", "Potato", "Grape", "Corn", "Wheat"];

/// Disease classes, keyed the same way as the remedy/translation tables.
pub const DISEASE_CLASSES: &[&str] = &[
    "Healthy",
    "Early_Blight",
    "Late_Blight",
    "Powdery_Mildew",
    "Leaf_Rust",
    "Septoria_Leaf_Spot",
];

/// Output label table, index-aligned with the model's output vector:
/// `Crop___Disease` composites in row-major (crop, disease) order.
/// Must match the class order the deployed model was exported with.
pub fn model_labels() -> Vec<String> {
    CROP_TYPES
        .iter()
        .flat_map(|crop| {
            DISEASE_CLASSES
                .iter()
                .map(move |disease| format!("{crop}___{disease}"))
        })
        .collect()
}

/// Single top-1 prediction.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Raw model label, e.g. `Tomato___Early_Blight`.
    pub label: String,
    /// Probability of the predicted class, in [0, 1].
    pub confidence: f64,
}

/// A pretrained image classifier over preprocessed leaf images.
///
/// Implementations take the canonical `(3, 224, 224)` tensor produced by
/// `preprocess` and return the highest-probability class.
pub trait DiseaseClassifier: Send + Sync {
    fn classify(&self, image: &Array3<f32>) -> Result<Classification, DetectionError>;
}

// ── Label helpers ─────────────────────────────────────────

/// Split a `Crop___Disease` composite into its parts.
/// Labels without a crop prefix come back with `None`.
pub fn split_label(label: &str) -> (Option<&str>, &str) {
    match label.split_once("___") {
        Some((crop, disease)) if !crop.is_empty() => (Some(crop), disease),
        _ => (None, label),
    }
}

/// Human-readable form of a label: separator runs become single spaces.
pub fn humanize(label: &str) -> String {
    label.replace("___", " ").replace('_', " ")
}

/// Numerically stable softmax over raw logits.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        vec![0.0; logits.len()]
    }
}

// ═══════════════════════════════════════════════════════════
// ONNX classifier — behind `onnx-inference` feature
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx-inference")]
mod onnx {
    use std::path::Path;
    use std::sync::Mutex;

    use ndarray::Array3;
    use ort::session::Session;

    use super::{model_labels, softmax, Classification, DiseaseClassifier};
    use crate::pipeline::DetectionError;

    /// Real classifier running a MobileNetV2-style plant-disease model
    /// through ONNX Runtime.
    ///
    /// Uses interior mutability (Mutex) because `ort::Session::run` requires
    /// `&mut self` but `DiseaseClassifier` exposes `&self` for shared usage.
    pub struct OnnxClassifier {
        session: Mutex<Session>,
        labels: Vec<String>,
    }

    impl OnnxClassifier {
        /// Load the model from an `.onnx` file. Expensive — callers hold the
        /// result behind the application state's one-time init guard.
        pub fn load(model_path: &Path) -> Result<Self, DetectionError> {
            if !model_path.exists() {
                return Err(DetectionError::ModelLoad(format!(
                    "Model file not found: {}",
                    model_path.display()
                )));
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| DetectionError::ModelLoad(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| DetectionError::ModelLoad(e.to_string()))?
                .commit_from_file(model_path)
                .map_err(|e: ort::Error| {
                    DetectionError::ModelLoad(format!("ONNX load failed: {e}"))
                })?;

            tracing::info!("Disease model loaded from {}", model_path.display());

            Ok(Self {
                session: Mutex::new(session),
                labels: model_labels(),
            })
        }
    }

    impl DiseaseClassifier for OnnxClassifier {
        fn classify(&self, image: &Array3<f32>) -> Result<Classification, DetectionError> {
            use ort::value::TensorRef;

            // Add the batch axis: (3, S, S) -> (1, 3, S, S)
            let batch = image.clone().insert_axis(ndarray::Axis(0));
            let input = TensorRef::from_array_view(&batch)
                .map_err(|e| DetectionError::Inference(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| DetectionError::Inference("Session lock poisoned".into()))?;

            let outputs = session
                .run(ort::inputs![input])
                .map_err(|e| DetectionError::Inference(format!("ONNX inference failed: {e}")))?;

            let (shape, logits) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectionError::Inference(format!("Output extraction: {e}")))?;

            let class_count = shape.last().copied().unwrap_or(0) as usize;
            if class_count == 0 || logits.len() < class_count {
                return Err(DetectionError::Inference(format!(
                    "Unexpected output shape: {shape:?}"
                )));
            }

            let probs = softmax(&logits[..class_count]);
            let (best_idx, best_prob) = probs
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .ok_or_else(|| DetectionError::Inference("Empty probability vector".into()))?;

            let label = self
                .labels
                .get(best_idx)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());

            Ok(Classification {
                label,
                confidence: f64::from(*best_prob).clamp(0.0, 1.0),
            })
        }
    }
}

#[cfg(feature = "onnx-inference")]
pub use onnx::OnnxClassifier;

// ═══════════════════════════════════════════════════════════
// Mock classifier
// ═══════════════════════════════════════════════════════════

/// Mock inference for demos, tests and machines without model weights:
/// a uniformly random label from the class table with a plausible
/// confidence. Selected only by explicit configuration.
pub struct MockClassifier {
    labels: Vec<String>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            labels: model_labels(),
        }
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DiseaseClassifier for MockClassifier {
    fn classify(&self, _image: &Array3<f32>) -> Result<Classification, DetectionError> {
        let mut rng = rand::thread_rng();
        let label = self.labels[rng.gen_range(0..self.labels.len())].clone();
        let confidence = rng.gen_range(0.5..0.95);
        Ok(Classification { label, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_table_covers_all_crop_disease_pairs() {
        let labels = model_labels();
        assert_eq!(labels.len(), CROP_TYPES.len() * DISEASE_CLASSES.len());
        assert!(labels.contains(&"Tomato___Early_Blight".to_string()));
        assert!(labels.contains(&"Wheat___Leaf_Rust".to_string()));
    }

    #[test]
    fn split_composite_label() {
        let (crop, disease) = split_label("Tomato___Early_Blight");
        assert_eq!(crop, Some("Tomato"));
        assert_eq!(disease, "Early_Blight");
    }

    #[test]
    fn split_bare_label_has_no_crop() {
        let (crop, disease) = split_label("Early_Blight");
        assert_eq!(crop, None);
        assert_eq!(disease, "Early_Blight");
    }

    #[test]
    fn humanize_replaces_separators() {
        assert_eq!(humanize("Tomato___Early_Blight"), "Tomato Early Blight");
        assert_eq!(humanize("Early_Blight"), "Early Blight");
        assert_eq!(humanize("Healthy"), "Healthy");
    }

    #[test]
    fn softmax_is_a_distribution() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn softmax_handles_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn mock_returns_known_label_and_plausible_confidence() {
        let classifier = MockClassifier::new();
        let image = Array3::<f32>::zeros((3, 224, 224));
        let labels = model_labels();

        for _ in 0..50 {
            let result = classifier.classify(&image).unwrap();
            assert!(labels.contains(&result.label));
            assert!((0.5..0.95).contains(&result.confidence));
        }
    }
}
