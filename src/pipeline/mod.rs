//! Detection pipeline: image preprocessing, classification, remedy lookup,
//! advisory generation and the orchestrator that composes them.

pub mod advisory;
pub mod classifier;
pub mod orchestrator;
pub mod preprocess;
pub mod remedy;

use thiserror::Error;

/// Errors from the detection pipeline.
///
/// `ImageDecode` is the caller's fault and maps to a 4xx at the API;
/// the other variants abort the request as server errors. Advisory
/// generation is absent here on purpose — it never fails outward.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Image decoding failed: {0}")]
    ImageDecode(String),

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}
