//! Image preprocessing for classifier input.
//!
//! One canonical entry point: raw upload bytes in, channel-first f32 tensor
//! out. Decoding, color conversion, resizing and normalization all happen
//! here so the classifier backends only ever see a `(3, S, S)` array.

use image::imageops::FilterType;
use ndarray::Array3;

use super::DetectionError;
use crate::config::MODEL_INPUT_SIZE;

/// Per-channel normalization constants the pretrained backbone was
/// trained with (ImageNet).
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

/// Decode raw image bytes and produce a normalized model input tensor.
///
/// Steps: decode (JPEG/PNG) -> force 3-channel RGB (alpha dropped,
/// grayscale expanded) -> resize to `MODEL_INPUT_SIZE` square with
/// Lanczos3 -> scale to [0,1] -> subtract ImageNet mean, divide by std ->
/// reorder to CHW.
///
/// Pure function of the input bytes; malformed input fails with
/// `DetectionError::ImageDecode`.
pub fn preprocess(image_bytes: &[u8]) -> Result<Array3<f32>, DetectionError> {
    validate_image_bytes(image_bytes)?;

    let img = image::load_from_memory(image_bytes)
        .map_err(|e| DetectionError::ImageDecode(format!("Failed to decode image: {e}")))?;

    // Any color mode collapses to RGB here: RGBA loses alpha, Luma is
    // replicated across channels.
    let rgb = img.to_rgb8();

    let size = MODEL_INPUT_SIZE;
    let resized = image::imageops::resize(&rgb, size, size, FilterType::Lanczos3);

    let mut tensor = Array3::<f32>::zeros((3, size as usize, size as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let scaled = pixel.0[c] as f32 / 255.0;
            tensor[[c, y as usize, x as usize]] = (scaled - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }

    tracing::debug!(
        original = format!("{}x{}", rgb.width(), rgb.height()),
        output = format!("3x{size}x{size}"),
        "Image preprocessed for classifier"
    );

    Ok(tensor)
}

/// Validate image bytes before decoding.
/// Returns early error for clearly invalid input — saves decode time.
fn validate_image_bytes(bytes: &[u8]) -> Result<(), DetectionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(DetectionError::ImageDecode(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(DetectionError::ImageDecode(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}
