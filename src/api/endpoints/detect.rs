//! Detect-image endpoint: multipart upload in, full advisory response out.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::DetectionOutcome;
use crate::pipeline::remedy::DEFAULT_LANGUAGE;

/// Content types accepted for the upload.
const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

#[derive(Deserialize)]
pub struct DetectQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub language: Option<String>,
}

/// `POST /api/detect-image` — classify an uploaded leaf photo.
///
/// Multipart field `image` (JPEG/PNG, capped at the configured megabyte
/// limit); optional `lat`/`lng`/`language` query parameters. Validation
/// failures are reported before any model work starts.
pub async fn detect_image(
    State(ctx): State<ApiContext>,
    Query(query): Query<DetectQuery>,
    mut multipart: Multipart,
) -> Result<Json<DetectionOutcome>, ApiError> {
    let mut image_bytes = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        tracing::info!(
            filename = field.file_name().unwrap_or("<unnamed>"),
            content_type = %content_type,
            "Received detect-image upload"
        );

        if !ACCEPTED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::InvalidImage(
                "Invalid image format. Please upload JPG or PNG.".into(),
            ));
        }

        image_bytes = Some(field.bytes().await?);
        break;
    }

    let image_bytes = image_bytes
        .ok_or_else(|| ApiError::BadRequest("No image file provided".into()))?;

    let limit_mb = ctx.state.settings.max_image_size_mb;
    if image_bytes.len() > ctx.state.settings.max_image_size_bytes() {
        return Err(ApiError::PayloadTooLarge { limit_mb });
    }

    let language = query.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);

    let pipeline = ctx.state.detection_pipeline().await?;
    let conn = ctx.state.open_db()?;
    let outcome = pipeline
        .detect(&image_bytes, query.lat, query.lng, language, &conn)
        .await?;

    Ok(Json(outcome))
}
