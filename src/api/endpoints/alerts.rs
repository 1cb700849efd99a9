//! Nearby-alerts endpoint: recent detections around a point.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::detection::events_within_radius;
use crate::models::DetectionEvent;
use crate::pipeline::classifier::humanize;

/// Default search radius in kilometers.
const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Kilometers per degree of latitude, matching the repository's box math.
const KM_PER_DEG_LAT: f64 = 111.0;

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

#[derive(Serialize)]
pub struct AlertData {
    pub disease: String,
    /// Approximate distance from the query point; absent when either side
    /// has no coordinates.
    pub distance_km: Option<f64>,
    pub timestamp: Option<String>,
}

#[derive(Serialize)]
pub struct NearbyAlertsResponse {
    pub alerts: Vec<AlertData>,
}

/// `GET /api/nearby-alerts` — diseases detected around a location.
///
/// Without coordinates the most recent detections are returned instead.
pub async fn nearby(
    State(ctx): State<ApiContext>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<NearbyAlertsResponse>, ApiError> {
    let radius_km = query.radius.unwrap_or(DEFAULT_RADIUS_KM);

    let conn = ctx.state.open_db()?;
    let events = events_within_radius(&conn, query.lat, query.lng, radius_km)?;

    let alerts = events
        .into_iter()
        .map(|event| to_alert(event, query.lat, query.lng))
        .collect();

    Ok(Json(NearbyAlertsResponse { alerts }))
}

fn to_alert(event: DetectionEvent, query_lat: Option<f64>, query_lng: Option<f64>) -> AlertData {
    let distance_km = match (query_lat, query_lng, event.latitude, event.longitude) {
        (Some(qlat), Some(qlng), Some(elat), Some(elng)) => {
            Some(approx_distance_km(qlat, qlng, elat, elng))
        }
        _ => None,
    };

    let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(event.created_at, Utc).to_rfc3339();

    AlertData {
        disease: humanize(&event.disease),
        distance_km,
        timestamp: Some(timestamp),
    }
}

/// Equirectangular distance estimate — adequate at city-scale radii, same
/// approximation family as the repository's bounding box.
fn approx_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dy = (lat2 - lat1) * KM_PER_DEG_LAT;
    let mid_lat = ((lat1 + lat2) / 2.0).to_radians();
    let dx = (lng2 - lng1) * KM_PER_DEG_LAT * mid_lat.cos();
    let distance = (dx * dx + dy * dy).sqrt();
    // Two decimals is plenty for an approximation
    (distance * 100.0).round() / 100.0
}
