//! Detection event persistence and the nearby/recent queries.

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{DetectionEvent, NewDetectionEvent};

/// Kilometers per degree of latitude.
const KM_PER_DEG_LAT: f64 = 111.0;

/// Result cap for the bounding-box query.
const NEARBY_LIMIT: i64 = 100;

/// Result cap when no coordinates are supplied.
const RECENT_FALLBACK_LIMIT: i64 = 50;

/// Insert a detection event and return the stored row, including the
/// database-assigned id and timestamp.
pub fn save_event(
    conn: &Connection,
    event: &NewDetectionEvent,
) -> Result<DetectionEvent, DatabaseError> {
    conn.execute(
        "INSERT INTO detection_events (crop, disease, confidence, latitude, longitude)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event.crop,
            event.disease,
            event.confidence,
            event.latitude,
            event.longitude,
        ],
    )?;

    let id = conn.last_insert_rowid();
    let stored = conn.query_row(
        "SELECT id, crop, disease, confidence, latitude, longitude, created_at
         FROM detection_events WHERE id = ?1",
        params![id],
        map_event_row,
    )?;
    Ok(stored)
}

/// Detection events near a point, newest-first.
///
/// With coordinates: a rectangular approximation of the circular radius —
/// the latitude delta is `radius / 111 km`, the longitude delta is widened
/// by `cos(latitude)`. Events without stored coordinates never match.
/// Without coordinates: the most recent events instead.
pub fn events_within_radius(
    conn: &Connection,
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_km: f64,
) -> Result<Vec<DetectionEvent>, DatabaseError> {
    let (lat, lng) = match (latitude, longitude) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return recent_events(conn, RECENT_FALLBACK_LIMIT),
    };

    let lat_delta = radius_km / KM_PER_DEG_LAT;
    let lng_delta = radius_km / (KM_PER_DEG_LAT * lat.to_radians().cos());

    let mut stmt = conn.prepare(
        "SELECT id, crop, disease, confidence, latitude, longitude, created_at
         FROM detection_events
         WHERE latitude  BETWEEN ?1 AND ?2
           AND longitude BETWEEN ?3 AND ?4
         ORDER BY created_at DESC
         LIMIT ?5",
    )?;

    let rows = stmt.query_map(
        params![
            lat - lat_delta,
            lat + lat_delta,
            lng - lng_delta,
            lng + lng_delta,
            NEARBY_LIMIT,
        ],
        map_event_row,
    )?;

    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Most recent detection events, newest-first.
pub fn recent_events(conn: &Connection, limit: i64) -> Result<Vec<DetectionEvent>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, crop, disease, confidence, latitude, longitude, created_at
         FROM detection_events
         ORDER BY created_at DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], map_event_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn map_event_row(row: &rusqlite::Row<'_>) -> Result<DetectionEvent, rusqlite::Error> {
    Ok(DetectionEvent {
        id: row.get(0)?,
        crop: row.get(1)?,
        disease: row.get(2)?,
        confidence: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    fn event(disease: &str, lat: Option<f64>, lng: Option<f64>) -> NewDetectionEvent {
        NewDetectionEvent {
            crop: "Tomato".into(),
            disease: disease.into(),
            confidence: 0.9,
            latitude: lat,
            longitude: lng,
        }
    }

    /// Insert with an explicit timestamp so ordering tests don't depend on
    /// sub-millisecond insert timing.
    fn insert_at(conn: &Connection, disease: &str, lat: f64, lng: f64, created_at: &str) {
        conn.execute(
            "INSERT INTO detection_events (crop, disease, confidence, latitude, longitude, created_at)
             VALUES ('Tomato', ?1, 0.8, ?2, ?3, ?4)",
            params![disease, lat, lng, created_at],
        )
        .unwrap();
    }

    #[test]
    fn save_assigns_id_and_timestamp() {
        let conn = open_memory_database().unwrap();
        let stored = save_event(&conn, &event("Early_Blight", Some(12.9), Some(77.6))).unwrap();

        assert!(stored.id > 0);
        assert_eq!(stored.disease, "Early_Blight");
        assert_eq!(stored.latitude, Some(12.9));

        let second = save_event(&conn, &event("Late_Blight", None, None)).unwrap();
        assert!(second.id > stored.id);
        assert!(second.created_at >= stored.created_at);
    }

    #[test]
    fn nearby_filters_by_bounding_box() {
        let conn = open_memory_database().unwrap();
        insert_at(&conn, "Early_Blight", 12.90, 77.60, "2026-03-01 10:00:00");
        insert_at(&conn, "Late_Blight", 12.93, 77.63, "2026-03-01 11:00:00");
        // ~1 degree away — well outside a 10 km box
        insert_at(&conn, "Leaf_Rust", 13.90, 77.60, "2026-03-01 12:00:00");

        let events = events_within_radius(&conn, Some(12.9), Some(77.6), 10.0).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.disease != "Leaf_Rust"));
        // Newest first
        assert_eq!(events[0].disease, "Late_Blight");
    }

    #[test]
    fn nearby_excludes_events_without_coordinates() {
        let conn = open_memory_database().unwrap();
        save_event(&conn, &event("Early_Blight", None, None)).unwrap();
        save_event(&conn, &event("Late_Blight", Some(12.9), Some(77.6))).unwrap();

        let events = events_within_radius(&conn, Some(12.9), Some(77.6), 10.0).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].disease, "Late_Blight");
    }

    #[test]
    fn nearby_empty_when_nothing_in_box() {
        let conn = open_memory_database().unwrap();
        insert_at(&conn, "Early_Blight", 12.0, 76.0, "2026-03-01 10:00:00");

        let events = events_within_radius(&conn, Some(12.9), Some(77.6), 5.0).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn nearby_without_coords_falls_back_to_recent() {
        let conn = open_memory_database().unwrap();
        for i in 0..60 {
            insert_at(
                &conn,
                "Early_Blight",
                12.9,
                77.6,
                &format!("2026-03-01 10:{:02}:00", i),
            );
        }

        let events = events_within_radius(&conn, None, None, 10.0).unwrap();
        assert_eq!(events.len(), 50);
        // Strictly newest-first
        for pair in events.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn nearby_caps_at_one_hundred() {
        let conn = open_memory_database().unwrap();
        for i in 0..120 {
            insert_at(
                &conn,
                "Early_Blight",
                12.9,
                77.6,
                &format!("2026-03-01 {:02}:{:02}:00", i / 60, i % 60),
            );
        }

        let events = events_within_radius(&conn, Some(12.9), Some(77.6), 10.0).unwrap();
        assert_eq!(events.len(), 100);
    }

    #[test]
    fn recent_respects_limit_and_order() {
        let conn = open_memory_database().unwrap();
        insert_at(&conn, "Early_Blight", 12.9, 77.6, "2026-03-01 10:00:00");
        insert_at(&conn, "Late_Blight", 12.9, 77.6, "2026-03-01 11:00:00");
        insert_at(&conn, "Leaf_Rust", 12.9, 77.6, "2026-03-01 12:00:00");

        let events = recent_events(&conn, 2).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].disease, "Leaf_Rust");
        assert_eq!(events[1].disease, "Late_Blight");
    }
}
