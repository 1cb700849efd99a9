//! ArogyaKrishi — plant-disease detection and advisory API.
//!
//! Upload a leaf photo, get back the diagnosed disease, confidence,
//! remedies, a localized display name and a farmer-facing advisory report;
//! detections are logged with their location so nearby growers can be
//! warned about outbreaks.

pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod pipeline;
