//! Core data structures and types for the Argus BMS telemetry collector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One observation of one BMS point at one instant.
///
/// `id` is opaque and unique per record; it carries no semantic meaning.
/// `value` is always finite by the time a record exists: the payload parser
/// rejects NaN and non-numeric inputs before constructing a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub id: String,
    pub installation_id: String,
    pub label: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl PointRecord {
    pub fn new(installation_id: &str, label: &str, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            installation_id: installation_id.to_string(),
            label: label.to_string(),
            value,
            timestamp,
        }
    }
}

/// A single `(timestamp, value)` entry of a rolling series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl PointSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl From<&PointRecord> for PointSample {
    fn from(record: &PointRecord) -> Self {
        Self { timestamp: record.timestamp, value: record.value }
    }
}
