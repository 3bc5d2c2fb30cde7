//! Normalization of raw BMS API payloads into point records.
//!
//! The endpoint returns a JSON object mapping point paths to
//! `{value, last_update_time}` entries; some firmware revisions wrap that
//! mapping in a `{"points": [...]}` envelope. Entries with an unparseable
//! value or timestamp are skipped and counted, never raised: one bad point
//! must not abort the whole batch.

use crate::core::PointRecord;
use crate::parsing::label::LabelParser;
use crate::parsing::timestamp::parse_bms_timestamp;
use serde_json::Value;

/// Result of normalizing one payload.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<PointRecord>,
    pub skipped_values: u64,
    pub skipped_timestamps: u64,
}

impl ParseOutcome {
    pub fn skipped_total(&self) -> u64 {
        self.skipped_values + self.skipped_timestamps
    }
}

/// Payload normalizer: raw JSON in, `PointRecord`s plus skip counts out.
pub struct PointParser {
    labels: LabelParser,
}

impl PointParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self { labels: LabelParser::new()? })
    }

    /// Normalize a raw payload into records tagged with `installation_id`.
    pub fn parse(&self, raw: &Value, installation_id: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        match raw.get("points").and_then(Value::as_array) {
            Some(entries) => {
                for entry in entries {
                    if let Some(map) = entry.as_object() {
                        for (path, details) in map {
                            self.parse_entry(path, details, installation_id, &mut outcome);
                        }
                    }
                }
            }
            None => {
                if let Some(map) = raw.as_object() {
                    for (path, details) in map {
                        self.parse_entry(path, details, installation_id, &mut outcome);
                    }
                }
            }
        }

        outcome
    }

    fn parse_entry(
        &self,
        path: &str,
        details: &Value,
        installation_id: &str,
        outcome: &mut ParseOutcome,
    ) {
        let Some(value) = details.get("value").and_then(parse_value) else {
            outcome.skipped_values += 1;
            return;
        };

        let timestamp = details
            .get("last_update_time")
            .and_then(Value::as_str)
            .and_then(parse_bms_timestamp);
        let Some(timestamp) = timestamp else {
            outcome.skipped_timestamps += 1;
            return;
        };

        let label = self.labels.label_from_path(path);
        outcome.records.push(PointRecord::new(installation_id, &label, value, timestamp));
    }
}

/// Parse a point value, transmitted either as a JSON number or as a numeric
/// string. Non-numeric and non-finite values are rejected.
fn parse_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite())
}
