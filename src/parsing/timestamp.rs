//! BMS timestamp parsing.
//!
//! The BMS reports `last_update_time` in asctime form with a trailing zone
//! name, e.g. `"Wed Jan  7 14:45:53 2026 UTC"`. The zone is always UTC on
//! this network. A record whose timestamp is missing or unparseable is
//! dropped by the caller; observation times are never substituted with the
//! collector's own clock.

use chrono::{DateTime, NaiveDateTime, Utc};

const ASCTIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Parse a BMS `last_update_time` string into a UTC timestamp.
///
/// Returns `None` for empty or unparseable input. Single-digit days appear
/// both space-padded (`Jan  7`) and unpadded (`Jan 7`); both parse.
pub fn parse_bms_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_zone = trimmed.strip_suffix("UTC").unwrap_or(trimmed).trim_end();

    NaiveDateTime::parse_from_str(without_zone, ASCTIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_padded_day() {
        let ts = parse_bms_timestamp("Wed Jan  7 14:45:53 2026 UTC").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2026, 1, 7));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 45, 53));
    }

    #[test]
    fn test_parse_unpadded_day() {
        let ts = parse_bms_timestamp("Wed Jan 7 14:45:53 2026 UTC").unwrap();
        assert_eq!(ts.day(), 7);
    }

    #[test]
    fn test_parse_without_zone_suffix() {
        assert!(parse_bms_timestamp("Mon Mar 23 08:00:00 2026").is_some());
    }

    #[test]
    fn test_empty_is_none() {
        assert!(parse_bms_timestamp("").is_none());
        assert!(parse_bms_timestamp("   ").is_none());
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(parse_bms_timestamp("not a timestamp").is_none());
        assert!(parse_bms_timestamp("2026-01-07T14:45:53Z").is_none());
    }
}
