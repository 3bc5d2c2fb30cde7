//! Point label handling for the vendor naming convention.
//!
//! BMS point paths look like `/rest/L11OS11D1_ChW Sec Pump1 Speed`: a
//! line/outstation/point prefix followed by a free-text description. This
//! module derives display labels from paths, normalizes the prefix to the
//! `L11_O11_D1` convention used across the installation, and categorizes
//! points for tagging in the persistent store.

use regex::Regex;

/// Path prefix the BMS prepends to every point name.
const REST_PREFIX: &str = "/rest/";

/// Tags derived from a point label, used for filtering and grouping in the
/// persistent store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointCategory {
    pub system: String,
    pub measurement_type: String,
    pub line: String,
    pub outstation: String,
}

/// Parser for the vendor label convention.
pub struct LabelParser {
    prefix_regex: Regex,
    location_regex: Regex,
}

impl LabelParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            prefix_regex: Regex::new(r"^L(\d+)OS(\d+)([A-Z])(\d+)$")?,
            location_regex: Regex::new(r"^L(\d+)_O(\d+)_")?,
        })
    }

    /// Derive a normalized label from a BMS point path.
    pub fn label_from_path(&self, path: &str) -> String {
        let name = path.strip_prefix(REST_PREFIX).unwrap_or(path);
        self.normalize(name)
    }

    /// Normalize the vendor prefix: `L11OS11D1_ChW Sec Pump1 Speed` becomes
    /// `L11_O11_D1_ChW Sec Pump1 Speed`. Labels that do not match the
    /// convention are returned as-is.
    pub fn normalize(&self, name: &str) -> String {
        let Some((prefix, description)) = name.split_once('_') else {
            return name.to_string();
        };

        match self.prefix_regex.captures(prefix) {
            Some(caps) => {
                let line = &caps[1];
                let outstation = &caps[2];
                let point_type = &caps[3];
                let point_num = &caps[4];
                format!("L{}_O{}_{}{}_{}", line, outstation, point_type, point_num, description)
            }
            None => name.to_string(),
        }
    }

    /// Categorize a point for persistent-store tagging.
    ///
    /// Keyword matching follows the installation's naming habits; anything
    /// unrecognized lands in `other`/`value`.
    pub fn categorize(&self, label: &str) -> PointCategory {
        let lower = label.to_lowercase();

        let system = if lower.contains("boiler") {
            "boiler"
        } else if lower.contains("ahu") || lower.contains("air") {
            "ahu"
        } else if lower.contains("chw") || lower.contains("chiller") {
            "chiller"
        } else if lower.contains("lphw") {
            "heating"
        } else if lower.contains("pump") {
            "pump"
        } else if lower.contains("valve") {
            "valve"
        } else if lower.contains("temp") {
            "temperature"
        } else {
            "other"
        };

        let measurement_type = if lower.contains("temp") {
            "temperature"
        } else if lower.contains("speed") {
            "speed"
        } else if lower.contains("valve") || lower.contains("spt") {
            "position"
        } else if lower.contains("pump") {
            "status"
        } else if lower.contains("press") {
            "pressure"
        } else {
            "value"
        };

        let (line, outstation) = match self.location_regex.captures(label) {
            Some(caps) => (caps[1].to_string(), caps[2].to_string()),
            None => ("unknown".to_string(), "unknown".to_string()),
        };

        PointCategory {
            system: system.to_string(),
            measurement_type: measurement_type.to_string(),
            line,
            outstation,
        }
    }
}

/// Short display form of a label for legends: the description after the
/// `L11_O11_D1_` prefix, or the full label when it has no such prefix.
pub fn display_label(label: &str) -> &str {
    if label.matches('_').count() >= 3 {
        label.splitn(4, '_').last().unwrap_or(label)
    } else {
        label
    }
}

/// One comparable chunk of a natural sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum NaturalPart {
    Num(u64),
    Text(String),
}

/// Natural sort key for labels: numeric runs compare as numbers so that
/// `D2` sorts before `D21`.
pub fn natural_key(label: &str) -> Vec<NaturalPart> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for ch in label.chars() {
        let is_digit = ch.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            parts.push(finish_part(&current, current_is_digit));
            current.clear();
        }
        current.push(ch);
        current_is_digit = is_digit;
    }
    if !current.is_empty() {
        parts.push(finish_part(&current, current_is_digit));
    }

    parts
}

fn finish_part(chunk: &str, is_digit: bool) -> NaturalPart {
    if is_digit {
        match chunk.parse::<u64>() {
            Ok(n) => NaturalPart::Num(n),
            Err(_) => NaturalPart::Text(chunk.to_lowercase()),
        }
    } else {
        NaturalPart::Text(chunk.to_lowercase())
    }
}
