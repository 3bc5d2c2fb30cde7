//! Parsing of BMS payloads, point labels, and timestamps

pub mod label;
pub mod point_parser;
pub mod timestamp;

pub use label::{display_label, natural_key, LabelParser, PointCategory};
pub use point_parser::{ParseOutcome, PointParser};
pub use timestamp::parse_bms_timestamp;
