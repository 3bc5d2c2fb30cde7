//! The polling collector driving fetch-and-distribute cycles

pub mod collector;

pub use collector::{Collector, CollectorConfig, CollectorMetrics, Freshness, PollState};
