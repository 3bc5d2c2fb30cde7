//! Persistent writer interface.
//!
//! The collector forwards every successful batch here when a sink is
//! configured. A sink failure is logged and discarded by the caller; there
//! is no local buffering or retry queue. Data missed during a sink outage
//! cannot be recovered.

use crate::core::PointRecord;
use async_trait::async_trait;

pub mod influx_sink;

pub use influx_sink::{InfluxConfig, InfluxSink};

/// Errors from the persistent-write path. Isolated from the live view: the
/// rolling store has already received the batch by the time a sink runs.
#[derive(Debug)]
pub enum SinkError {
    /// The sink endpoint is unreachable or rejected the batch.
    Unavailable(String),
    /// A record could not be converted into the sink's wire shape.
    Serialization(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Unavailable(msg) => write!(f, "Sink unavailable: {}", msg),
            SinkError::Serialization(msg) => write!(f, "Sink serialization error: {}", msg),
        }
    }
}

impl std::error::Error for SinkError {}

/// A destination for normalized point records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append a batch. Returns the number of records written.
    async fn write(&self, records: &[PointRecord]) -> Result<usize, SinkError>;
}
