//! InfluxDB 2.x sink.
//!
//! Records are appended to the configured bucket as `bms_point`
//! measurements, tagged by label, installation, and the categorization
//! derived from the label convention. Tags are stable per label; the
//! per-record id is not written as a tag to keep series cardinality bounded.

use crate::core::PointRecord;
use crate::parsing::label::LabelParser;
use crate::sink::{RecordSink, SinkError};
use async_trait::async_trait;
use futures_util::stream;
use influxdb2::models::DataPoint;
use log::warn;

const MEASUREMENT: &str = "bms_point";

/// Connection details for an InfluxDB 2.x instance.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

/// Appends point records to InfluxDB with unbounded retention.
pub struct InfluxSink {
    client: influxdb2::Client,
    bucket: String,
    labels: LabelParser,
}

impl InfluxSink {
    pub fn new(config: InfluxConfig) -> Result<Self, SinkError> {
        let labels = LabelParser::new()
            .map_err(|e| SinkError::Serialization(format!("label parser: {}", e)))?;
        let client = influxdb2::Client::new(config.url, config.org, config.token);

        Ok(Self { client, bucket: config.bucket, labels })
    }

    fn to_point(&self, record: &PointRecord) -> Result<DataPoint, SinkError> {
        let category = self.labels.categorize(&record.label);
        let nanos = record
            .timestamp
            .timestamp_nanos_opt()
            .ok_or_else(|| SinkError::Serialization(format!("timestamp out of range for {}", record.label)))?;

        DataPoint::builder(MEASUREMENT)
            .tag("label", record.label.as_str())
            .tag("installation_id", record.installation_id.as_str())
            .tag("system", category.system)
            .tag("measurement_type", category.measurement_type)
            .tag("line", category.line)
            .tag("outstation", category.outstation)
            .field("value", record.value)
            .timestamp(nanos)
            .build()
            .map_err(|e| SinkError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl RecordSink for InfluxSink {
    async fn write(&self, records: &[PointRecord]) -> Result<usize, SinkError> {
        let mut points = Vec::with_capacity(records.len());

        for record in records {
            match self.to_point(record) {
                Ok(point) => points.push(point),
                Err(e) => warn!("Skipping unwritable point '{}': {}", record.label, e),
            }
        }

        if points.is_empty() {
            return Ok(0);
        }

        let written = points.len();
        self.client
            .write(&self.bucket, stream::iter(points))
            .await
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;

        Ok(written)
    }
}
