//! Client for the BMS REST API.
//!
//! Issues a single authenticated GET against the configured endpoint and
//! normalizes the response into point records. Certificate validation is
//! disabled: the BMS presents a self-signed certificate and is only ever
//! reached over the building's internal network. This is a deliberate
//! relaxation scoped to this one client; do not reuse it for anything else.
//!
//! The client performs no retries. A failed call is terminal for that call
//! only; retry cadence belongs to the collector.

use crate::parsing::{ParseOutcome, PointParser};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Configuration for one BMS endpoint.
#[derive(Debug, Clone)]
pub struct BmsEndpoint {
    pub url: String,
    pub bearer_token: String,
    pub installation_id: String,
    pub timeout_secs: u64,
}

impl Default for BmsEndpoint {
    fn default() -> Self {
        Self {
            url: String::new(),
            bearer_token: String::new(),
            installation_id: "bms-live".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Errors from a single fetch. Both variants abort only the current call.
#[derive(Debug)]
pub enum ClientError {
    /// Endpoint unreachable, request timed out, non-success status, or an
    /// undecodable response body.
    Connectivity(String),
    /// Credentials rejected (401/403).
    Auth(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Connectivity(msg) => write!(f, "Connectivity error: {}", msg),
            ClientError::Auth(msg) => write!(f, "Auth error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Source of point records; the seam between the collector and the network.
#[async_trait]
pub trait PointSource: Send + Sync {
    /// Fetch the current values of every point the source exposes.
    async fn fetch(&self) -> Result<ParseOutcome, ClientError>;
}

/// Client for the BMS REST API.
pub struct BmsApiClient {
    endpoint: BmsEndpoint,
    client: reqwest::Client,
    parser: PointParser,
}

impl BmsApiClient {
    pub fn new(endpoint: BmsEndpoint) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| ClientError::Connectivity(e.to_string()))?;

        let parser = PointParser::new()
            .map_err(|e| ClientError::Connectivity(format!("label parser: {}", e)))?;

        Ok(Self { endpoint, client, parser })
    }

    pub fn endpoint(&self) -> &BmsEndpoint {
        &self.endpoint
    }

    /// Fetch the raw payload without normalizing it.
    pub async fn fetch_raw(&self) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .get(&self.endpoint.url)
            .header("Authorization", format!("Bearer {}", self.endpoint.bearer_token))
            .send()
            .await
            .map_err(|e| ClientError::Connectivity(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Auth(format!("credentials rejected with status {}", status)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Connectivity(format!(
                "request failed with status {}: {}",
                status, body
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ClientError::Connectivity(format!("invalid response body: {}", e)))
    }

    /// Fetch the current data and write it to a JSON snapshot file.
    ///
    /// Returns the number of records written.
    pub async fn save_snapshot(&self, path: &str) -> crate::Result<usize> {
        let outcome = self.fetch().await.map_err(|e| crate::Error::Client(e.to_string()))?;
        let json = serde_json::to_string_pretty(&outcome.records)
            .map_err(|e| crate::Error::Other(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(outcome.records.len())
    }
}

#[async_trait]
impl PointSource for BmsApiClient {
    async fn fetch(&self) -> Result<ParseOutcome, ClientError> {
        let raw = self.fetch_raw().await?;
        Ok(self.parser.parse(&raw, &self.endpoint.installation_id))
    }
}
