//! HTTP client for the BMS REST API

pub mod bms_client;

pub use bms_client::{BmsApiClient, BmsEndpoint, ClientError, PointSource};
