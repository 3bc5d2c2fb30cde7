//! # Argus
//!
//! Argus is a live collector and bounded rolling-window store for Building
//! Management System (BMS) telemetry.
//!
//! The name "Argus" is inspired by Argus Panoptes, the many-eyed watchman of
//! Greek mythology who never closed all of his eyes at once. In the same way
//! Argus keeps a continuous watch over every sensor and actuator point a
//! building exposes, polling the BMS REST API on a fixed interval and keeping
//! the most recent observations of each point in memory.
//!
//! ## Features
//!
//! - Fixed-interval polling of an authenticated BMS REST endpoint
//! - Bounded FIFO rolling history per point label (the live view)
//! - Optional forwarding of every batch to InfluxDB (the historical view)
//! - Read-only HTTP API serving snapshots to a dashboard
//!
//! ## Example
//!
//! ```rust
//! use argus::Result;
//!
//! fn example() -> Result<()> {
//!     println!("Argus BMS telemetry collector");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

/// Core data structures and types
pub mod core;

/// Parsing of BMS payloads, labels, and timestamps
pub mod parsing;

/// HTTP client for the BMS REST API
pub mod client;

/// In-memory rolling store for the live view
pub mod store;

/// Persistent writer interface and InfluxDB implementation
pub mod sink;

/// The polling collector driving fetch-and-distribute cycles
pub mod collector;

/// Configuration loading and validation
pub mod config;

/// Read-only HTTP API for the presentation layer
pub mod http;

pub mod error {
    //! Error types and result definitions

    use std::fmt;

    /// Result type alias for Argus operations
    pub type Result<T> = std::result::Result<T, Error>;

    /// Main error type for Argus
    #[derive(Debug)]
    pub enum Error {
        /// Configuration error
        Config(String),
        /// BMS API client error
        Client(String),
        /// Rolling store error
        Store(String),
        /// Persistent sink error
        Sink(String),
        /// IO error
        Io(std::io::Error),
        /// Other error
        Other(String),
    }

    impl fmt::Display for Error {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Error::Config(msg) => write!(f, "Configuration error: {}", msg),
                Error::Client(msg) => write!(f, "Client error: {}", msg),
                Error::Store(msg) => write!(f, "Store error: {}", msg),
                Error::Sink(msg) => write!(f, "Sink error: {}", msg),
                Error::Io(err) => write!(f, "IO error: {}", err),
                Error::Other(msg) => write!(f, "Error: {}", msg),
            }
        }
    }

    impl std::error::Error for Error {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Error::Io(err) => Some(err),
                _ => None,
            }
        }
    }

    impl From<std::io::Error> for Error {
        fn from(err: std::io::Error) -> Self {
            Error::Io(err)
        }
    }
}

// Re-export commonly used types
pub use error::{Error, Result};
