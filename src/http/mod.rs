//! Read-only HTTP API for the presentation layer

pub mod server;

pub use server::{create_server, start_server, AppState};
