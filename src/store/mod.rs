//! In-memory rolling store for the live view

pub mod rolling_store;

pub use rolling_store::{PointFilter, RollingStore};
