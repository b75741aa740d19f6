//! Data models for the object mapping layer.
//!
//! This module re-exports the model types used throughout the crate.

pub mod connection;

// Re-export commonly used types
pub use connection::{DatabaseId, DatabaseType, database_name_from_url, masked_connection_string};
