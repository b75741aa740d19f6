//! DB Object Mapping Library
//!
//! This library maps SQL query results onto typed objects. It resolves client
//! and session-pool options for a database (SQLite, PostgreSQL), decodes rows
//! into runtime values, and coerces those values to object-side type
//! descriptors.

pub mod config;
pub mod convert;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use convert::{Converter, StandardConverter, TypeDescriptor, Value};
pub use error::{ConversionError, MappingError};
