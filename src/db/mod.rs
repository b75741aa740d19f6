//! Database access layer.
//!
//! This module wires the mapping layer to a database client:
//! - Client and session-pool option resolution
//! - Pool construction and query execution
//! - Row decoding and row-to-object mapping

pub mod options;
pub mod pool;
pub mod row;

pub use options::{ClientOptions, SessionPoolOptions, SessionPoolOptionsBuilder};
pub use pool::{DbPool, connect};
pub use row::{DecodedRow, RowSchema, RowToValues, TypeCategory, categorize_type, map_row};
