//! Error types for the object mapping layer.
//!
//! `ConversionError` is raised by converters and passed through the coercion
//! engine untouched. `MappingError` covers everything around it: configuration,
//! connecting, reading rows and applying a row schema.

use thiserror::Error;

/// Failure converting a single value to a target type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Cannot convert {from} to {to}")]
    Unsupported { from: String, to: String },

    #[error("Value {value} is out of range for {to}")]
    OutOfRange { value: String, to: String },

    #[error("Cannot parse '{value}' as {to}: {message}")]
    Parse {
        value: String,
        to: String,
        message: String,
    },

    #[error("NULL cannot be assigned to primitive {to}")]
    NullToPrimitive { to: String },

    #[error("Conversion failed: {message}")]
    Custom { message: String },
}

impl ConversionError {
    pub fn unsupported(from: impl Into<String>, to: impl ToString) -> Self {
        Self::Unsupported {
            from: from.into(),
            to: to.to_string(),
        }
    }

    pub fn out_of_range(value: impl ToString, to: impl ToString) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            to: to.to_string(),
        }
    }

    pub fn parse(value: impl Into<String>, to: impl ToString, message: impl ToString) -> Self {
        Self::Parse {
            value: value.into(),
            to: to.to_string(),
            message: message.to_string(),
        }
    }

    pub fn null_to_primitive(to: impl ToString) -> Self {
        Self::NullToPrimitive { to: to.to_string() }
    }

    /// For use by caller-supplied converters.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Schema error: {message} (column: {column})")]
    Schema { message: String, column: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u32,
    },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl MappingError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a schema error for a column.
    pub fn schema(message: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            column: column.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u32) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// Convert sqlx errors to MappingError.
impl From<sqlx::Error> for MappingError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => MappingError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                MappingError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => MappingError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => MappingError::timeout("session pool acquire", 30),
            sqlx::Error::PoolClosed => {
                MappingError::connection("Session pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => MappingError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => MappingError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                MappingError::schema(format!("Column not found: {}", col), col)
            }
            sqlx::Error::ColumnDecode { index, source } => MappingError::schema(
                format!("Failed to decode column: {}", source),
                index,
            ),
            _ => MappingError::database(
                format!("Unknown database error: {}", err),
                None,
                "Check the database server logs",
            ),
        }
    }
}

/// Result type alias for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;
