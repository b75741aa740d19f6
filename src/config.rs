//! Configuration handling for the object mapping client.
//!
//! This module provides configuration management via CLI arguments and environment variables.
//! Client and session-pool tuning values use `-1` for "not set": only non-negative
//! values are forwarded to the database client builder.

use crate::db::row::RowSchema;
use crate::error::{MappingError, MappingResult};
use crate::models::{DatabaseId, database_name_from_url};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_INSTANCE_ID: &str = "default";
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Sentinel for "leave the client default in place".
pub const UNSET: i32 = -1;

/// Environment variable read by [`EnvProjectIdProvider`].
pub const PROJECT_ID_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// Session pool tuning as configured; negative values mean unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionPoolProperties {
    pub min_sessions: i32,
    pub max_sessions: i32,
    pub max_idle_sessions: i32,
    pub write_sessions_fraction: f32,
    pub keep_alive_interval_minutes: i32,
}

impl Default for SessionPoolProperties {
    fn default() -> Self {
        Self {
            min_sessions: UNSET,
            max_sessions: UNSET,
            max_idle_sessions: UNSET,
            write_sessions_fraction: UNSET as f32,
            keep_alive_interval_minutes: UNSET,
        }
    }
}

/// Client (channel) tuning as configured; negative values mean unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProperties {
    pub num_rpc_channels: i32,
    pub prefetch_chunks: i32,
}

impl Default for ClientProperties {
    fn default() -> Self {
        Self {
            num_rpc_channels: UNSET,
            prefetch_chunks: UNSET,
        }
    }
}

/// Supplies the project id when none is configured explicitly.
pub trait ProjectIdProvider {
    fn project_id(&self) -> Option<String>;
}

/// Reads the project id from `GOOGLE_CLOUD_PROJECT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProjectIdProvider;

impl ProjectIdProvider for EnvProjectIdProvider {
    fn project_id(&self) -> Option<String> {
        std::env::var(PROJECT_ID_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Fixed project id, mostly useful in tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticProjectIdProvider(pub Option<String>);

impl ProjectIdProvider for StaticProjectIdProvider {
    fn project_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Configuration for the object mapping client.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "db-object-mapping",
    about = "Map SQL query results onto typed objects through a configurable database client",
    version,
    author
)]
pub struct Config {
    /// Database connection URL (postgres://... or sqlite:...)
    #[arg(short = 'd', long = "database", value_name = "URL", env = "MAPPING_DATABASE")]
    pub database: Option<String>,

    /// Project id. Falls back to GOOGLE_CLOUD_PROJECT.
    #[arg(long, env = "MAPPING_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Instance id
    #[arg(long, default_value = DEFAULT_INSTANCE_ID, env = "MAPPING_INSTANCE_ID")]
    pub instance_id: String,

    /// Database name. Defaults to the last path segment of the URL.
    #[arg(long, env = "MAPPING_DATABASE_NAME")]
    pub database_name: Option<String>,

    /// Number of channels the client opens (-1 keeps the client default)
    #[arg(long, default_value_t = UNSET, allow_negative_numbers = true, env = "MAPPING_NUM_RPC_CHANNELS")]
    pub num_rpc_channels: i32,

    /// Result chunks to prefetch per stream (-1 keeps the client default)
    #[arg(long, default_value_t = UNSET, allow_negative_numbers = true, env = "MAPPING_PREFETCH_CHUNKS")]
    pub prefetch_chunks: i32,

    /// Minimum sessions kept open (-1 keeps the client default)
    #[arg(long, default_value_t = UNSET, allow_negative_numbers = true, env = "MAPPING_MIN_SESSIONS")]
    pub min_sessions: i32,

    /// Maximum sessions (-1 keeps the client default)
    #[arg(long, default_value_t = UNSET, allow_negative_numbers = true, env = "MAPPING_MAX_SESSIONS")]
    pub max_sessions: i32,

    /// Maximum idle sessions (-1 keeps the client default)
    #[arg(long, default_value_t = UNSET, allow_negative_numbers = true, env = "MAPPING_MAX_IDLE_SESSIONS")]
    pub max_idle_sessions: i32,

    /// Fraction of sessions prepared for writes, 0.0 to 1.0 (-1 keeps the client default)
    #[arg(long, default_value_t = UNSET as f32, allow_negative_numbers = true, env = "MAPPING_WRITE_SESSIONS_FRACTION")]
    pub write_sessions_fraction: f32,

    /// Keep-alive interval for idle sessions in minutes (-1 keeps the client default)
    #[arg(long, default_value_t = UNSET, allow_negative_numbers = true, env = "MAPPING_KEEP_ALIVE_INTERVAL_MINUTES")]
    pub keep_alive_interval_minutes: i32,

    /// Session acquire timeout in seconds
    #[arg(long, default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS, env = "MAPPING_ACQUIRE_TIMEOUT")]
    pub acquire_timeout: u64,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, env = "MAPPING_CONNECT_TIMEOUT")]
    pub connect_timeout: u64,

    /// SQL query to run
    #[arg(short, long, env = "MAPPING_QUERY")]
    pub query: Option<String>,

    /// Row schema applied to each result row, e.g. "id:i64,name:string,tags:array<string>"
    #[arg(short, long, env = "MAPPING_SCHEMA")]
    pub schema: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MAPPING_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MAPPING_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            database: None,
            project_id: None,
            instance_id: DEFAULT_INSTANCE_ID.to_string(),
            database_name: None,
            num_rpc_channels: UNSET,
            prefetch_chunks: UNSET,
            min_sessions: UNSET,
            max_sessions: UNSET,
            max_idle_sessions: UNSET,
            write_sessions_fraction: UNSET as f32,
            keep_alive_interval_minutes: UNSET,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            query: None,
            schema: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// The connection URL, which every command needs.
    pub fn connection_string(&self) -> MappingResult<&str> {
        self.database
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| MappingError::config("a database URL is required (--database)"))
    }

    pub fn session_pool_properties(&self) -> SessionPoolProperties {
        SessionPoolProperties {
            min_sessions: self.min_sessions,
            max_sessions: self.max_sessions,
            max_idle_sessions: self.max_idle_sessions,
            write_sessions_fraction: self.write_sessions_fraction,
            keep_alive_interval_minutes: self.keep_alive_interval_minutes,
        }
    }

    pub fn client_properties(&self) -> ClientProperties {
        ClientProperties {
            num_rpc_channels: self.num_rpc_channels,
            prefetch_chunks: self.prefetch_chunks,
        }
    }

    /// Resolve the database identity.
    ///
    /// The explicit project id wins over the provider; the database name falls
    /// back to the URL path.
    pub fn resolve_database_id(
        &self,
        project_provider: &dyn ProjectIdProvider,
    ) -> MappingResult<DatabaseId> {
        let project_id = self
            .project_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| project_provider.project_id())
            .ok_or_else(|| {
                MappingError::config(format!(
                    "no project id configured; set --project-id or {}",
                    PROJECT_ID_ENV
                ))
            })?;

        let database = match &self.database_name {
            Some(name) => name.clone(),
            None => {
                let url = self.connection_string()?;
                database_name_from_url(url).ok_or_else(|| {
                    MappingError::config(
                        "cannot derive a database name from the URL; set --database-name",
                    )
                })?
            }
        };

        DatabaseId::new(project_id, self.instance_id.clone(), database)
    }

    /// Parse the configured row schema, if any.
    pub fn row_schema(&self) -> MappingResult<Option<RowSchema>> {
        self.schema.as_deref().map(str::parse).transpose()
    }

    /// Get the acquire timeout as a Duration.
    pub fn acquire_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
