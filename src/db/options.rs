//! Client and session-pool options.
//!
//! Options are resolved from [`Config`] and then handed to the pool builder in
//! [`crate::db::pool`]. A value that was not configured stays `None` and the
//! driver default applies.

use crate::config::{ClientProperties, Config, ProjectIdProvider, SessionPoolProperties};
use crate::error::{MappingError, MappingResult};
use crate::models::{DatabaseId, DatabaseType, masked_connection_string};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Session pool options with only the configured values set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionPoolOptions {
    pub min_sessions: Option<u32>,
    pub max_sessions: Option<u32>,
    pub max_idle_sessions: Option<u32>,
    pub write_sessions_fraction: Option<f32>,
    #[serde(with = "duration_minutes")]
    pub keep_alive_interval: Option<Duration>,
}

impl SessionPoolOptions {
    pub fn builder() -> SessionPoolOptionsBuilder {
        SessionPoolOptionsBuilder::default()
    }

    /// Forward every non-negative property to the builder.
    pub fn from_properties(props: &SessionPoolProperties) -> MappingResult<Self> {
        let mut builder = Self::builder();
        if let Some(v) = non_negative(props.min_sessions) {
            builder = builder.min_sessions(v);
        }
        if let Some(v) = non_negative(props.max_sessions) {
            builder = builder.max_sessions(v);
        }
        if let Some(v) = non_negative(props.max_idle_sessions) {
            builder = builder.max_idle_sessions(v);
        }
        if props.write_sessions_fraction >= 0.0 {
            builder = builder.write_sessions_fraction(props.write_sessions_fraction);
        }
        if let Some(v) = non_negative(props.keep_alive_interval_minutes) {
            builder = builder.keep_alive_interval_minutes(v);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionPoolOptionsBuilder {
    options: SessionPoolOptions,
}

impl SessionPoolOptionsBuilder {
    pub fn min_sessions(mut self, v: u32) -> Self {
        self.options.min_sessions = Some(v);
        self
    }

    pub fn max_sessions(mut self, v: u32) -> Self {
        self.options.max_sessions = Some(v);
        self
    }

    pub fn max_idle_sessions(mut self, v: u32) -> Self {
        self.options.max_idle_sessions = Some(v);
        self
    }

    pub fn write_sessions_fraction(mut self, v: f32) -> Self {
        self.options.write_sessions_fraction = Some(v);
        self
    }

    pub fn keep_alive_interval_minutes(mut self, v: u32) -> Self {
        self.options.keep_alive_interval = Some(Duration::from_secs(u64::from(v) * 60));
        self
    }

    /// Validate and return the options.
    pub fn build(self) -> MappingResult<SessionPoolOptions> {
        let o = self.options;
        if o.max_sessions == Some(0) {
            return Err(MappingError::config("max_sessions must be greater than 0"));
        }
        if let (Some(min), Some(max)) = (o.min_sessions, o.max_sessions) {
            if min > max {
                return Err(MappingError::config(format!(
                    "min_sessions ({}) cannot exceed max_sessions ({})",
                    min, max
                )));
            }
        }
        if let Some(fraction) = o.write_sessions_fraction {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(MappingError::config(format!(
                    "write_sessions_fraction must be between 0 and 1, got {}",
                    fraction
                )));
            }
        }
        Ok(o)
    }
}

/// Everything needed to open a client for one database.
#[derive(Debug, Clone, Serialize)]
pub struct ClientOptions {
    pub database_id: DatabaseId,
    pub db_type: DatabaseType,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub connection_string: String,
    pub num_channels: Option<u32>,
    pub prefetch_chunks: Option<u32>,
    pub session_pool: SessionPoolOptions,
    #[serde(skip_serializing)]
    pub acquire_timeout: Duration,
    #[serde(skip_serializing)]
    pub connect_timeout: Duration,
}

impl ClientOptions {
    /// Resolve client options from configuration.
    pub fn from_config(
        config: &Config,
        project_provider: &dyn ProjectIdProvider,
    ) -> MappingResult<Self> {
        let connection_string = config.connection_string()?.to_string();
        let database_id = config.resolve_database_id(project_provider)?;
        Self::from_properties(
            database_id,
            connection_string,
            &config.client_properties(),
            &config.session_pool_properties(),
        )
        .map(|options| Self {
            acquire_timeout: config.acquire_timeout_duration(),
            connect_timeout: config.connect_timeout_duration(),
            ..options
        })
    }

    /// Combine identity, client properties and session pool properties.
    pub fn from_properties(
        database_id: DatabaseId,
        connection_string: String,
        client: &ClientProperties,
        session_pool: &SessionPoolProperties,
    ) -> MappingResult<Self> {
        let db_type = DatabaseType::from_connection_string(&connection_string).ok_or_else(|| {
            MappingError::config(format!(
                "Unknown database type in connection string: {}",
                masked_connection_string(&connection_string)
            ))
        })?;

        let options = Self {
            database_id,
            db_type,
            connection_string,
            num_channels: non_negative(client.num_rpc_channels),
            prefetch_chunks: non_negative(client.prefetch_chunks),
            session_pool: SessionPoolOptions::from_properties(session_pool)?,
            acquire_timeout: Duration::from_secs(crate::config::DEFAULT_ACQUIRE_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(crate::config::DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        debug!(
            database_id = %options.database_id,
            db_type = %options.db_type,
            session_pool = ?options.session_pool,
            "Resolved client options"
        );
        Ok(options)
    }

    /// Masked form of the connection string, safe to log.
    pub fn masked_connection_string(&self) -> String {
        masked_connection_string(&self.connection_string)
    }
}

fn non_negative(v: i32) -> Option<u32> {
    u32::try_from(v).ok()
}

mod duration_minutes {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_secs() / 60)),
            None => serializer.serialize_none(),
        }
    }
}
