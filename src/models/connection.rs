//! Connection-related data models.
//!
//! This module defines the database identity and backend type a mapping
//! client is wired against.

use crate::error::{MappingError, MappingResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    /// Parse database type from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if lower.starts_with("sqlite://") || lower.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    /// Get the display name for this database type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Fully qualified identity of the database a client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatabaseId {
    pub project_id: String,
    pub instance_id: String,
    pub database: String,
}

impl DatabaseId {
    /// Build an id, rejecting empty components.
    pub fn new(
        project_id: impl Into<String>,
        instance_id: impl Into<String>,
        database: impl Into<String>,
    ) -> MappingResult<Self> {
        let id = Self {
            project_id: project_id.into(),
            instance_id: instance_id.into(),
            database: database.into(),
        };

        for (name, value) in [
            ("project_id", &id.project_id),
            ("instance_id", &id.instance_id),
            ("database", &id.database),
        ] {
            if value.trim().is_empty() {
                return Err(MappingError::config(format!("{} cannot be empty", name)));
            }
            if value.contains('/') {
                return Err(MappingError::config(format!(
                    "{} cannot contain '/': {}",
                    name, value
                )));
            }
        }

        Ok(id)
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/instances/{}/databases/{}",
            self.project_id, self.instance_id, self.database
        )
    }
}

/// Database name taken from the last path segment of a connection URL.
pub fn database_name_from_url(connection_string: &str) -> Option<String> {
    let url = Url::parse(connection_string).ok()?;
    url.path()
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches(".sqlite").trim_end_matches(".db"))
        .filter(|s| !s.is_empty() && *s != ":memory:")
        .map(String::from)
}

/// Display-safe version of a connection string (password masked).
pub fn masked_connection_string(connection_string: &str) -> String {
    match Url::parse(connection_string) {
        Ok(mut url) if url.password().is_some() => {
            // set_password only fails for URLs that cannot carry credentials.
            if url.set_password(Some("****")).is_ok() {
                url.to_string()
            } else {
                connection_string.to_string()
            }
        }
        _ => connection_string.to_string(),
    }
}
