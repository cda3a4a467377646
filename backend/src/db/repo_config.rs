//! `repository.toml`: backend selection, Postgres pool settings and search
//! defaults.
//!
//! ```toml
//! [repository]
//! type = "postgres"
//!
//! [postgres]
//! database_url = "postgres://tracks@localhost/tracks"
//! max_retries = 2
//!
//! [search]
//! max_coords = 100
//! store_timeout_ms = 5000
//! ```
//!
//! Every table except `[repository]` is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::factory::RepositoryType;
use super::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::config::{env_or, SearchConfig, DEFAULT_STORE_TIMEOUT_MS};

/// Places searched for `repository.toml`, in order.
const CONFIG_LOCATIONS: [&str; 3] = [
    "repository.toml",
    "backend/repository.toml",
    "../repository.toml",
];

/// Parsed `repository.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: BackendSection,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// The `[repository]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSection {
    #[serde(rename = "type")]
    pub kind: RepositoryType,
}

/// Postgres connection and retry settings, the `[postgres]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Retries after the first attempt of a failed operation
    pub max_retries: u32,
    /// First retry delay; doubles on every retry
    pub retry_delay_ms: u64,
    /// Wall time after which an operation stops retrying
    pub retry_budget_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
            retry_budget_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }
}

impl PostgresConfig {
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    /// Read `DATABASE_URL` (or `PG_DATABASE_URL`) and the optional `PG_*`
    /// pool variables.
    pub fn from_env() -> RepositoryResult<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| {
                RepositoryError::configuration("DATABASE_URL or PG_DATABASE_URL must be set")
            })?;

        let defaults = Self::with_url(database_url);
        Ok(Self {
            max_connections: env_or("PG_POOL_MAX", defaults.max_connections),
            min_connections: env_or("PG_POOL_MIN", defaults.min_connections),
            connect_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connect_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
            retry_budget_ms: env_or("PG_RETRY_BUDGET_MS", defaults.retry_budget_ms),
            ..defaults
        })
    }

    /// Keep retries inside the search's per-query deadline, so a query the
    /// search has given up on does not keep a blocking thread busy.
    pub fn within_deadline(mut self, deadline: Duration) -> Self {
        let deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
        self.retry_budget_ms = self.retry_budget_ms.min(deadline_ms);
        self
    }

    pub fn retry_budget(&self) -> Duration {
        Duration::from_millis(self.retry_budget_ms)
    }
}

impl RepositoryConfig {
    /// Load and parse a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let context = || ErrorContext::new("load_config").with_details(path.display().to_string());

        let content = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e)).at(context())
        })?;
        toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e)).at(context())
        })
    }

    /// The first `repository.toml` found in the usual locations.
    ///
    /// `Ok(None)` when there is none; a file that exists but does not parse
    /// is an error.
    pub fn from_default_location() -> RepositoryResult<Option<Self>> {
        CONFIG_LOCATIONS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
            .map(Self::from_file)
            .transpose()
    }

    /// Search defaults from the `[search]` table, then `SEARCH_*` variables.
    pub fn search_config(&self) -> SearchConfig {
        self.search.clone().with_env_overrides()
    }

    /// Postgres settings checked for use, with the retry budget capped by
    /// the search deadline.
    pub fn postgres_config(&self) -> RepositoryResult<PostgresConfig> {
        if self.postgres.database_url.trim().is_empty() {
            return Err(RepositoryError::configuration(
                "Postgres repository requires 'postgres.database_url' setting",
            ));
        }
        Ok(self
            .postgres
            .clone()
            .within_deadline(self.search_config().store_timeout()))
    }
}
