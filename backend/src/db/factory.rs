//! Builds the track store the process runs against.
//!
//! Selection order: an explicit [`RepositoryType`], a parsed
//! `repository.toml`, or the environment (`REPOSITORY_TYPE`, `DATABASE_URL`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::{PostgresConfig, RepositoryConfig};
use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::config::SearchConfig;

/// Which store backs the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// PostGIS through Diesel
    #[serde(alias = "pg")]
    Postgres,
    /// In-memory store
    Local,
}

impl FromStr for RepositoryType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            other => Err(RepositoryError::configuration(format!(
                "Unknown repository type: {}",
                other
            ))),
        }
    }
}

impl RepositoryType {
    /// `REPOSITORY_TYPE` when set and valid; otherwise Postgres if a
    /// database URL is present, else Local.
    pub fn from_env() -> Self {
        let explicit = std::env::var("REPOSITORY_TYPE")
            .ok()
            .and_then(|value| match value.parse() {
                Ok(kind) => Some(kind),
                Err(err) => {
                    log::warn!("Ignoring REPOSITORY_TYPE: {}", err);
                    None
                }
            });
        if let Some(kind) = explicit {
            return kind;
        }

        let has_url = ["DATABASE_URL", "PG_DATABASE_URL"]
            .iter()
            .any(|name| std::env::var(name).is_ok());
        if has_url {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Build a store of the given type. Postgres needs its settings.
    pub async fn create(
        kind: RepositoryType,
        postgres: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match kind {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Postgres => {
                let config = postgres.cloned().ok_or_else(|| {
                    RepositoryError::configuration("Postgres repository requires PostgresConfig")
                })?;
                connect_postgres(config).await
            }
        }
    }

    /// An empty in-memory store.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Store chosen by [`RepositoryType::from_env`]. Postgres retries are
    /// kept within `SEARCH_STORE_TIMEOUT_MS`.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Postgres => {
                let deadline = SearchConfig::from_env().store_timeout();
                let config = PostgresConfig::from_env()?.within_deadline(deadline);
                Self::create(RepositoryType::Postgres, Some(&config)).await
            }
        }
    }

    pub async fn from_config_file<P: AsRef<Path>>(
        path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(path)?;
        Self::from_repository_config(&config).await
    }

    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match config.repository.kind {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Postgres => {
                let postgres = config.postgres_config()?;
                Self::create(RepositoryType::Postgres, Some(&postgres)).await
            }
        }
    }
}

#[cfg(feature = "postgres-repo")]
async fn connect_postgres(config: PostgresConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
    use super::repositories::PostgresRepository;

    let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
    Ok(Arc::new(repo))
}

#[cfg(not(feature = "postgres-repo"))]
async fn connect_postgres(_config: PostgresConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
    Err(RepositoryError::configuration(
        "Postgres repository feature not enabled",
    ))
}
