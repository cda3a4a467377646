//! Track storage for the search.
//!
//! This module provides abstractions for store access via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Search engine / REST API                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Health checks                                        │
//! │  - Free-text group selection                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                        │
//! │  - TrackStore (coarse, identifier and text queries)     │
//! │  - CruiseMetadataRepository                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼──────────────────┐  ┌──────────▼──────────────┐
//! │ Postgres Repository  │  │ Local Repository        │
//! │ (PostGIS, Diesel)    │  │ (in-memory)             │
//! └──────────────────────┘  └─────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use cruise_tracks::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let healthy = services::health_check(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

// Feature flag priority: postgres > local
// When multiple features are enabled (e.g., --all-features), postgres takes precedence.
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod retry;
pub mod services;


pub use services::{get_cruise, health_check, text_query_cruises};

pub use repo_config::{PostgresConfig, RepositoryConfig};
pub use retry::RetryPolicy;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    CruiseMetadataRepository, ErrorContext, ErrorKind, FullRepository, RepositoryError,
    RepositoryResult, TrackStore,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository singleton.
///
/// Uses `repository.toml` when one is found in the standard locations,
/// otherwise the environment (`REPOSITORY_TYPE`, `DATABASE_URL`). A config
/// file that exists but does not parse is an error.
pub async fn init_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(repo);
    }

    let config = RepositoryConfig::from_default_location()
        .context("Failed to read repository.toml")?;
    let repo = match config {
        Some(config) => RepositoryFactory::from_repository_config(&config).await,
        None => RepositoryFactory::from_env().await,
    }
    .context("Failed to initialize track repository")?;

    Ok(REPOSITORY.get_or_init(|| repo))
}
