//! Cruise metadata lookups.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{CruiseId, CruiseMetadata};

/// Source of descriptive cruise records.
#[async_trait]
pub trait CruiseMetadataRepository: Send + Sync {
    /// Metadata for one cruise; `Ok(None)` when no record exists.
    async fn lookup_metadata(&self, cruise_id: &CruiseId)
        -> RepositoryResult<Option<CruiseMetadata>>;
}
