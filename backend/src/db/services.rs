//! Repository-agnostic helpers over the store traits.
//!
//! These functions work with any [`FullRepository`] and hold the small bits
//! of lookup policy the search engine and the HTTP layer share.
//!
//! # Usage
//!
//! ```no_run
//! use cruise_tracks::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let healthy = services::health_check(&repo).await?;
//!     println!("store healthy: {}", healthy);
//!     Ok(())
//! }
//! ```

use log::debug;

use super::repository::{FullRepository, RepositoryResult};
use crate::api::{CruiseId, CruiseMetadata};
use crate::models::Track;

// ==================== Health & Connection ====================

/// Check if the backing store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Lookups ====================

/// Cruises matching a free-text query, best group only.
///
/// The store ranks its hits into groups; anything past the first group is
/// discarded. An empty query matches nothing.
pub async fn text_query_cruises<R: FullRepository + ?Sized>(
    repo: &R,
    query: &str,
) -> RepositoryResult<Vec<CruiseId>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let groups = repo.text_search(query).await?;
    debug!("text query {:?}: {} result groups", query, groups.len());
    Ok(groups.into_iter().next().unwrap_or_default())
}

/// Track and metadata of a single cruise.
pub async fn get_cruise<R: FullRepository + ?Sized>(
    repo: &R,
    cruise_id: &CruiseId,
) -> RepositoryResult<(Option<Track>, Option<CruiseMetadata>)> {
    let track = repo.find_track(cruise_id).await?;
    let metadata = repo.lookup_metadata(cruise_id).await?;
    Ok((track, metadata))
}
