//! Track store trait: coarse spatial queries and direct lookups.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::CruiseId;
use crate::models::{BoundingBox, TimeWindow, Track, TrackCandidate};

/// Read-only access to stored cruise tracks.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the search engine queries the store
/// from several shape tasks at once.
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Check if the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Coarse spatial and temporal filter.
    ///
    /// Returns every track whose bounding rectangle intersects `bounds` and
    /// whose cruise dates overlap `window`. This is a superset of the exact
    /// answer; callers refine the candidates themselves.
    ///
    /// # Returns
    /// * `Ok(Vec<TrackCandidate>)` - Candidates, in no particular order
    /// * `Err(RepositoryError)` - Connection and timeout errors mean the store is unavailable
    async fn find_candidates(
        &self,
        bounds: &BoundingBox,
        window: &TimeWindow,
    ) -> RepositoryResult<Vec<TrackCandidate>>;

    /// Tracks for the given cruises. Cruises without a track are simply
    /// absent from the result.
    async fn find_by_identifiers(&self, ids: &[CruiseId]) -> RepositoryResult<Vec<Track>>;

    /// Track of a single cruise, if it has one.
    async fn find_track(&self, cruise_id: &CruiseId) -> RepositoryResult<Option<Track>> {
        let mut tracks = self.find_by_identifiers(std::slice::from_ref(cruise_id)).await?;
        Ok(tracks.pop())
    }

    /// Free-text lookup over cruise metadata.
    ///
    /// Results come back in groups ordered by relevance; the search engine
    /// only uses the first group.
    async fn text_search(&self, query: &str) -> RepositoryResult<Vec<Vec<CruiseId>>>;
}
