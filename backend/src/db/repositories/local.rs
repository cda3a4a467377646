//! In-memory local repository implementation.
//!
//! This module provides a local implementation of the repository traits
//! suitable for unit testing and local development. Cruises and tracks are
//! kept in maps behind a single lock, giving fast, deterministic and isolated
//! execution. Failure injection hooks let tests simulate an unreachable or
//! slow store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use crate::api::{CruiseId, CruiseMetadata, TrackId};
use crate::db::repository::*;
use crate::models::{BoundingBox, Point, TimeWindow, Track, TrackCandidate};

/// In-memory local repository.
///
/// # Example
/// ```
/// use cruise_tracks::api::{CruiseId, CruiseMetadata};
/// use cruise_tracks::db::repositories::LocalRepository;
/// use cruise_tracks::models::Point;
///
/// let repo = LocalRepository::new();
/// repo.insert_cruise(CruiseId::new("33RR20160208"), CruiseMetadata::named("I08S"));
/// let track_id = repo.insert_track(CruiseId::new("33RR20160208"), vec![Point::new(80.0, -40.0)]);
/// assert_eq!(repo.track_count(), 1);
/// # let _ = track_id;
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct StoredTrack {
    id: TrackId,
    points: Vec<Point>,
    bbox: Option<BoundingBox>,
}

struct LocalData {
    cruises: BTreeMap<CruiseId, CruiseMetadata>,
    tracks: HashMap<CruiseId, StoredTrack>,

    next_track_id: i64,

    // Connection health
    is_healthy: bool,
    // Coarse queries whose bounds intersect one of these regions fail
    failing_regions: Vec<BoundingBox>,
    // Artificial latency for coarse queries
    candidate_delay: Option<Duration>,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            cruises: BTreeMap::new(),
            tracks: HashMap::new(),
            next_track_id: 1,
            is_healthy: true,
            failing_regions: Vec::new(),
            candidate_delay: None,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Add or replace a cruise record.
    pub fn insert_cruise(&self, cruise_id: CruiseId, metadata: CruiseMetadata) {
        self.data.write().cruises.insert(cruise_id, metadata);
    }

    /// Attach a track to a cruise, replacing any previous one.
    ///
    /// The track's dates come from the cruise record at query time.
    ///
    /// # Returns
    /// The ID assigned to the track
    pub fn insert_track(&self, cruise_id: CruiseId, points: Vec<Point>) -> TrackId {
        let mut data = self.data.write();
        let id = TrackId::new(data.next_track_id);
        data.next_track_id += 1;

        let bbox = BoundingBox::from_points(&points);
        data.tracks.insert(cruise_id, StoredTrack { id, points, bbox });
        id
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Make coarse queries touching `region` fail with a connection error.
    pub fn fail_candidates_in(&self, region: BoundingBox) {
        self.data.write().failing_regions.push(region);
    }

    /// Delay every coarse query by `delay`, for deadline tests.
    pub fn set_candidate_delay(&self, delay: Option<Duration>) {
        self.data.write().candidate_delay = delay;
    }

    /// Clear all data and injected faults.
    pub fn clear(&self) {
        *self.data.write() = LocalData::default();
    }

    pub fn cruise_count(&self) -> usize {
        self.data.read().cruises.len()
    }

    pub fn track_count(&self) -> usize {
        self.data.read().tracks.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(
                RepositoryError::connection("Database is not healthy").at(ErrorContext::new(operation)),
            );
        }
        Ok(())
    }

    fn build_track(data: &LocalData, cruise_id: &CruiseId, stored: &StoredTrack) -> Track {
        let metadata = data.cruises.get(cruise_id);
        Track {
            id: stored.id,
            cruise_id: cruise_id.clone(),
            points: stored.points.clone(),
            begin_date: metadata.and_then(|m| m.begin_date),
            end_date: metadata.and_then(|m| m.end_date),
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackStore for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn find_candidates(
        &self,
        bounds: &BoundingBox,
        window: &TimeWindow,
    ) -> RepositoryResult<Vec<TrackCandidate>> {
        let delay = self.data.read().candidate_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.check_health("find_candidates")?;

        let data = self.data.read();
        if data.failing_regions.iter().any(|r| r.intersects(bounds)) {
            return Err(RepositoryError::connection("Injected store failure").at(
                ErrorContext::new("find_candidates").with_details(bounds.to_wkt_polygon()),
            ));
        }

        let candidates = data
            .tracks
            .iter()
            .filter(|(_, stored)| stored.bbox.is_some_and(|b| b.intersects(bounds)))
            .map(|(cruise_id, stored)| Self::build_track(&data, cruise_id, stored))
            .filter(|track| track.within(window))
            .collect();

        Ok(candidates)
    }

    async fn find_by_identifiers(&self, ids: &[CruiseId]) -> RepositoryResult<Vec<Track>> {
        self.check_health("find_by_identifiers")?;

        let data = self.data.read();
        Ok(ids
            .iter()
            .filter_map(|id| {
                data.tracks
                    .get(id)
                    .map(|stored| Self::build_track(&data, id, stored))
            })
            .collect())
    }

    async fn text_search(&self, query: &str) -> RepositoryResult<Vec<Vec<CruiseId>>> {
        self.check_health("text_search")?;

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&needle));

        let data = self.data.read();
        let mut primary = Vec::new();
        let mut secondary = Vec::new();
        for (id, metadata) in &data.cruises {
            if hit(Some(id.as_str())) || hit(Some(&metadata.name)) {
                primary.push(id.clone());
            } else if hit(metadata.line.as_deref())
                || hit(metadata.chief_scientist.as_deref())
                || hit(metadata.ship.as_deref())
            {
                secondary.push(id.clone());
            }
        }

        Ok([primary, secondary]
            .into_iter()
            .filter(|group| !group.is_empty())
            .collect())
    }
}

#[async_trait]
impl CruiseMetadataRepository for LocalRepository {
    async fn lookup_metadata(
        &self,
        cruise_id: &CruiseId,
    ) -> RepositoryResult<Option<CruiseMetadata>> {
        self.check_health("lookup_metadata")?;
        Ok(self.data.read().cruises.get(cruise_id).cloned())
    }
}
