//! Two-phase track search.
//!
//! Each query shape is normalized to a polygon, the store returns every
//! track whose bounding rectangle touches the polygon's bounding rectangle,
//! and the candidates are then refined with the ray-casting containment test
//! on their recorded positions. Per-shape results are unioned by cruise.
//!
//! A shape that fails (bad encoding, degenerate ring, store error or
//! timeout) contributes nothing and is reported as a [`SearchWarning`]; the
//! other shapes are unaffected.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::assembler;
use super::error::SearchError;
use crate::algorithms::{any_vertex_inside, within_great_circle};
use crate::api::{CruiseId, SearchResponse, SearchWarning};
use crate::config::SearchConfig;
use crate::db::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::db::services::text_query_cruises;
use crate::models::{BoundingBox, Point, Polygon, QueryShape, TimeWindow, Track};

/// Raw search parameters as received from a client.
///
/// Only one mode runs: `shapes` when any are given, else `ids`, else `q`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Encoded shapes, `"<kind>:<x1>,<y1>_<x2>,<y2>_..."`
    pub shapes: Vec<String>,
    pub ids: Vec<CruiseId>,
    pub q: Option<String>,
    pub min_time: Option<i32>,
    pub max_time: Option<i32>,
    /// Points kept per returned track; the configured default when absent
    pub max_coords: Option<usize>,
}

/// The lookup a request resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    Shapes(Vec<String>),
    Ids(Vec<CruiseId>),
    Text(String),
    Empty,
}

impl SearchRequest {
    pub fn mode(&self) -> SearchMode {
        if !self.shapes.is_empty() {
            return SearchMode::Shapes(self.shapes.clone());
        }
        if !self.ids.is_empty() {
            return SearchMode::Ids(self.ids.clone());
        }
        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => SearchMode::Text(q.to_string()),
            _ => SearchMode::Empty,
        }
    }
}

/// Candidate and match counts for one evaluated shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeStats {
    pub shape_index: usize,
    pub candidates: usize,
    pub matches: usize,
}

/// Matched cruises before metadata and simplification.
///
/// `tracks` maps each cruise to its track, or `None` for cruises found by
/// identifier or text that have no track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchMatches {
    pub tracks: BTreeMap<CruiseId, Option<Track>>,
    pub warnings: Vec<SearchWarning>,
    pub stats: Vec<ShapeStats>,
}

impl SearchMatches {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cruise_ids(&self) -> impl Iterator<Item = &CruiseId> {
        self.tracks.keys()
    }
}

type ShapeOutcome = Result<(Vec<Track>, ShapeStats), SearchWarning>;

/// Spatial search over a [`FullRepository`].
///
/// # Example
/// ```ignore
/// let engine = SpatialQueryEngine::new(repo, SearchConfig::from_env());
/// let response = engine.execute(&SearchRequest {
///     shapes: vec!["rectangle:0,0_10,10".into()],
///     ..Default::default()
/// }).await?;
/// ```
#[derive(Clone)]
pub struct SpatialQueryEngine {
    store: Arc<dyn FullRepository>,
    config: SearchConfig,
}

impl SpatialQueryEngine {
    pub fn new(store: Arc<dyn FullRepository>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn FullRepository> {
        &self.store
    }

    /// Run a request end to end and build the client response.
    pub async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let matches = self.run(request).await?;
        let max_coords = request.max_coords.unwrap_or(self.config.max_coords);
        Ok(assembler::assemble(self.store.as_ref(), matches, max_coords).await)
    }

    /// Resolve a request to matched cruises.
    ///
    /// Shape failures become warnings; identifier and text lookups fail as a
    /// whole when the store does.
    pub async fn run(&self, request: &SearchRequest) -> Result<SearchMatches, SearchError> {
        match request.mode() {
            SearchMode::Shapes(encoded) => {
                let window = self.config.window(request.min_time, request.max_time);
                Ok(self.search_encoded(&encoded, &window).await)
            }
            SearchMode::Ids(ids) => self.lookup_ids(&ids).await,
            SearchMode::Text(q) => self.text_query(&q).await,
            SearchMode::Empty => Ok(SearchMatches::default()),
        }
    }

    /// Search with shapes still in their string encoding.
    ///
    /// Strings that fail to parse are reported with
    /// [`WarningKind::InvalidShapeEncoding`](crate::api::WarningKind) and
    /// keep their position in the warning's `shape_index`.
    pub async fn search_encoded(&self, encoded: &[String], window: &TimeWindow) -> SearchMatches {
        let mut shapes = Vec::with_capacity(encoded.len());
        let mut warnings = Vec::new();

        for (index, raw) in encoded.iter().enumerate() {
            match raw.parse::<QueryShape>() {
                Ok(shape) => shapes.push((index, shape)),
                Err(e) => {
                    warn!("shape {} skipped: {}", index, e);
                    warnings.push(SearchError::from(e).into_warning(index, raw.as_str()));
                }
            }
        }

        let mut matches = self.search_indexed(&shapes, window).await;
        warnings.append(&mut matches.warnings);
        warnings.sort_by_key(|w| w.shape_index);
        matches.warnings = warnings;
        matches
    }

    /// Union of the matches of every shape.
    pub async fn search(&self, shapes: &[QueryShape], window: &TimeWindow) -> SearchMatches {
        let indexed: Vec<(usize, QueryShape)> = shapes.iter().cloned().enumerate().collect();
        self.search_indexed(&indexed, window).await
    }

    async fn search_indexed(
        &self,
        shapes: &[(usize, QueryShape)],
        window: &TimeWindow,
    ) -> SearchMatches {
        let outcomes: Vec<ShapeOutcome> = if self.config.parallel_shapes {
            join_all(
                shapes
                    .iter()
                    .map(|(index, shape)| self.search_shape(*index, shape, window)),
            )
            .await
        } else {
            let mut outcomes = Vec::with_capacity(shapes.len());
            for (index, shape) in shapes {
                outcomes.push(self.search_shape(*index, shape, window).await);
            }
            outcomes
        };

        let mut matches = SearchMatches::default();
        for outcome in outcomes {
            match outcome {
                Ok((tracks, stats)) => {
                    for track in tracks {
                        matches
                            .tracks
                            .entry(track.cruise_id.clone())
                            .or_insert(Some(track));
                    }
                    matches.stats.push(stats);
                }
                Err(warning) => matches.warnings.push(warning),
            }
        }

        debug!(
            "search over {} shapes: {} cruises, {} warnings",
            shapes.len(),
            matches.tracks.len(),
            matches.warnings.len()
        );
        matches
    }

    async fn search_shape(
        &self,
        index: usize,
        shape: &QueryShape,
        window: &TimeWindow,
    ) -> ShapeOutcome {
        let fail = |err: SearchError| {
            warn!("shape {} ({}) skipped: {}", index, shape, err);
            err.into_warning(index, shape.to_string())
        };

        let polygon = shape
            .normalize(self.config.circle_steps)
            .map_err(|e| fail(e.into()))?;
        let bounds = self
            .coarse_bounds(shape, &polygon)
            .ok_or_else(|| fail(SearchError::DegenerateGeometry { distinct_vertices: 0 }))?;

        let candidates = self
            .with_deadline("find_candidates", self.store.find_candidates(&bounds, window))
            .await
            .map_err(|e| fail(e.into()))?;

        let candidate_count = candidates.len();
        let matched: Vec<Track> = candidates
            .into_iter()
            .filter(|track| track.within(window) && self.refine(shape, &polygon, &track.points))
            .collect();

        debug!(
            "shape {} ({}): {} candidates, {} matches",
            index,
            shape.kind(),
            candidate_count,
            matched.len()
        );

        let stats = ShapeStats {
            shape_index: index,
            candidates: candidate_count,
            matches: matched.len(),
        };
        Ok((matched, stats))
    }

    /// Rectangle handed to the store's coarse filter.
    ///
    /// With geodesic circles enabled the planar box is widened to cover the
    /// great-circle radius, whose longitude span grows with latitude.
    fn coarse_bounds(&self, shape: &QueryShape, polygon: &Polygon) -> Option<BoundingBox> {
        let planar = polygon.bounding_box()?;
        match shape {
            QueryShape::Circle { center, radius } if self.config.geodesic_circles => {
                Some(planar.union(&geodesic_circle_bounds(center, *radius)))
            }
            _ => Some(planar),
        }
    }

    fn refine(&self, shape: &QueryShape, polygon: &Polygon, points: &[Point]) -> bool {
        if any_vertex_inside(polygon, points) {
            return true;
        }
        match shape {
            QueryShape::Circle { center, radius } if self.config.geodesic_circles => points
                .iter()
                .any(|p| within_great_circle(center, *radius, p)),
            _ => false,
        }
    }

    /// Tracks for explicit cruise identifiers.
    ///
    /// Every requested identifier appears in the result; unknown ones and
    /// cruises without a track map to `None`.
    pub async fn lookup_ids(&self, ids: &[CruiseId]) -> Result<SearchMatches, SearchError> {
        let mut unique: Vec<CruiseId> = ids.to_vec();
        unique.sort();
        unique.dedup();

        let found = self
            .with_deadline("find_by_identifiers", self.store.find_by_identifiers(&unique))
            .await?;

        let mut tracks: BTreeMap<CruiseId, Option<Track>> =
            unique.into_iter().map(|id| (id, None)).collect();
        for track in found {
            if let Some(slot) = tracks.get_mut(&track.cruise_id) {
                if slot.is_none() {
                    *slot = Some(track);
                }
            }
        }

        debug!("identifier lookup: {} cruises", tracks.len());
        Ok(SearchMatches {
            tracks,
            ..Default::default()
        })
    }

    /// Free-text lookup; only the best-ranked group of cruises is used.
    pub async fn text_query(&self, query: &str) -> Result<SearchMatches, SearchError> {
        let ids = self
            .with_deadline("text_search", text_query_cruises(self.store.as_ref(), query))
            .await?;
        if ids.is_empty() {
            return Ok(SearchMatches::default());
        }
        self.lookup_ids(&ids).await
    }

    async fn with_deadline<T>(
        &self,
        operation: &str,
        fut: impl std::future::Future<Output = RepositoryResult<T>>,
    ) -> RepositoryResult<T> {
        let deadline = self.config.store_timeout();
        match tokio::time::timeout(deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(
                RepositoryError::timeout(format!("no answer within {} ms", deadline.as_millis()))
                    .at(ErrorContext::new(operation)),
            ),
        }
    }
}

/// Bounding box of all points within `radius_deg` degrees of arc of `center`.
fn geodesic_circle_bounds(center: &Point, radius_deg: f64) -> BoundingBox {
    let min_y = (center.y - radius_deg).max(-90.0);
    let max_y = (center.y + radius_deg).min(90.0);

    // Longitude span is widest at the latitude farthest from the equator.
    let widest = min_y.abs().max(max_y.abs());
    let cos_lat = widest.to_radians().cos();
    let half_width = if cos_lat > 1e-9 {
        (radius_deg / cos_lat).min(180.0)
    } else {
        180.0
    };

    BoundingBox::new(center.x - half_width, min_y, center.x + half_width, max_y)
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
