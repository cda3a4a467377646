//! Data Transfer Objects for the HTTP API.
//!
//! The search response is [`crate::api::SearchResponse`] as is; this module
//! only adds the health payload and the query-string decoding.

use serde::{Deserialize, Serialize};

pub use crate::api::{CruiseMetadata, SearchResponse, SearchWarning, WarningKind};
pub use crate::services::SearchRequest;

use crate::api::{CruiseId, TrackId};
use crate::models::Track;
use crate::services::SearchError;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Single cruise with its full, undecimated track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CruiseResponse {
    pub cruise_id: CruiseId,
    pub track_id: Option<TrackId>,
    pub coordinates: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CruiseMetadata>,
}

impl CruiseResponse {
    pub fn new(cruise_id: CruiseId, track: Option<Track>, metadata: Option<CruiseMetadata>) -> Self {
        let (track_id, coordinates) = match track {
            Some(track) => (
                Some(track.id),
                track.points.into_iter().map(|p| p.to_pair()).collect(),
            ),
            None => (None, Vec::new()),
        };
        Self {
            cruise_id,
            track_id,
            coordinates,
            metadata,
        }
    }
}

/// Separator accepted inside a single list-valued query parameter.
pub const LIST_SEPARATOR: char = '|';

/// Build a [`SearchRequest`] from decoded query-string pairs.
///
/// `shapes` and `ids` may be repeated (`shapes=a&shapes=b`), written with
/// brackets (`shapes[]=a`), or packed into one value separated by `|`.
/// Unknown keys are ignored.
pub fn search_request_from_pairs(pairs: &[(String, String)]) -> Result<SearchRequest, SearchError> {
    let mut request = SearchRequest::default();

    for (key, value) in pairs {
        match key.trim_end_matches("[]") {
            "shapes" => request.shapes.extend(split_list(value)),
            "ids" => request.ids.extend(split_list(value).map(CruiseId::from)),
            "q" => request.q = Some(value.clone()),
            "min_time" => request.min_time = parse_param(key, value)?,
            "max_time" => request.max_time = parse_param(key, value)?,
            "max_coords" => request.max_coords = parse_param(key, value)?,
            _ => {}
        }
    }

    Ok(request)
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

/// Empty values count as absent.
fn parse_param<T: std::str::FromStr>(key: &str, value: &str) -> Result<Option<T>, SearchError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| SearchError::invalid_request(format!("'{}' is not a valid {}", value, key)))
}
