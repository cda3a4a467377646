//! Public API surface for the track search.
//!
//! This file consolidates the identifier types and the response DTOs
//! returned to the web layer. All types derive Serialize/Deserialize for
//! JSON serialization.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cruise identifier (expocode), unique across the archive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CruiseId(pub String);

/// Track identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl CruiseId {
    pub fn new(value: impl Into<String>) -> Self {
        CruiseId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TrackId {
    pub fn new(value: i64) -> Self {
        TrackId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CruiseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CruiseId {
    fn from(value: &str) -> Self {
        CruiseId(value.to_string())
    }
}

impl From<String> for CruiseId {
    fn from(value: String) -> Self {
        CruiseId(value)
    }
}

impl From<TrackId> for i64 {
    fn from(id: TrackId) -> Self {
        id.0
    }
}

/// Descriptive cruise record shown next to a track on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CruiseMetadata {
    pub name: String,
    /// Hydrographic line or program designation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chief_scientist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl CruiseMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line: None,
            chief_scientist: None,
            ship: None,
            begin_date: None,
            end_date: None,
        }
    }
}

/// Category of a per-shape fault.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    InvalidShapeEncoding,
    DegenerateGeometry,
    StoreUnavailable,
    /// A returned cruise whose descriptive record could not be read
    MetadataUnavailable,
}

/// Something the response is missing, and why.
///
/// Shape warnings carry `shape_index` and `shape`: that shape contributed
/// nothing. Cruise warnings carry `cruise_id`: the cruise is returned
/// without its `i` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchWarning {
    /// Position of the shape in the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_index: Option<usize>,
    /// The shape as submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cruise_id: Option<CruiseId>,
    pub kind: WarningKind,
    pub message: String,
}

impl SearchWarning {
    pub fn for_shape(
        shape_index: usize,
        shape: impl Into<String>,
        kind: WarningKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            shape_index: Some(shape_index),
            shape: Some(shape.into()),
            cruise_id: None,
            kind,
            message: message.into(),
        }
    }

    pub fn for_cruise(cruise_id: CruiseId, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            shape_index: None,
            shape: None,
            cruise_id: Some(cruise_id),
            kind,
            message: message.into(),
        }
    }
}

/// Search result as serialized to the map client.
///
/// `id_t` always holds every returned cruise, with `null` for cruises that
/// have no track. `i` and `t` only hold entries that exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Cruise id to track id
    pub id_t: BTreeMap<CruiseId, Option<TrackId>>,
    /// Cruise id to metadata
    pub i: BTreeMap<CruiseId, CruiseMetadata>,
    /// Cruise id to simplified `[x, y]` coordinates
    pub t: BTreeMap<CruiseId, Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SearchWarning>,
}

impl SearchResponse {
    pub fn len(&self) -> usize {
        self.id_t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_t.is_empty()
    }

    pub fn contains(&self, cruise_id: &CruiseId) -> bool {
        self.id_t.contains_key(cruise_id)
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
