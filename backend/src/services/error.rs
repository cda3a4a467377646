//! Errors raised by the search services.

use crate::api::{SearchWarning, WarningKind};
use crate::db::repository::RepositoryError;
use crate::models::GeometryError;

/// Search-level failure.
///
/// In shapes mode every variant is recovered per shape and reported as a
/// [`SearchWarning`]; identifier and free-text lookups return it directly.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid shape encoding '{input}': {reason}")]
    InvalidShapeEncoding { input: String, reason: String },

    #[error("degenerate geometry: {distinct_vertices} distinct vertices, at least 3 required")]
    DegenerateGeometry { distinct_vertices: usize },

    #[error("track store unavailable: {0}")]
    StoreUnavailable(#[from] RepositoryError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<GeometryError> for SearchError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InvalidShapeEncoding { input, reason } => {
                Self::InvalidShapeEncoding { input, reason }
            }
            GeometryError::DegenerateGeometry { distinct_vertices } => {
                Self::DegenerateGeometry { distinct_vertices }
            }
        }
    }
}

impl SearchError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Warning category for a per-shape failure.
    pub fn warning_kind(&self) -> WarningKind {
        match self {
            Self::InvalidShapeEncoding { .. } | Self::InvalidRequest(_) => {
                WarningKind::InvalidShapeEncoding
            }
            Self::DegenerateGeometry { .. } => WarningKind::DegenerateGeometry,
            Self::StoreUnavailable(_) => WarningKind::StoreUnavailable,
        }
    }

    /// Record this error against the shape at `shape_index`.
    pub fn into_warning(self, shape_index: usize, shape: impl Into<String>) -> SearchWarning {
        SearchWarning::for_shape(shape_index, shape, self.warning_kind(), self.to_string())
    }
}
