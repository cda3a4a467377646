//! Service layer: the spatial search and response assembly.
//!
//! - [`search`]: SpatialQueryEngine, the two-phase search over a track store
//! - [`assembler`]: QueryResultAssembler, metadata join and track decimation
//! - [`error`]: search-level errors and their warning categories

pub mod assembler;
pub mod error;
pub mod search;

pub use assembler::{assemble, build_response};
pub use error::SearchError;
pub use search::{SearchMatches, SearchMode, SearchRequest, ShapeStats, SpatialQueryEngine};
