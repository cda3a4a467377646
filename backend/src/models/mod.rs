//! Domain values for the track search: geometry, query shapes and tracks.

pub mod geometry;
pub mod shape;
pub mod track;

pub use geometry::{BoundingBox, Point, Polygon, Ring};
pub use shape::{GeometryError, QueryShape, DEFAULT_CIRCLE_STEPS};
pub use track::{current_year, TimeWindow, Track, TrackCandidate, DEFAULT_MIN_YEAR};
