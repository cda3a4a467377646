//! Geometry and decimation algorithms used by the track search.
//!
//! # Components
//!
//! - [`geometry`]: ray-casting containment, polygon construction, great-circle distance
//! - [`simplify`]: fixed-stride track decimation for map display

pub mod geometry;
pub mod simplify;

pub use geometry::{
    any_vertex_inside, great_circle_distance_km, point_in_polygon, polygon_contains,
    polygon_from_rings, within_great_circle, EARTH_RADIUS_KM, KM_PER_DEGREE,
};
pub use simplify::{decimation_step, simplify, simplify_to_pairs, DEFAULT_MAX_POINTS};
