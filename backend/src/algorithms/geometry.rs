//! Geometry kernel: containment, polygon construction and distance.
//!
//! All functions here are pure and allocation-light so they can be called
//! from concurrent shape tasks without synchronization.

use crate::models::{Point, Polygon, Ring};

/// Mean Earth radius used by [`great_circle_distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.01;

/// Kilometers per degree of arc on a sphere of [`EARTH_RADIUS_KM`].
pub const KM_PER_DEGREE: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_KM / 360.0;

/// Ray-casting parity test of `point` against a ring.
///
/// Casts a horizontal ray towards +x and counts crossings with each edge
/// `(ring[i], ring[i - 1 mod n])` whose y-extent strictly contains
/// `point.y`. The crossing abscissa is
/// `v2.x + (v1.x - v2.x) * (point.y - v2.y) / (v1.y - v2.y)`; the parity
/// flips when `point.x` is strictly left of it.
///
/// Boundary behavior follows from the strict comparisons: points on the left
/// or lower edge of an axis-aligned square count as inside only when some
/// crossing lies to their right, and every vertex whose y equals the ray's
/// y is skipped. In particular the south-west corner of a square is outside.
///
/// Rings with fewer than 3 points never contain anything. Horizontal edges
/// are never crossed, so the division is always by a non-zero value.
pub fn point_in_polygon(ring: &[Point], point: &Point) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    for i in 0..n {
        let v1 = &ring[i];
        let v2 = &ring[(i + n - 1) % n];

        let spans = (v1.y < point.y && point.y < v2.y) || (v2.y < point.y && point.y < v1.y);
        if !spans {
            continue;
        }

        let x_intersect = v2.x + (v1.x - v2.x) * (point.y - v2.y) / (v1.y - v2.y);
        if point.x < x_intersect {
            inside = !inside;
        }
    }
    inside
}

/// Containment against the outer ring of `polygon`; holes are ignored.
pub fn polygon_contains(polygon: &Polygon, point: &Point) -> bool {
    point_in_polygon(polygon.exterior().points(), point)
}

/// True when at least one of `points` lies inside the polygon's outer ring.
///
/// This samples vertices only: a track that passes through the polygon
/// without a recorded position inside it is not detected.
pub fn any_vertex_inside(polygon: &Polygon, points: &[Point]) -> bool {
    let ring = polygon.exterior().points();
    points.iter().any(|p| point_in_polygon(ring, p))
}

/// Build a polygon from nested `[x, y]` coordinate rings.
///
/// The first ring is the outer boundary, any further rings are holes. Ring
/// closure is not checked.
pub fn polygon_from_rings(rings: &[Vec<[f64; 2]>]) -> Polygon {
    let mut rings = rings
        .iter()
        .map(|coords| Ring::new(coords.iter().map(|[x, y]| Point::new(*x, *y)).collect()));

    let outer = rings.next().unwrap_or_default();
    Polygon::with_holes(outer, rings.collect())
}

/// Haversine distance in kilometers between two `(lon, lat)` points.
pub fn great_circle_distance_km(a: &Point, b: &Point) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = (b.y - a.y).to_radians();
    let dlon = (b.x - a.x).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// True when `point` lies within `radius_deg` degrees of arc of `center`,
/// measured along the great circle.
pub fn within_great_circle(center: &Point, radius_deg: f64, point: &Point) -> bool {
    great_circle_distance_km(center, point) <= radius_deg * KM_PER_DEGREE
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod geometry_tests;
