//! Geometry value types shared by the search pipeline.
//!
//! Coordinates are WGS84 degrees with `x` = longitude and `y` = latitude.
//! Axis order is always `(x, y)`; nothing in this crate swaps it.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// `[x, y]` pair as serialized in search responses.
    pub fn to_pair(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for geo::Coord<f64> {
    fn from(p: Point) -> Self {
        geo::coord! { x: p.x, y: p.y }
    }
}

/// A polygon boundary. Implicitly closed: the closing edge from the last
/// vertex back to the first is always considered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of pairwise distinct vertices. A trailing vertex equal to the
    /// first one (explicit closure) is not counted twice.
    pub fn distinct_vertices(&self) -> usize {
        let mut distinct: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if !distinct.contains(p) {
                distinct.push(*p);
            }
        }
        distinct.len()
    }

    /// True when the ring cannot enclose any area (fewer than 3 distinct vertices).
    pub fn is_degenerate(&self) -> bool {
        self.distinct_vertices() < 3
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }
}

/// One outer ring and zero or more holes.
///
/// Containment only ever looks at the outer ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub outer: Ring,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(outer: Ring) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: Ring, holes: Vec<Ring>) -> Self {
        Self { outer, holes }
    }

    pub fn exterior(&self) -> &Ring {
        &self.outer
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.outer.bounding_box()
    }
}

/// Axis-aligned bounding rectangle in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Bounding box of a point sequence, `None` when it is empty.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        use geo::BoundingRect;

        let line: geo::LineString<f64> = points.iter().map(|p| geo::Coord::from(*p)).collect();
        line.bounding_rect().map(Self::from)
    }

    pub fn southwest(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn northeast(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Closed-boundary overlap test; touching edges count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        use geo::Intersects;

        geo::Rect::from(*self).intersects(&geo::Rect::from(*other))
    }

    /// WKT `POLYGON` of this rectangle, closed, counter-clockwise from the
    /// south-west corner.
    pub fn to_wkt_polygon(&self) -> String {
        format!(
            "POLYGON(({minx} {miny},{maxx} {miny},{maxx} {maxy},{minx} {maxy},{minx} {miny}))",
            minx = self.min_x,
            miny = self.min_y,
            maxx = self.max_x,
            maxy = self.max_y,
        )
    }
}

impl From<geo::Rect<f64>> for BoundingBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        let min = rect.min();
        let max = rect.max();
        Self::new(min.x, min.y, max.x, max.y)
    }
}

impl From<BoundingBox> for geo::Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        geo::Rect::new(
            geo::coord! { x: bbox.min_x, y: bbox.min_y },
            geo::coord! { x: bbox.max_x, y: bbox.max_y },
        )
    }
}
