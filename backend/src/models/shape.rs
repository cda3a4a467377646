//! User-drawn query shapes and their string encoding.
//!
//! The web layer sends shapes as `"<kind>:<x1>,<y1>_<x2>,<y2>_..."`:
//!
//! - `polygon:x1,y1_x2,y2_x3,y3[_...]`
//! - `rectangle:x1,y1_x2,y2` (any two opposite corners; more corners are
//!   accepted and reduced to their bounding rectangle)
//! - `circle:x,y_r` (center, then radius in degrees)

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use super::geometry::{BoundingBox, Point, Polygon, Ring};

/// Number of vertices used to approximate a circle.
pub const DEFAULT_CIRCLE_STEPS: usize = 25;

/// Geometry-level failures. None of these abort a search; the offending
/// shape simply contributes no matches.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid shape encoding '{input}': {reason}")]
    InvalidShapeEncoding { input: String, reason: String },

    #[error("degenerate geometry: {distinct_vertices} distinct vertices, at least 3 required")]
    DegenerateGeometry { distinct_vertices: usize },
}

impl GeometryError {
    fn encoding(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidShapeEncoding {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// A search region as drawn by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryShape {
    Polygon(Ring),
    Rectangle { southwest: Point, northeast: Point },
    Circle { center: Point, radius: f64 },
}

impl QueryShape {
    /// Rectangle from any two opposite corners.
    pub fn rectangle(a: Point, b: Point) -> Self {
        let bbox = BoundingBox::new(a.x, a.y, b.x, b.y);
        Self::Rectangle {
            southwest: bbox.southwest(),
            northeast: bbox.northeast(),
        }
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Self::Circle { center, radius }
    }

    pub fn polygon(points: Vec<Point>) -> Self {
        Self::Polygon(Ring::new(points))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Polygon(_) => "polygon",
            Self::Rectangle { .. } => "rectangle",
            Self::Circle { .. } => "circle",
        }
    }

    /// Convert to the polygon used for exact containment.
    ///
    /// Circles are a planar approximation: `steps` vertices at
    /// `(center.x + r*sin(t), center.y + r*cos(t))` for `t` stepped evenly
    /// over `[0, 2*pi)`, with `r` in degrees. This is not a geodesic circle.
    ///
    /// Shapes built directly (not parsed) are checked here too: every
    /// coordinate must be finite and a circle radius must be positive.
    pub fn normalize(&self, circle_steps: usize) -> Result<Polygon, GeometryError> {
        self.check_values()?;

        let ring = match self {
            Self::Polygon(ring) => ring.clone(),
            Self::Rectangle {
                southwest,
                northeast,
            } => {
                let bbox = BoundingBox::new(southwest.x, southwest.y, northeast.x, northeast.y);
                Ring::new(vec![
                    Point::new(bbox.min_x, bbox.min_y),
                    Point::new(bbox.min_x, bbox.max_y),
                    Point::new(bbox.max_x, bbox.max_y),
                    Point::new(bbox.max_x, bbox.min_y),
                ])
            }
            Self::Circle { center, radius } => {
                let steps = circle_steps.max(3);
                let points = (0..steps)
                    .map(|i| {
                        let theta = 2.0 * PI * i as f64 / steps as f64;
                        Point::new(
                            center.x + radius * theta.sin(),
                            center.y + radius * theta.cos(),
                        )
                    })
                    .collect();
                Ring::new(points)
            }
        };

        if !ring.points().iter().all(Point::is_finite) {
            return Err(GeometryError::encoding(
                &self.to_string(),
                "vertex coordinates overflow",
            ));
        }

        let distinct_vertices = ring.distinct_vertices();
        if distinct_vertices < 3 {
            return Err(GeometryError::DegenerateGeometry { distinct_vertices });
        }
        Ok(Polygon::new(ring))
    }

    fn check_values(&self) -> Result<(), GeometryError> {
        let fail = |reason: &str| -> Result<(), GeometryError> {
            Err(GeometryError::encoding(&self.to_string(), reason))
        };
        match self {
            Self::Polygon(ring) if !ring.points().iter().all(Point::is_finite) => {
                fail("non-finite coordinate")
            }
            Self::Rectangle {
                southwest,
                northeast,
            } if !(southwest.is_finite() && northeast.is_finite()) => {
                fail("non-finite coordinate")
            }
            Self::Circle { center, .. } if !center.is_finite() => {
                fail("non-finite coordinate")
            }
            // Also rejects NaN.
            Self::Circle { radius, .. } if !(radius.is_finite() && *radius > 0.0) => {
                fail("circle radius must be positive")
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for QueryShape {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, body) = s
            .split_once(':')
            .ok_or_else(|| GeometryError::encoding(s, "missing '<kind>:' prefix"))?;

        let segments: Vec<Vec<f64>> = body
            .split('_')
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| parse_numbers(s, segment))
            .collect::<Result<_, _>>()?;

        match kind.trim().to_ascii_lowercase().as_str() {
            "polygon" => {
                let points = segments
                    .iter()
                    .map(|seg| as_point(s, seg))
                    .collect::<Result<Vec<_>, _>>()?;
                if points.is_empty() {
                    return Err(GeometryError::encoding(s, "polygon has no vertices"));
                }
                Ok(Self::polygon(points))
            }
            "rectangle" => {
                let corners = segments
                    .iter()
                    .map(|seg| as_point(s, seg))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 2 {
                    return Err(GeometryError::encoding(s, "rectangle needs two corners"));
                }
                // Any number of corners reduces to their bounding rectangle.
                let bbox = BoundingBox::from_points(&corners)
                    .ok_or_else(|| GeometryError::encoding(s, "rectangle needs two corners"))?;
                Ok(Self::rectangle(bbox.southwest(), bbox.northeast()))
            }
            "circle" => {
                let [center, radius] = segments.as_slice() else {
                    return Err(GeometryError::encoding(s, "circle needs a center and a radius"));
                };
                let center = as_point(s, center)?;
                let radius = match radius.as_slice() {
                    [r] => *r,
                    _ => return Err(GeometryError::encoding(s, "circle radius must be a single number")),
                };
                if radius <= 0.0 {
                    return Err(GeometryError::encoding(s, "circle radius must be positive"));
                }
                Ok(Self::circle(center, radius))
            }
            other => Err(GeometryError::encoding(
                s,
                format!("unknown shape kind '{}'", other),
            )),
        }
    }
}

impl fmt::Display for QueryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polygon(ring) => {
                let coords: Vec<String> = ring
                    .points()
                    .iter()
                    .map(|p| format!("{},{}", p.x, p.y))
                    .collect();
                write!(f, "polygon:{}", coords.join("_"))
            }
            Self::Rectangle {
                southwest,
                northeast,
            } => write!(
                f,
                "rectangle:{},{}_{},{}",
                southwest.x, southwest.y, northeast.x, northeast.y
            ),
            Self::Circle { center, radius } => {
                write!(f, "circle:{},{}_{}", center.x, center.y, radius)
            }
        }
    }
}

fn parse_numbers(input: &str, segment: &str) -> Result<Vec<f64>, GeometryError> {
    segment
        .split(',')
        .map(|raw| {
            let value: f64 = raw.trim().parse().map_err(|_| {
                GeometryError::encoding(input, format!("'{}' is not a number", raw.trim()))
            })?;
            if !value.is_finite() {
                return Err(GeometryError::encoding(
                    input,
                    format!("'{}' is not finite", raw.trim()),
                ));
            }
            Ok(value)
        })
        .collect()
}

fn as_point(input: &str, segment: &[f64]) -> Result<Point, GeometryError> {
    match segment {
        [x, y] => Ok(Point::new(*x, *y)),
        _ => Err(GeometryError::encoding(
            input,
            format!("expected an x,y pair, got {} values", segment.len()),
        )),
    }
}

#[cfg(test)]
#[path = "shape_tests.rs"]
mod shape_tests;
