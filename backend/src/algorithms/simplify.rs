//! Track decimation for map display.

use crate::models::Point;

/// Default upper bound on coordinates sent per track.
pub const DEFAULT_MAX_POINTS: usize = 50;

/// Sampling stride used by [`simplify`]:
/// `max(floor(len / max(max_points, 1)), 1)`.
pub fn decimation_step(len: usize, max_points: usize) -> usize {
    (len / max_points.max(1)).max(1)
}

/// Keep every `step`-th point starting at index 0.
///
/// The final point is only kept when `len - 1` is a multiple of the step, so
/// the output may stop short of the track's last position. Because the step
/// is floored, the output can hold somewhat more than `max_points` points
/// (101 points at `max_points = 50` yield 51).
pub fn simplify(points: &[Point], max_points: usize) -> Vec<Point> {
    let step = decimation_step(points.len(), max_points);
    points.iter().step_by(step).copied().collect()
}

/// [`simplify`] rendered as `[x, y]` pairs, longitude first.
pub fn simplify_to_pairs(points: &[Point], max_points: usize) -> Vec<[f64; 2]> {
    let step = decimation_step(points.len(), max_points);
    points.iter().step_by(step).map(|p| p.to_pair()).collect()
}
