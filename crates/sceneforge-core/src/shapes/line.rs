//! Line helpers.

use super::{SceneObject, ShapeData};
use kurbo::{Point, Vec2};

/// Distance from `point` to the segment `start`→`end`.
pub fn point_to_segment_dist(point: Point, start: Point, end: Point) -> f64 {
    let line_vec = end - start;
    let point_vec = point - start;

    let line_len_sq = line_vec.hypot2();
    if line_len_sq < f64::EPSILON {
        return point_vec.hypot();
    }

    // Project onto the segment, clamped to its ends
    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = start + line_vec * t;
    (point - projection).hypot()
}

/// Local-space polyline of a line object.
///
/// Without explicit points this is the segment (0,0)→(width,height).
pub fn line_endpoints(object: &SceneObject) -> Vec<Point> {
    match &object.data {
        ShapeData::Line { points } if points.len() >= 2 => points.clone(),
        _ => vec![
            Point::ZERO,
            Point::new(object.geometry.width, object.geometry.height),
        ],
    }
}

/// Push `end` away from `start` until the segment is at least `min_len` long.
///
/// `fallback` gives the direction when `end` coincides with `start`.
pub(crate) fn enforce_min_length(start: Point, end: Point, fallback: Vec2, min_len: f64) -> Point {
    let span = end - start;
    if span.hypot() >= min_len {
        return end;
    }
    let dir = if span.hypot2() > f64::EPSILON {
        span.normalize()
    } else if fallback.hypot2() > f64::EPSILON {
        fallback.normalize()
    } else {
        Vec2::new(1.0, 0.0)
    };
    start + dir * min_len
}
