//! Grid and angle snapping.

use kurbo::Point;

/// Default grid spacing (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if !(grid_size > 0.0) {
        return SnapResult::none(point);
    }
    let snapped = Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    );
    SnapResult {
        point: snapped,
        snapped_x: (snapped.x - point.x).abs() > f64::EPSILON,
        snapped_y: (snapped.y - point.y).abs() > f64::EPSILON,
    }
}

/// Snap a point when `enabled`, otherwise pass it through.
pub fn snap_point(point: Point, enabled: bool, grid_size: f64) -> Point {
    if enabled {
        snap_to_grid(point, grid_size).point
    } else {
        point
    }
}

/// Snap an angle to the nearest increment. Returns degrees in `[0, 360)`.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    let snapped = (angle_degrees / increment).round() * increment;
    crate::geometry::normalize_degrees(snapped)
}

/// Rotate `end` about `start` onto the nearest 15° direction, keeping the distance.
pub fn snap_line_endpoint(start: Point, end: Point) -> Point {
    let delta = end - start;
    let distance = delta.hypot();
    if distance < 0.001 {
        return end;
    }
    let angle = snap_angle(delta.y.atan2(delta.x).to_degrees(), ANGLE_SNAP_INCREMENT).to_radians();
    Point::new(
        start.x + distance * angle.cos(),
        start.y + distance * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let result = snap_to_grid(Point::new(23.0, 47.0), 20.0);
        assert_eq!(result.point, Point::new(20.0, 40.0));
        assert!(result.is_snapped());
    }

    #[test]
    fn test_snap_to_grid_exact() {
        let result = snap_to_grid(Point::new(40.0, 60.0), 20.0);
        assert_eq!(result.point, Point::new(40.0, 60.0));
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_snap_to_grid_round_up() {
        let result = snap_to_grid(Point::new(31.0, 51.0), 20.0);
        assert_eq!(result.point, Point::new(40.0, 60.0));
    }

    #[test]
    fn test_snap_point_disabled() {
        let p = Point::new(31.0, 51.0);
        assert_eq!(snap_point(p, false, 20.0), p);
    }

    #[test]
    fn test_snap_angle() {
        assert!((snap_angle(7.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(8.0, 15.0) - 15.0).abs() < 0.01);
        assert!((snap_angle(23.0, 15.0) - 30.0).abs() < 0.01);
        assert!((snap_angle(-7.0, 15.0) - 0.0).abs() < 0.01);
        assert!((snap_angle(-20.0, 15.0) - 345.0).abs() < 0.01);
        assert!((snap_angle(358.0, 15.0) - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_snap_line_endpoint_keeps_length() {
        let end = snap_line_endpoint(Point::ZERO, Point::new(100.0, 10.0));
        let length = (100.0_f64 * 100.0 + 10.0 * 10.0).sqrt();
        assert!((end.y).abs() < 1e-9);
        assert!((end.x - length).abs() < 1e-9);
    }
}
