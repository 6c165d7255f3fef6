//! Local/world transforms for scene objects.
//!
//! An object's local frame has its origin at the top-left of the unscaled
//! `width`×`height` box. Rotation and scale are applied about the box centre:
//!
//! `world = centre + R(rotation) · (scale_x·(lx − w/2), scale_y·(ly − h/2))`

use crate::shapes::{Geometry, SceneObject, ShapeData, line_endpoints};
use kurbo::{Affine, Point, Rect, Vec2};

/// Local → world transform of a geometry.
pub fn object_affine(geometry: &Geometry) -> Affine {
    let center = geometry.center();
    Affine::translate(center.to_vec2())
        * Affine::rotate(geometry.rotation.to_radians())
        * Affine::scale_non_uniform(geometry.scale_x, geometry.scale_y)
        * Affine::translate((-geometry.width / 2.0, -geometry.height / 2.0))
}

pub fn local_to_world(geometry: &Geometry, local: Point) -> Point {
    object_affine(geometry) * local
}

/// World → local. `None` when a scale factor is zero.
pub fn world_to_local(geometry: &Geometry, world: Point) -> Option<Point> {
    let affine = object_affine(geometry);
    if affine.determinant().abs() < f64::EPSILON {
        return None;
    }
    Some(affine.inverse() * world)
}

/// Express a world-space displacement in the object's local (unscaled) axes.
pub fn world_delta_to_local(geometry: &Geometry, delta: Vec2) -> Vec2 {
    let rotated = Affine::rotate(-geometry.rotation.to_radians()) * delta.to_point();
    Vec2::new(
        rotated.x / non_zero(geometry.scale_x),
        rotated.y / non_zero(geometry.scale_y),
    )
}

fn non_zero(scale: f64) -> f64 {
    if scale.abs() < f64::EPSILON { 1.0 } else { scale }
}

/// The four corners of the box in world space: top-left, top-right, bottom-right, bottom-left.
pub fn world_quad(geometry: &Geometry) -> [Point; 4] {
    let affine = object_affine(geometry);
    let (w, h) = (geometry.width, geometry.height);
    [
        affine * Point::new(0.0, 0.0),
        affine * Point::new(w, 0.0),
        affine * Point::new(w, h),
        affine * Point::new(0.0, h),
    ]
}

/// Smallest axis-aligned rect containing every point. Zero rect for an empty slice.
pub fn rect_from_points(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
}

/// World-space AABB of an object.
pub fn world_bounds(object: &SceneObject) -> Rect {
    match &object.data {
        ShapeData::Line { .. } => {
            let affine = object_affine(&object.geometry);
            let points: Vec<Point> = line_endpoints(object)
                .into_iter()
                .map(|p| affine * p)
                .collect();
            rect_from_points(&points)
        }
        _ => rect_from_points(&world_quad(&object.geometry)),
    }
}

/// Union of the world bounds of several objects.
pub fn union_bounds<'a>(objects: impl IntoIterator<Item = &'a SceneObject>) -> Option<Rect> {
    objects
        .into_iter()
        .map(world_bounds)
        .reduce(|acc, rect| acc.union(rect))
}

/// Whether `outer` fully contains `inner` (edges inclusive).
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Clockwise angle in degrees from "straight up" of the vector `from → to`, in `[0, 360)`.
pub fn angle_from_up(from: Point, to: Point) -> f64 {
    let d = to - from;
    normalize_degrees(d.y.atan2(d.x).to_degrees() + 90.0)
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
