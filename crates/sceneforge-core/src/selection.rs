//! Hit-testing, marquee selection and transform handles.

use crate::config::HitTestMode;
use crate::geometry::{local_to_world, rect_contains_rect, world_bounds, world_to_local};
use crate::shapes::{ObjectId, SceneObject, ShapeData, line_endpoints, point_to_segment_dist};
use kurbo::{Affine, BezPath, Point, Rect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Endpoint handle for lines (0 = start, 1 = end).
    Endpoint(usize),
    /// Corner handle (resizes both axes).
    Corner(Corner),
    /// Edge midpoint handle (resizes one axis).
    Edge(Edge),
    /// Rotation handle, outside the top edge.
    Rotate,
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl HandleKind {
    pub const RESIZE: [HandleKind; 8] = [
        HandleKind::Corner(Corner::TopLeft),
        HandleKind::Edge(Edge::Top),
        HandleKind::Corner(Corner::TopRight),
        HandleKind::Edge(Edge::Right),
        HandleKind::Corner(Corner::BottomRight),
        HandleKind::Edge(Edge::Bottom),
        HandleKind::Corner(Corner::BottomLeft),
        HandleKind::Edge(Edge::Left),
    ];

    /// Which sides a resize handle drags: -1 = left/top, 1 = right/bottom, 0 = untouched.
    pub fn resize_factors(&self) -> Option<(f64, f64)> {
        match self {
            HandleKind::Corner(Corner::TopLeft) => Some((-1.0, -1.0)),
            HandleKind::Corner(Corner::TopRight) => Some((1.0, -1.0)),
            HandleKind::Corner(Corner::BottomLeft) => Some((-1.0, 1.0)),
            HandleKind::Corner(Corner::BottomRight) => Some((1.0, 1.0)),
            HandleKind::Edge(Edge::Top) => Some((0.0, -1.0)),
            HandleKind::Edge(Edge::Right) => Some((1.0, 0.0)),
            HandleKind::Edge(Edge::Bottom) => Some((0.0, 1.0)),
            HandleKind::Edge(Edge::Left) => Some((-1.0, 0.0)),
            HandleKind::Endpoint(_) | HandleKind::Rotate => None,
        }
    }

    /// Position of the handle in a `width`×`height` local box.
    fn local_position(&self, width: f64, height: f64) -> Option<Point> {
        let (hx, hy) = self.resize_factors()?;
        Some(Point::new(
            width * (hx + 1.0) / 2.0,
            height * (hy + 1.0) / 2.0,
        ))
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    /// Position in document coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in document coordinates) hits this handle.
    /// `tolerance` should already be divided by the zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Handles for a single selected object.
pub fn object_handles(object: &SceneObject, rotate_offset: f64) -> Vec<Handle> {
    let geometry = &object.geometry;

    if let ShapeData::Line { .. } = object.data {
        let points = line_endpoints(object);
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Vec::new();
        };
        return vec![
            Handle::new(local_to_world(geometry, *first), HandleKind::Endpoint(0)),
            Handle::new(local_to_world(geometry, *last), HandleKind::Endpoint(1)),
        ];
    }

    let mut handles: Vec<Handle> = HandleKind::RESIZE
        .iter()
        .filter_map(|kind| {
            let local = kind.local_position(geometry.width, geometry.height)?;
            Some(Handle::new(local_to_world(geometry, local), *kind))
        })
        .collect();

    // Outward from the (possibly flipped) top edge
    let top_center = local_to_world(geometry, Point::new(geometry.width / 2.0, 0.0));
    let flip = if geometry.scale_y < 0.0 { -1.0 } else { 1.0 };
    let outward = Affine::rotate(geometry.rotation.to_radians()) * Point::new(0.0, -flip);
    handles.push(Handle::new(
        top_center + outward.to_vec2() * rotate_offset,
        HandleKind::Rotate,
    ));
    handles
}

/// Handles on an axis-aligned box, used for multi-selections.
pub fn bounds_handles(bounds: Rect, rotate_offset: f64) -> Vec<Handle> {
    let mut handles: Vec<Handle> = HandleKind::RESIZE
        .iter()
        .filter_map(|kind| {
            let local = kind.local_position(bounds.width(), bounds.height())?;
            Some(Handle::new(local + bounds.origin().to_vec2(), *kind))
        })
        .collect();
    handles.push(Handle::new(
        Point::new(bounds.center().x, bounds.y0 - rotate_offset),
        HandleKind::Rotate,
    ));
    handles
}

/// Handles for the current selection: per-object for one, union box for many.
pub fn selection_handles(selected: &[&SceneObject], rotate_offset: f64) -> Vec<Handle> {
    match selected {
        [] => Vec::new(),
        [single] => object_handles(single, rotate_offset),
        many => {
            let bounds = many
                .iter()
                .map(|o| world_bounds(o))
                .reduce(|acc, r| acc.union(r));
            bounds
                .map(|b| bounds_handles(b, rotate_offset))
                .unwrap_or_default()
        }
    }
}

/// Find which handle (if any) is hit at the given point.
pub fn hit_test_handles(handles: &[Handle], point: Point, tolerance: f64) -> Option<HandleKind> {
    handles
        .iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether `point` (document space) lies on `object`.
///
/// Lines always use distance to their segments, with `tolerance` plus half the stroke.
pub fn hit_test_object(
    object: &SceneObject,
    point: Point,
    mode: HitTestMode,
    tolerance: f64,
) -> bool {
    let geometry = &object.geometry;

    if let ShapeData::Line { .. } = object.data {
        let reach = tolerance + object.appearance.stroke_width / 2.0;
        let world: Vec<Point> = line_endpoints(object)
            .into_iter()
            .map(|p| local_to_world(geometry, p))
            .collect();
        return world
            .windows(2)
            .any(|seg| point_to_segment_dist(point, seg[0], seg[1]) <= reach);
    }

    match mode {
        HitTestMode::Aabb => contains_inclusive(geometry.unrotated_rect(), point),
        HitTestMode::Oriented => {
            let Some(local) = world_to_local(geometry, point) else {
                return false;
            };
            let local_box = Rect::new(0.0, 0.0, geometry.width, geometry.height).abs();
            if !contains_inclusive(local_box, local) {
                return false;
            }
            match &object.data {
                ShapeData::Ellipse => {
                    let radii = Vec2::new(geometry.width / 2.0, geometry.height / 2.0);
                    if radii.x.abs() < f64::EPSILON || radii.y.abs() < f64::EPSILON {
                        return false;
                    }
                    let dx = (local.x - radii.x) / radii.x;
                    let dy = (local.y - radii.y) / radii.y;
                    dx * dx + dy * dy <= 1.0
                }
                ShapeData::Polygon { points } if points.len() >= 3 => {
                    let mut path = BezPath::new();
                    path.move_to(points[0]);
                    for p in &points[1..] {
                        path.line_to(*p);
                    }
                    path.close_path();
                    path.contains(local)
                }
                _ => true,
            }
        }
    }
}

/// Topmost visible object under `point`.
///
/// Locked objects are skipped unless they are already part of `selected`.
pub fn hit_test_point(
    objects: &[SceneObject],
    selected: &[ObjectId],
    point: Point,
    mode: HitTestMode,
    tolerance: f64,
) -> Option<ObjectId> {
    objects
        .iter()
        .rev()
        .filter(|o| o.visible)
        .filter(|o| !o.locked || selected.contains(&o.id))
        .find(|o| hit_test_object(o, point, mode, tolerance))
        .map(|o| o.id)
}

/// Visible, unlocked objects whose bounds lie fully inside `rect`, in z-order.
pub fn objects_in_rect(objects: &[SceneObject], rect: Rect) -> Vec<ObjectId> {
    let rect = rect.abs();
    objects
        .iter()
        .filter(|o| o.visible && !o.locked)
        .filter(|o| rect_contains_rect(rect, world_bounds(o)))
        .map(|o| o.id)
        .collect()
}
