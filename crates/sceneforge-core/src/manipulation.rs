//! Gesture-driven transforms: move, resize, rotate, line endpoints and flip.
//!
//! A [`Gesture`] captures the targets' geometry when it starts. Every pointer
//! update is computed from that snapshot rather than from the previous frame,
//! so updates are idempotent and cancel can restore exactly.

use crate::config::ResizeStrategy;
use crate::geometry::{
    angle_from_up, local_to_world, normalize_degrees, rect_from_points, union_bounds,
    world_delta_to_local,
};
use crate::selection::HandleKind;
use crate::shapes::{
    Geometry, ObjectId, ObjectPatch, SceneObject, ShapeData, enforce_min_length, line_endpoints,
};
use crate::snap::{ANGLE_SNAP_INCREMENT, snap_angle, snap_line_endpoint, snap_point};
use kurbo::{Affine, Point, Rect, Vec2};

const EPS: f64 = 1e-9;

/// What a gesture does to its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize(HandleKind),
    Rotate,
    /// Drag one end of a line (0 = start, 1 = end).
    Endpoint(usize),
}

/// Settings that shape how pointer deltas become geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOptions {
    pub min_size: f64,
    pub strategy: ResizeStrategy,
    pub snap_to_grid: bool,
    pub grid_size: f64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            min_size: 5.0,
            strategy: ResizeStrategy::Direct,
            snap_to_grid: false,
            grid_size: crate::snap::GRID_SIZE,
        }
    }
}

/// Mirror axis for flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// An active transform on one or more objects.
#[derive(Debug, Clone)]
pub struct Gesture {
    kind: GestureKind,
    /// Pointer position (document space) when the gesture started.
    start: Point,
    /// Targets as they were at the start. The first one is the object under the pointer.
    originals: Vec<SceneObject>,
    /// Union bounds of the targets at the start.
    start_bounds: Rect,
    /// Pointer minus the primary target's top-left.
    drag_offset: Vec2,
}

impl Gesture {
    /// Start a gesture. Returns `None` without targets.
    pub fn begin(kind: GestureKind, start: Point, originals: Vec<SceneObject>) -> Option<Self> {
        let primary = originals.first()?;
        let drag_offset = start - primary.geometry.position();
        let start_bounds = union_bounds(&originals)?;
        log::debug!(
            "Gesture {:?} started on {} object(s) at ({:.1}, {:.1})",
            kind,
            originals.len(),
            start.x,
            start.y
        );
        Some(Self {
            kind,
            start,
            originals,
            start_bounds,
            drag_offset,
        })
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn originals(&self) -> &[SceneObject] {
        &self.originals
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.originals.iter().map(|o| o.id()).collect()
    }

    /// Whether the gesture acts on the union box of several objects.
    pub fn is_group(&self) -> bool {
        self.originals.len() > 1
    }

    /// Geometry for every target with the pointer at `pointer`.
    ///
    /// `shift` keeps the aspect ratio on corner resizes and snaps angles.
    pub fn update(
        &self,
        pointer: Point,
        shift: bool,
        options: &TransformOptions,
    ) -> Vec<(ObjectId, ObjectPatch)> {
        log::trace!("Gesture {:?} at ({:.1}, {:.1})", self.kind, pointer.x, pointer.y);
        let delta = pointer - self.start;

        let updated: Vec<SceneObject> = match self.kind {
            GestureKind::Move => self.moved(pointer, options),
            GestureKind::Resize(handle) if self.is_group() => {
                self.group_resized(handle, delta, shift, options)
            }
            GestureKind::Resize(handle) => self
                .originals
                .iter()
                .map(|o| resize_object(o, handle, delta, shift, options))
                .collect(),
            GestureKind::Rotate if self.is_group() => self.group_rotated(pointer, shift),
            GestureKind::Rotate => self
                .originals
                .iter()
                .map(|o| rotate_object(o, pointer, shift))
                .collect(),
            GestureKind::Endpoint(index) => self
                .originals
                .iter()
                .map(|o| drag_endpoint(o, index, pointer, shift, options))
                .collect(),
        };

        updated
            .iter()
            .map(|o| (o.id(), ObjectPatch::transform_of(o)))
            .collect()
    }

    /// Bake-down patches for the targets as they are in `current`.
    pub fn finish(&self, current: &[SceneObject]) -> Vec<(ObjectId, ObjectPatch)> {
        self.current_targets(current)
            .filter_map(|object| {
                let mut baked = object.clone();
                bake_scale(&mut baked).then(|| (baked.id(), ObjectPatch::transform_of(&baked)))
            })
            .collect()
    }

    /// Patches restoring every target to its pre-gesture geometry.
    pub fn cancel(&self) -> Vec<(ObjectId, ObjectPatch)> {
        log::debug!("Gesture {:?} cancelled", self.kind);
        self.originals
            .iter()
            .map(|o| (o.id(), ObjectPatch::transform_of(o)))
            .collect()
    }

    /// Whether any target in `current` differs from its starting state.
    pub fn changed(&self, current: &[SceneObject]) -> bool {
        self.current_targets(current).any(|object| {
            self.originals
                .iter()
                .find(|o| o.id() == object.id())
                .is_some_and(|o| o.geometry != object.geometry || o.data != object.data)
        })
    }

    fn current_targets<'a>(
        &'a self,
        current: &'a [SceneObject],
    ) -> impl Iterator<Item = &'a SceneObject> + 'a {
        current
            .iter()
            .filter(|c| self.originals.iter().any(|o| o.id() == c.id()))
    }

    fn moved(&self, pointer: Point, options: &TransformOptions) -> Vec<SceneObject> {
        let Some(primary) = self.originals.first() else {
            return Vec::new();
        };
        let target = snap_point(
            pointer - self.drag_offset,
            options.snap_to_grid,
            options.grid_size,
        );
        let delta = target - primary.geometry.position();
        self.originals
            .iter()
            .map(|o| {
                let mut moved = o.clone();
                moved.geometry.x += delta.x;
                moved.geometry.y += delta.y;
                moved
            })
            .collect()
    }

    fn group_resized(
        &self,
        handle: HandleKind,
        delta: Vec2,
        keep_aspect: bool,
        options: &TransformOptions,
    ) -> Vec<SceneObject> {
        let Some((hx, hy)) = handle.resize_factors() else {
            return self.originals.clone();
        };
        let b0 = self.start_bounds;
        let frame = Geometry::new(b0.x0, b0.y0, b0.width(), b0.height());
        let (width, height, center) =
            resized_frame(&frame, hx, hy, delta, keep_aspect, options.min_size);
        let origin = Point::new(center.x - width / 2.0, center.y - height / 2.0);
        let kx = if b0.width() > EPS { width / b0.width() } else { 1.0 };
        let ky = if b0.height() > EPS { height / b0.height() } else { 1.0 };

        self.originals
            .iter()
            .map(|o| {
                let mut resized = o.clone();
                let c = o.geometry.center();
                let new_center = Point::new(
                    origin.x + (c.x - b0.x0) * kx,
                    origin.y + (c.y - b0.y0) * ky,
                );
                let (mut width, mut height) = (o.geometry.width * kx, o.geometry.height * ky);
                // Every member keeps the floor, not just the union box
                if o.kind().is_boxed() {
                    width = width.max(options.min_size);
                    height = height.max(options.min_size);
                }
                let g = &mut resized.geometry;
                let (ox, oy) = (ratio(width, g.width), ratio(height, g.height));
                g.width = width;
                g.height = height;
                g.x = new_center.x - width / 2.0;
                g.y = new_center.y - height / 2.0;
                resized.data.scale_outline(ox, oy);
                resized
            })
            .collect()
    }

    fn group_rotated(&self, pointer: Point, snap: bool) -> Vec<SceneObject> {
        let pivot = self.start_bounds.center();
        let mut turn = angle_from_up(pivot, pointer) - angle_from_up(pivot, self.start);
        if snap {
            turn = snap_angle(turn, ANGLE_SNAP_INCREMENT);
        }
        let about_pivot = Affine::rotate_about(turn.to_radians(), pivot);

        self.originals
            .iter()
            .map(|o| {
                let mut rotated = o.clone();
                let center = about_pivot * o.geometry.center();
                let g = &mut rotated.geometry;
                g.rotation = normalize_degrees(g.rotation + turn);
                g.x = center.x - g.width / 2.0;
                g.y = center.y - g.height / 2.0;
                rotated
            })
            .collect()
    }
}

/// New size and centre of `frame` when the handle `(hx, hy)` is dragged by the
/// world-space `delta`. The opposite edge or corner stays fixed in world space.
fn resized_frame(
    frame: &Geometry,
    hx: f64,
    hy: f64,
    delta: Vec2,
    keep_aspect: bool,
    min_size: f64,
) -> (f64, f64, Point) {
    let local = world_delta_to_local(frame, delta);
    let mut width = if hx != 0.0 {
        (frame.width + hx * local.x).max(min_size)
    } else {
        frame.width
    };
    let mut height = if hy != 0.0 {
        (frame.height + hy * local.y).max(min_size)
    } else {
        frame.height
    };

    if keep_aspect && hx != 0.0 && hy != 0.0 && frame.width > EPS && frame.height > EPS {
        let k = (width / frame.width).max(height / frame.height);
        width = frame.width * k;
        height = frame.height * k;
    }

    let anchor = local_to_world(
        frame,
        Point::new(frame.width * (1.0 - hx) / 2.0, frame.height * (1.0 - hy) / 2.0),
    );
    // Anchor relative to the new centre, in scaled local axes
    let offset = Affine::rotate(frame.rotation.to_radians())
        * Point::new(
            frame.scale_x * (-hx * width / 2.0),
            frame.scale_y * (-hy * height / 2.0),
        );
    (width, height, anchor - offset.to_vec2())
}

/// `new / old`, or 1 when `old` is degenerate.
fn ratio(new: f64, old: f64) -> f64 {
    if old.abs() > EPS { new / old } else { 1.0 }
}

/// Resize one object by dragging `handle` by `delta` (document space).
pub fn resize_object(
    original: &SceneObject,
    handle: HandleKind,
    delta: Vec2,
    keep_aspect: bool,
    options: &TransformOptions,
) -> SceneObject {
    let Some((hx, hy)) = handle.resize_factors() else {
        return original.clone();
    };
    let g = original.geometry;
    let (width, height, center) = resized_frame(&g, hx, hy, delta, keep_aspect, options.min_size);

    let mut resized = original.clone();
    let out = &mut resized.geometry;
    let scalable = g.width.abs() > EPS && g.height.abs() > EPS;
    match options.strategy {
        ResizeStrategy::Scale if scalable => {
            out.scale_x = g.scale_x * width / g.width;
            out.scale_y = g.scale_y * height / g.height;
            out.x = center.x - g.width / 2.0;
            out.y = center.y - g.height / 2.0;
        }
        _ => {
            out.width = width;
            out.height = height;
            out.x = center.x - width / 2.0;
            out.y = center.y - height / 2.0;
            if scalable {
                resized.data.scale_outline(width / g.width, height / g.height);
            }
        }
    }
    resized
}

/// Absolute rotation towards the pointer (0° = rotate handle straight up).
pub fn rotate_object(original: &SceneObject, pointer: Point, snap: bool) -> SceneObject {
    let g = original.geometry;
    let mut angle = angle_from_up(g.center(), pointer);
    // The handle sits below the centre on vertically flipped objects
    if g.scale_y < 0.0 {
        angle = normalize_degrees(angle + 180.0);
    }
    if snap {
        angle = snap_angle(angle, ANGLE_SNAP_INCREMENT);
    }
    let mut rotated = original.clone();
    rotated.geometry.rotation = angle;
    rotated
}

/// Move one end of a line to `pointer`, keeping the other end fixed in world space.
///
/// The result has no rotation or scale; the endpoints carry the direction.
pub fn drag_endpoint(
    original: &SceneObject,
    index: usize,
    pointer: Point,
    snap_direction: bool,
    options: &TransformOptions,
) -> SceneObject {
    let g = original.geometry;
    let mut world: Vec<Point> = line_endpoints(original)
        .into_iter()
        .map(|p| local_to_world(&g, p))
        .collect();
    if world.len() < 2 {
        return original.clone();
    }
    let last = world.len() - 1;
    let (moving, fixed) = if index == 0 { (0, last) } else { (last, 0) };

    let mut target = snap_point(pointer, options.snap_to_grid, options.grid_size);
    if snap_direction {
        target = snap_line_endpoint(world[fixed], target);
    }
    let fallback = world[moving] - world[fixed];
    world[moving] = enforce_min_length(world[fixed], target, fallback, options.min_size);

    let mut updated = original.clone();
    match &mut updated.data {
        ShapeData::Line { points } if !points.is_empty() => {
            let bounds = rect_from_points(&world);
            let origin = bounds.origin().to_vec2();
            *points = world.iter().map(|p| *p - origin).collect();
            updated.geometry = Geometry::new(bounds.x0, bounds.y0, bounds.width(), bounds.height());
        }
        _ => {
            let span = world[last] - world[0];
            updated.geometry = Geometry::new(world[0].x, world[0].y, span.x, span.y);
        }
    }
    updated
}

/// Fold scale factors into width/height, keeping the centre and flip signs.
///
/// Returns false when there was nothing to bake. Running it twice is a no-op.
pub fn bake_scale(object: &mut SceneObject) -> bool {
    let g = &mut object.geometry;
    let ax = g.scale_x.abs();
    let ay = g.scale_y.abs();
    let kx = if ax > EPS && (ax - 1.0).abs() > EPS { ax } else { 1.0 };
    let ky = if ay > EPS && (ay - 1.0).abs() > EPS { ay } else { 1.0 };
    if kx == 1.0 && ky == 1.0 {
        return false;
    }

    let center = g.center();
    g.width *= kx;
    g.height *= ky;
    g.scale_x /= kx;
    g.scale_y /= ky;
    g.x = center.x - g.width / 2.0;
    g.y = center.y - g.height / 2.0;
    object.data.scale_outline(kx, ky);
    true
}

/// Mirror objects about the centre of their union bounds.
pub fn flip_objects(objects: &[&SceneObject], axis: FlipAxis) -> Vec<SceneObject> {
    let Some(bounds) = union_bounds(objects.iter().copied()) else {
        return Vec::new();
    };
    let pivot = bounds.center();

    objects
        .iter()
        .map(|object| {
            let mut flipped = (*object).clone();
            let center = object.geometry.center();
            let g = &mut flipped.geometry;
            match axis {
                FlipAxis::Horizontal => {
                    g.scale_x = -g.scale_x;
                    g.x = 2.0 * pivot.x - center.x - g.width / 2.0;
                }
                FlipAxis::Vertical => {
                    g.scale_y = -g.scale_y;
                    g.y = 2.0 * pivot.y - center.y - g.height / 2.0;
                }
            }
            // A mirror reverses the turning direction
            g.rotation = normalize_degrees(-g.rotation);
            flipped
        })
        .collect()
}
