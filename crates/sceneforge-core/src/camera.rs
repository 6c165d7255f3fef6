//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Default lower zoom bound.
pub const MIN_ZOOM: f64 = 0.1;
/// Default upper zoom bound.
pub const MAX_ZOOM: f64 = 5.0;

/// Viewport manages the view transform for the canvas.
///
/// Screen space is document space scaled by `zoom` and then translated by `pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Translation applied after scaling (screen pixels).
    pub pan: Vec2,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// Convert a screen point to document coordinates.
pub fn to_document_space(screen_point: Point, viewport: &Viewport) -> Point {
    Point::new(
        (screen_point.x - viewport.pan.x) / viewport.zoom,
        (screen_point.y - viewport.pan.y) / viewport.zoom,
    )
}

/// Convert a document point to screen coordinates.
pub fn to_screen_space(doc_point: Point, viewport: &Viewport) -> Point {
    Point::new(
        doc_point.x * viewport.zoom + viewport.pan.x,
        doc_point.y * viewport.zoom + viewport.pan.y,
    )
}

/// Pan that keeps the document point under `anchor` fixed when zoom goes from
/// `old_zoom` to `new_zoom`.
pub fn zoom_about(old_zoom: f64, new_zoom: f64, anchor: Point, old_pan: Vec2) -> Vec2 {
    let ratio = new_zoom / old_zoom;
    anchor.to_vec2() - (anchor.to_vec2() - old_pan) * ratio
}

impl Viewport {
    /// Create a viewport with default zoom bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with explicit zoom bounds.
    pub fn with_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            pan: Vec2::ZERO,
        }
    }

    /// Get the affine transform for rendering (document to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling (screen to document).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_document(&self, screen_point: Point) -> Point {
        to_document_space(screen_point, self)
    }

    pub fn document_to_screen(&self, doc_point: Point) -> Point {
        to_screen_space(doc_point, self)
    }

    /// Clamp a zoom value to this viewport's bounds.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Set the zoom level (clamped), leaving pan untouched.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.clamp_zoom(zoom);
    }

    /// Pan the viewport by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = self.clamp_zoom(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        self.pan = zoom_about(self.zoom, new_zoom, screen_point, self.pan);
        self.zoom = new_zoom;
    }

    /// Reset to 100% with no pan.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = self.clamp_zoom(1.0);
    }

    /// Fit the viewport to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: kurbo::Rect, canvas: kurbo::Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = kurbo::Size::new(
            (canvas.width - padding * 2.0).max(1.0),
            (canvas.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.zoom = self.clamp_zoom(scale_x.min(scale_y));

        let bounds_center = bounds.center();
        self.pan = Vec2::new(
            canvas.width / 2.0 - bounds_center.x * self.zoom,
            canvas.height / 2.0 - bounds_center.y * self.zoom,
        );
    }
}
