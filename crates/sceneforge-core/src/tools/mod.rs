//! Tool system for the editor.

use crate::shapes::{ObjectKind, ObjectPatch, PolygonPreset, flatten_points};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Rectangle,
    Ellipse,
    Line,
    Text,
    Triangle,
    Diamond,
    Hexagon,
    Star,
}

impl ToolKind {
    /// Tool bound to a single-letter shortcut (case-insensitive).
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'v' => Some(ToolKind::Select),
            'r' => Some(ToolKind::Rectangle),
            'e' => Some(ToolKind::Ellipse),
            'l' => Some(ToolKind::Line),
            't' => Some(ToolKind::Text),
            'h' => Some(ToolKind::Hand),
            _ => None,
        }
    }

    /// Kind of object this tool creates, if any.
    pub fn object_kind(&self) -> Option<ObjectKind> {
        match self {
            ToolKind::Select | ToolKind::Hand => None,
            ToolKind::Rectangle => Some(ObjectKind::Rectangle),
            ToolKind::Ellipse => Some(ObjectKind::Ellipse),
            ToolKind::Line => Some(ObjectKind::Line),
            ToolKind::Text => Some(ObjectKind::Text),
            ToolKind::Triangle | ToolKind::Diamond | ToolKind::Hexagon | ToolKind::Star => {
                Some(ObjectKind::Polygon)
            }
        }
    }

    pub fn polygon_preset(&self) -> Option<PolygonPreset> {
        match self {
            ToolKind::Triangle => Some(PolygonPreset::Triangle),
            ToolKind::Diamond => Some(PolygonPreset::Diamond),
            ToolKind::Hexagon => Some(PolygonPreset::Hexagon),
            ToolKind::Star => Some(PolygonPreset::Star),
            _ => None,
        }
    }

    /// Whether the tool creates objects by dragging out a box.
    pub fn draws_by_drag(&self) -> bool {
        self.object_kind().is_some() && *self != ToolKind::Text
    }
}

/// A drag in progress with a shape tool (document space).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub tool: ToolKind,
    pub start: Point,
    pub current: Point,
}

impl DrawState {
    pub fn new(tool: ToolKind, start: Point) -> Self {
        Self {
            tool,
            start,
            current: start,
        }
    }

    /// Top-left and signed extents of the drawn object.
    ///
    /// Lines keep the drag direction as their endpoint vector; boxes are normalised.
    pub fn placement(&self) -> (Point, f64, f64) {
        if self.tool == ToolKind::Line {
            let d = self.current - self.start;
            return (self.start, d.x, d.y);
        }
        let rect = Rect::from_points(self.start, self.current);
        (rect.origin(), rect.width(), rect.height())
    }

    /// Whether either extent exceeds `min_size`.
    pub fn exceeds(&self, min_size: f64) -> bool {
        let (_, w, h) = self.placement();
        w.abs() > min_size || h.abs() > min_size
    }

    /// Overrides for the object this drag would create.
    pub fn overrides(&self) -> ObjectPatch {
        let (_, width, height) = self.placement();
        ObjectPatch {
            width: Some(width),
            height: Some(height),
            points: self
                .tool
                .polygon_preset()
                .map(|preset| flatten_points(&preset.points(width, height))),
            ..ObjectPatch::default()
        }
    }
}
