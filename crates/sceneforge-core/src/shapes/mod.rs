//! Scene object definitions for the editor.

mod line;
mod patch;
mod polygon;
mod text;

pub(crate) use line::enforce_min_length;
pub use line::{line_endpoints, point_to_segment_dist};
pub use patch::ObjectPatch;
pub use polygon::{PolygonPreset, flatten_points, unflatten_points};
pub use text::{FontStyle, FontWeight, TextAlign, TextContent, TextDecoration, TextTransform};

use crate::error::{EngineError, EngineResult};
use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidColor(color.to_string());
        let hex = color.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            3 => Ok(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
                255,
            )),
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The kind of a scene object. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectKind {
    Rectangle,
    Ellipse,
    Line,
    Text,
    Image,
    Polygon,
    Path,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 7] = [
        ObjectKind::Rectangle,
        ObjectKind::Ellipse,
        ObjectKind::Line,
        ObjectKind::Text,
        ObjectKind::Image,
        ObjectKind::Polygon,
        ObjectKind::Path,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Rectangle => "rectangle",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Line => "line",
            ObjectKind::Text => "text",
            ObjectKind::Image => "image",
            ObjectKind::Polygon => "polygon",
            ObjectKind::Path => "path",
        }
    }

    /// Capitalized label used for default object names.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Rectangle => "Rectangle",
            ObjectKind::Ellipse => "Ellipse",
            ObjectKind::Line => "Line",
            ObjectKind::Text => "Text",
            ObjectKind::Image => "Image",
            ObjectKind::Polygon => "Polygon",
            ObjectKind::Path => "Path",
        }
    }

    /// Resolve a kind name. Unrecognized names degrade to a rectangle.
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match Self::ALL.iter().find(|k| k.as_str() == lower) {
            Some(kind) => *kind,
            None => {
                log::warn!("Unknown object kind {:?}, creating a rectangle instead", name);
                ObjectKind::Rectangle
            }
        }
    }

    /// Whether the kind is laid out as a width×height box (everything except lines).
    pub fn is_boxed(&self) -> bool {
        !matches!(self, ObjectKind::Line)
    }
}

impl From<String> for ObjectKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<&str> for ObjectKind {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<ObjectKind> for String {
    fn from(kind: ObjectKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of an object in document space.
///
/// `x`/`y` is the top-left of the unscaled box. Rotation (degrees) and the
/// scale multipliers are applied about the box centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Centre of the box (invariant under rotation and flip).
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Unrotated, unscaled box. Normalised so negative line extents still work.
    pub fn unrotated_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }
}

/// Drop shadow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: SerializableColor,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Paint properties shared by every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    pub opacity: f64,
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    /// Stroke color (None = no stroke).
    pub stroke: Option<SerializableColor>,
    pub stroke_width: f64,
    #[serde(default)]
    pub shadow: Option<Shadow>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            fill: None,
            stroke: Some(SerializableColor::black()),
            stroke_width: 2.0,
            shadow: None,
        }
    }
}

/// Kind-specific payload. Each variant only carries the fields its kind uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeData {
    Rectangle {
        /// Corner radius (0 = sharp corners).
        border_radius: f64,
    },
    Ellipse,
    Line {
        /// Explicit polyline in local coordinates. Empty = the segment (0,0)→(width,height).
        #[serde(default)]
        points: Vec<Point>,
    },
    Text(TextContent),
    Image {
        src: String,
    },
    Polygon {
        /// Vertices in local coordinates.
        points: Vec<Point>,
    },
    Path {
        /// SVG path data, opaque to the engine.
        data: String,
    },
}

impl ShapeData {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ShapeData::Rectangle { .. } => ObjectKind::Rectangle,
            ShapeData::Ellipse => ObjectKind::Ellipse,
            ShapeData::Line { .. } => ObjectKind::Line,
            ShapeData::Text(_) => ObjectKind::Text,
            ShapeData::Image { .. } => ObjectKind::Image,
            ShapeData::Polygon { .. } => ObjectKind::Polygon,
            ShapeData::Path { .. } => ObjectKind::Path,
        }
    }

    /// Empty payload for a kind.
    pub fn empty(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Rectangle => ShapeData::Rectangle { border_radius: 0.0 },
            ObjectKind::Ellipse => ShapeData::Ellipse,
            ObjectKind::Line => ShapeData::Line { points: Vec::new() },
            ObjectKind::Text => ShapeData::Text(TextContent::default()),
            ObjectKind::Image => ShapeData::Image { src: String::new() },
            ObjectKind::Polygon => ShapeData::Polygon { points: Vec::new() },
            ObjectKind::Path => ShapeData::Path { data: String::new() },
        }
    }

    /// Stretch explicit outlines along with their box.
    pub fn scale_outline(&mut self, kx: f64, ky: f64) {
        match self {
            ShapeData::Polygon { points } | ShapeData::Line { points } => {
                for p in points.iter_mut() {
                    p.x *= kx;
                    p.y *= ky;
                }
            }
            _ => {}
        }
    }
}

/// Style values the editor applies to freshly created objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreationDefaults {
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
}

impl Default for CreationDefaults {
    fn default() -> Self {
        Self {
            fill: SerializableColor::new(0xff, 0x6b, 0x35, 255),
            stroke: SerializableColor::white(),
            stroke_width: 2.0,
        }
    }
}

/// The atomic editable unit of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub(crate) id: ObjectId,
    /// Human-readable label, independent of the id.
    pub name: String,
    pub geometry: Geometry,
    pub appearance: Appearance,
    pub visible: bool,
    pub locked: bool,
    pub data: ShapeData,
}

impl SceneObject {
    /// Default width/height for new boxed objects.
    pub const DEFAULT_SIZE: f64 = 100.0;

    /// Build an object with kind defaults, then merge `overrides` on top.
    ///
    /// `ordinal` is the 1-based number used in the default name.
    pub fn create(
        kind: ObjectKind,
        position: Point,
        ordinal: usize,
        defaults: &CreationDefaults,
        overrides: &ObjectPatch,
    ) -> Self {
        let (width, height) = match kind {
            ObjectKind::Line => (Self::DEFAULT_SIZE, 0.0),
            _ => (Self::DEFAULT_SIZE, Self::DEFAULT_SIZE),
        };
        let appearance = Appearance {
            opacity: 1.0,
            fill: match kind {
                ObjectKind::Line => None,
                _ => Some(defaults.fill),
            },
            stroke: Some(defaults.stroke),
            stroke_width: match kind {
                ObjectKind::Text => 0.0,
                _ => defaults.stroke_width,
            },
            shadow: None,
        };

        let mut object = Self {
            id: Uuid::new_v4(),
            name: format!("{} {}", kind.label(), ordinal),
            geometry: Geometry::new(position.x, position.y, width, height),
            appearance,
            visible: true,
            locked: false,
            data: ShapeData::empty(kind),
        };
        overrides.apply(&mut object);

        if let ShapeData::Polygon { points } = &mut object.data {
            if points.len() < 3 {
                log::warn!(
                    "Polygon {} created without points, using a triangle outline",
                    object.name
                );
                let (width, height) = (object.geometry.width, object.geometry.height);
                *points = PolygonPreset::Triangle.points(width, height);
            }
        }

        object
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.data.kind()
    }

    /// Copy this object under a fresh id.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy
    }

    /// World-space axis-aligned bounding box (honours rotation and flip).
    pub fn bounds(&self) -> Rect {
        crate::geometry::world_bounds(self)
    }

    /// Whether the object is drawn with a visible fill.
    pub fn is_filled(&self) -> bool {
        self.appearance.fill.is_some_and(|c| c.a > 0)
    }
}
