//! Partial updates of scene objects.

use super::{
    FontStyle, FontWeight, Geometry, ObjectKind, SceneObject, SerializableColor, ShapeData,
    Shadow, TextAlign, TextDecoration, TextTransform, flatten_points, unflatten_points,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A shallow, partial record of object fields.
///
/// Used both for updates and for the overrides applied when an object is
/// created. `id` and kind are not patchable. Fields that do not belong to the
/// target's kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub fill: Option<Option<SerializableColor>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Option<SerializableColor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Option<Shadow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,

    // Rectangle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,

    // Text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<TextTransform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,

    // Image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    // Line / polygon, flat `[x0, y0, x1, y1, ...]` in local coordinates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,

    // Path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_data: Option<String>,
}

fn finite(field: &str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            log::debug!("Ignoring non-finite {} = {}", field, v);
            None
        }
        None => None,
    }
}

fn ignored(field: &str, object: &SceneObject) {
    log::debug!(
        "Ignoring {} for {} object {}",
        field,
        object.kind(),
        object.id
    );
}

impl ObjectPatch {
    /// Patch carrying the transform-relevant state of `object`: its geometry and,
    /// for kinds with explicit outlines, its points.
    pub fn transform_of(object: &SceneObject) -> Self {
        let points = match &object.data {
            ShapeData::Polygon { points } => Some(flatten_points(points)),
            ShapeData::Line { points } if !points.is_empty() => Some(flatten_points(points)),
            _ => None,
        };
        Self {
            points,
            ..Self::geometry(&object.geometry)
        }
    }

    /// Patch setting every geometry field.
    pub fn geometry(geometry: &Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            width: Some(geometry.width),
            height: Some(geometry.height),
            rotation: Some(geometry.rotation),
            scale_x: Some(geometry.scale_x),
            scale_y: Some(geometry.scale_y),
            ..Self::default()
        }
    }

    /// Patch moving the top-left corner.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the set fields into `object`.
    pub fn apply(&self, object: &mut SceneObject) {
        if let Some(name) = &self.name {
            object.name = name.clone();
        }

        let geometry = &mut object.geometry;
        if let Some(x) = finite("x", self.x) {
            geometry.x = x;
        }
        if let Some(y) = finite("y", self.y) {
            geometry.y = y;
        }
        if let Some(width) = finite("width", self.width) {
            geometry.width = width;
        }
        if let Some(height) = finite("height", self.height) {
            geometry.height = height;
        }
        if let Some(rotation) = finite("rotation", self.rotation) {
            geometry.rotation = rotation;
        }
        if let Some(sx) = finite("scale_x", self.scale_x) {
            geometry.scale_x = sx;
        }
        if let Some(sy) = finite("scale_y", self.scale_y) {
            geometry.scale_y = sy;
        }

        let appearance = &mut object.appearance;
        if let Some(opacity) = finite("opacity", self.opacity) {
            appearance.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(fill) = self.fill {
            appearance.fill = fill;
        }
        if let Some(stroke) = self.stroke {
            appearance.stroke = stroke;
        }
        if let Some(width) = finite("stroke_width", self.stroke_width) {
            appearance.stroke_width = width.max(0.0);
        }
        if let Some(shadow) = self.shadow {
            appearance.shadow = shadow;
        }
        if let Some(visible) = self.visible {
            object.visible = visible;
        }
        if let Some(locked) = self.locked {
            object.locked = locked;
        }

        self.apply_kind_fields(object);
    }

    fn apply_kind_fields(&self, object: &mut SceneObject) {
        let border_radius = finite("border_radius", self.border_radius);
        let has_text_fields = self.text.is_some()
            || self.font_size.is_some()
            || self.font_family.is_some()
            || self.font_weight.is_some()
            || self.font_style.is_some()
            || self.text_decoration.is_some()
            || self.text_transform.is_some()
            || self.text_align.is_some()
            || self.letter_spacing.is_some()
            || self.line_height.is_some();

        match &mut object.data {
            ShapeData::Rectangle { border_radius: radius } => {
                if let Some(r) = border_radius {
                    *radius = r.max(0.0);
                }
            }
            ShapeData::Text(content) => {
                if let Some(text) = &self.text {
                    content.text = text.clone();
                }
                if let Some(size) = finite("font_size", self.font_size) {
                    content.font_size = size.max(1.0);
                }
                if let Some(family) = &self.font_family {
                    content.font_family = family.clone();
                }
                if let Some(weight) = self.font_weight {
                    content.font_weight = weight;
                }
                if let Some(style) = self.font_style {
                    content.font_style = style;
                }
                if let Some(decoration) = self.text_decoration {
                    content.text_decoration = decoration;
                }
                if let Some(transform) = self.text_transform {
                    content.text_transform = transform;
                }
                if let Some(align) = self.text_align {
                    content.text_align = align;
                }
                if let Some(spacing) = finite("letter_spacing", self.letter_spacing) {
                    content.letter_spacing = spacing;
                }
                if let Some(height) = finite("line_height", self.line_height) {
                    content.line_height = height.max(0.0);
                }
            }
            ShapeData::Image { src } => {
                if let Some(new_src) = &self.src {
                    *src = new_src.clone();
                }
            }
            ShapeData::Polygon { points } => {
                if let Some(flat) = &self.points {
                    let outline = unflatten_points(flat);
                    if outline.len() >= 3 {
                        *points = outline;
                    } else {
                        log::warn!(
                            "Ignoring polygon outline with {} points, at least 3 required",
                            outline.len()
                        );
                    }
                }
            }
            ShapeData::Line { points } => {
                if let Some(flat) = &self.points {
                    *points = unflatten_points(flat);
                }
            }
            ShapeData::Path { data } => {
                if let Some(new_data) = &self.path_data {
                    *data = new_data.clone();
                }
            }
            ShapeData::Ellipse => {}
        }

        let kind = object.kind();
        if border_radius.is_some() && !matches!(kind, ObjectKind::Rectangle) {
            ignored("border_radius", object);
        }
        if has_text_fields && !matches!(kind, ObjectKind::Text) {
            ignored("text fields", object);
        }
        if self.src.is_some() && !matches!(kind, ObjectKind::Image) {
            ignored("src", object);
        }
        if self.points.is_some() && !matches!(kind, ObjectKind::Polygon | ObjectKind::Line) {
            ignored("points", object);
        }
        if self.path_data.is_some() && !matches!(kind, ObjectKind::Path) {
            ignored("path_data", object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::CreationDefaults;
    use kurbo::Point;

    fn make(kind: ObjectKind) -> SceneObject {
        SceneObject::create(
            kind,
            Point::ZERO,
            1,
            &CreationDefaults::default(),
            &ObjectPatch::default(),
        )
    }

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut rect = make(ObjectKind::Rectangle);
        let before = rect.clone();
        ObjectPatch {
            x: Some(42.0),
            opacity: Some(3.0),
            ..ObjectPatch::default()
        }
        .apply(&mut rect);

        assert!((rect.geometry.x - 42.0).abs() < f64::EPSILON);
        assert!((rect.geometry.y - before.geometry.y).abs() < f64::EPSILON);
        assert!((rect.appearance.opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(rect.name, before.name);
    }

    #[test]
    fn test_kind_mismatch_is_ignored() {
        let mut ellipse = make(ObjectKind::Ellipse);
        let before = ellipse.clone();
        ObjectPatch {
            border_radius: Some(10.0),
            text: Some("nope".to_string()),
            ..ObjectPatch::default()
        }
        .apply(&mut ellipse);
        assert_eq!(ellipse, before);
    }

    #[test]
    fn test_null_fill_clears() {
        let mut rect = make(ObjectKind::Rectangle);
        let patch: ObjectPatch = serde_json::from_str(r#"{ "fill": null }"#).unwrap();
        assert_eq!(patch.fill, Some(None));
        patch.apply(&mut rect);
        assert!(rect.appearance.fill.is_none());

        let absent: ObjectPatch = serde_json::from_str("{}").unwrap();
        assert!(absent.fill.is_none());
        assert!(absent.is_empty());
    }

    #[test]
    fn test_non_finite_values_are_dropped() {
        let mut rect = make(ObjectKind::Rectangle);
        ObjectPatch {
            width: Some(f64::NAN),
            ..ObjectPatch::default()
        }
        .apply(&mut rect);
        assert!((rect.geometry.width - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_polygon_outline_needs_three_points() {
        let mut polygon = make(ObjectKind::Polygon);
        let before = polygon.data.clone();
        ObjectPatch {
            points: Some(vec![0.0, 0.0, 1.0, 1.0]),
            ..ObjectPatch::default()
        }
        .apply(&mut polygon);
        assert_eq!(polygon.data, before);
    }
}
