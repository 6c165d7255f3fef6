//! Polygon outlines and preset shapes.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Built-in polygon outlines, expressed as fractions of the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonPreset {
    Triangle,
    Diamond,
    Hexagon,
    Star,
}

const TRIANGLE: &[(f64, f64)] = &[(0.5, 0.0), (0.0, 1.0), (1.0, 1.0)];
const DIAMOND: &[(f64, f64)] = &[(0.5, 0.0), (1.0, 0.5), (0.5, 1.0), (0.0, 0.5)];
const HEXAGON: &[(f64, f64)] = &[
    (0.25, 0.0),
    (0.75, 0.0),
    (1.0, 0.43),
    (0.75, 1.0),
    (0.25, 1.0),
    (0.0, 0.43),
];
const STAR: &[(f64, f64)] = &[
    (0.5, 0.0),
    (0.61, 0.35),
    (0.98, 0.35),
    (0.68, 0.57),
    (0.79, 0.91),
    (0.5, 0.7),
    (0.21, 0.91),
    (0.32, 0.57),
    (0.02, 0.35),
    (0.39, 0.35),
];

impl PolygonPreset {
    pub fn all() -> &'static [PolygonPreset] {
        &[
            PolygonPreset::Triangle,
            PolygonPreset::Diamond,
            PolygonPreset::Hexagon,
            PolygonPreset::Star,
        ]
    }

    fn fractions(&self) -> &'static [(f64, f64)] {
        match self {
            PolygonPreset::Triangle => TRIANGLE,
            PolygonPreset::Diamond => DIAMOND,
            PolygonPreset::Hexagon => HEXAGON,
            PolygonPreset::Star => STAR,
        }
    }

    /// Outline in local coordinates for a `width`×`height` box.
    pub fn points(&self, width: f64, height: f64) -> Vec<Point> {
        self.fractions()
            .iter()
            .map(|&(fx, fy)| Point::new(fx * width, fy * height))
            .collect()
    }
}

/// Pair up a flat `[x0, y0, x1, y1, ...]` list. A trailing odd value is dropped.
pub fn unflatten_points(flat: &[f64]) -> Vec<Point> {
    flat.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect()
}

/// Inverse of [`unflatten_points`].
pub fn flatten_points(points: &[Point]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}
