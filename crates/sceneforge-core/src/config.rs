//! Engine configuration.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// How point hit-testing treats rotated and flipped objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTestMode {
    /// Unrotated axis-aligned box only.
    Aabb,
    /// Point is mapped into the object's local frame.
    #[default]
    Oriented,
}

/// How interactive resize frames are written to the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeStrategy {
    /// Every frame rewrites width/height directly.
    #[default]
    Direct,
    /// Frames accumulate `scale_x`/`scale_y`; baked down when the gesture ends.
    Scale,
}

/// Tunables for an [`Editor`](crate::Editor) instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Floor for width/height produced by resize gestures (document units).
    pub min_object_size: f64,
    /// Maximum number of history snapshots kept (None = unbounded).
    pub history_limit: Option<usize>,
    /// Grid spacing used by snap-to-grid.
    pub grid_size: f64,
    /// Handle hit radius in screen pixels.
    pub handle_tolerance: f64,
    /// Distance between the top edge and the rotate handle (document units).
    pub rotate_handle_offset: f64,
    /// Zoom factor applied per wheel notch towards the user.
    pub wheel_zoom_in: f64,
    /// Zoom factor applied per wheel notch away from the user.
    pub wheel_zoom_out: f64,
    /// A drawn shape is only created once it exceeds this size on either axis.
    pub min_draw_size: f64,
    pub hit_test_mode: HitTestMode,
    pub resize_strategy: ResizeStrategy,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            min_object_size: 5.0,
            history_limit: None,
            grid_size: 20.0,
            handle_tolerance: 8.0,
            rotate_handle_offset: 25.0,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            min_draw_size: 5.0,
            hit_test_mode: HitTestMode::default(),
            resize_strategy: ResizeStrategy::default(),
            canvas_width: 800.0,
            canvas_height: 600.0,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.min_zoom > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if self.max_zoom < self.min_zoom {
            return Err(EngineError::InvalidConfig(format!(
                "max_zoom {} is below min_zoom {}",
                self.max_zoom, self.min_zoom
            )));
        }
        if !(self.min_object_size > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "min_object_size must be positive, got {}",
                self.min_object_size
            )));
        }
        if !(self.grid_size > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }
        if self.history_limit == Some(0) {
            return Err(EngineError::InvalidConfig(
                "history_limit must keep at least one snapshot".to_string(),
            ));
        }
        Ok(())
    }
}
