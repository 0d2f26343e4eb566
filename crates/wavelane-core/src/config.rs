use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Every tunable constant of the editing engine.
///
/// Missing fields fall back to their defaults, so a config file only needs
/// to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pixels per second at zoom 1.
    pub base_pixels_per_second: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Factor applied by a single zoom-in / zoom-out step.
    pub zoom_step: f64,
    /// Wheel zoom multiplies by `exp(-delta * wheel_sensitivity)`.
    pub wheel_sensitivity: f64,
    pub zoom_animation_ms: u64,
    pub snap_threshold_px: f64,
    pub snap_enabled: bool,
    /// Pointer travel on either axis before an armed drag starts moving.
    pub drag_threshold_px: f64,
    /// Horizontal travel inside a clip body that starts a range selection.
    pub range_drag_threshold_px: f64,
    pub min_clip_duration: f64,
    /// Seconds of empty timeline kept past the last clip.
    pub duration_padding: f64,
    pub min_total_duration: f64,
    pub default_track_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_pixels_per_second: 20.0,
            min_zoom: 0.1,
            max_zoom: 20.0,
            zoom_step: 1.25,
            wheel_sensitivity: 0.002,
            zoom_animation_ms: 200,
            snap_threshold_px: 10.0,
            snap_enabled: true,
            drag_threshold_px: 5.0,
            range_drag_threshold_px: 3.0,
            min_clip_duration: 0.05,
            duration_padding: 10.0,
            min_total_duration: 60.0,
            default_track_height: 80.0,
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_pixels_per_second > 0.0) {
            return Err(CoreError::InvalidConfig(
                "base_pixels_per_second must be positive".into(),
            ));
        }
        if !(self.min_zoom > 0.0) || self.min_zoom > self.max_zoom {
            return Err(CoreError::InvalidConfig(format!(
                "zoom bounds [{}, {}] are not a valid range",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.zoom_step > 1.0) {
            return Err(CoreError::InvalidConfig("zoom_step must exceed 1".into()));
        }
        if self.snap_threshold_px < 0.0
            || self.drag_threshold_px < 0.0
            || self.range_drag_threshold_px < 0.0
        {
            return Err(CoreError::InvalidConfig(
                "pixel thresholds must not be negative".into(),
            ));
        }
        if !(self.min_clip_duration > 0.0) {
            return Err(CoreError::InvalidConfig(
                "min_clip_duration must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Never panics, even on bounds that fail [`EditorConfig::validate`].
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
