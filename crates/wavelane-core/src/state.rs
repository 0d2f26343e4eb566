use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::coords::CoordinateMapper;
use crate::selection::Selection;
use crate::timeline::{Group, Timeline, Track};

/// One immutable snapshot of everything the renderer draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    pub playhead_position: f64,
    pub zoom_level: f64,
    /// Horizontal scroll in pixels.
    pub viewport_offset: f64,
    pub selected_clips: Selection,
    pub timeline: Timeline,
    pub is_playing: bool,
    /// Derived: `max(min_total_duration, last clip end + padding)`.
    pub total_duration: f64,
}

impl TimelineState {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_timeline(config, Timeline::new())
    }

    pub fn with_timeline(config: &EditorConfig, timeline: Timeline) -> Self {
        let total_duration = total_duration_for(&timeline, config);
        Self {
            playhead_position: 0.0,
            zoom_level: config.clamp_zoom(1.0),
            viewport_offset: 0.0,
            selected_clips: Selection::new(),
            timeline,
            is_playing: false,
            total_duration,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.timeline.tracks
    }

    pub fn groups(&self) -> &[Group] {
        &self.timeline.groups
    }

    pub fn mapper(&self, config: &EditorConfig) -> CoordinateMapper {
        CoordinateMapper::new(config.base_pixels_per_second, self.zoom_level)
            .with_offset(self.viewport_offset)
    }

    /// True if any selected clip belongs to a group.
    pub fn has_grouped_selection(&self) -> bool {
        self.selected_clips.has_grouped(&self.timeline)
    }
}

pub fn total_duration_for(timeline: &Timeline, config: &EditorConfig) -> f64 {
    (timeline.max_clip_end() + config.duration_padding).max(config.min_total_duration)
}
