//! Edge snapping for drags.

use std::collections::HashSet;

use crate::coords::CoordinateMapper;
use crate::timeline::{ClipId, Track};

/// Which edge of the target clip produced a snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapEdge {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// Absolute timeline time of the edge snapped to.
    pub time: f64,
    pub target_clip_id: ClipId,
    pub edge: SnapEdge,
    pub distance_px: f64,
}

/// Transient snap indicator exposed to the renderer while dragging.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SnapState {
    #[default]
    Inactive,
    Snapping {
        time: f64,
        edge: SnapEdge,
        target_clip_id: ClipId,
    },
}

impl SnapState {
    pub fn is_snapping(&self) -> bool {
        matches!(self, SnapState::Snapping { .. })
    }
}

impl From<Option<&SnapResult>> for SnapState {
    fn from(result: Option<&SnapResult>) -> Self {
        match result {
            Some(r) => SnapState::Snapping {
                time: r.time,
                edge: r.edge,
                target_clip_id: r.target_clip_id.clone(),
            },
            None => SnapState::Inactive,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SnapEngine {
    pub threshold_px: f64,
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self { threshold_px: 10.0 }
    }
}

impl SnapEngine {
    pub fn new(threshold_px: f64) -> Self {
        Self { threshold_px }
    }

    /// Nearest clip edge strictly within the threshold of `candidate_px`.
    ///
    /// Candidates are visited in track order, then by clip start time, start
    /// edge before end edge. Only a strictly closer edge replaces the best so
    /// far, so the first visited edge wins a tie.
    pub fn find_snap(
        &self,
        candidate_px: f64,
        tracks: &[Track],
        dragged: &HashSet<ClipId>,
        mapper: &CoordinateMapper,
    ) -> Option<SnapResult> {
        let mut best: Option<SnapResult> = None;

        for track in tracks {
            for clip in track.clips_by_start() {
                if dragged.contains(&clip.id) {
                    continue;
                }
                for (edge, time) in [(SnapEdge::Start, clip.start_time), (SnapEdge::End, clip.end_time)] {
                    let distance_px = (mapper.time_to_pixel(time) - candidate_px).abs();
                    if distance_px >= self.threshold_px {
                        continue;
                    }
                    if best.as_ref().is_none_or(|b| distance_px < b.distance_px) {
                        best = Some(SnapResult {
                            time,
                            target_clip_id: clip.id.clone(),
                            edge,
                            distance_px,
                        });
                    }
                }
            }
        }

        best
    }
}
