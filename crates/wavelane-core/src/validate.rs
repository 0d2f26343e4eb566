//! Post-mutation checks.
//!
//! Structural problems (a reused clip id, a clip on the wrong track, a broken
//! clip↔group link) reject a mutation before it is committed. Layout problems
//! (overlaps, inverted or negative spans) are only reported.

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::error::{CoreError, Result};
use crate::timeline::{ClipId, Timeline, TrackId};

const DURATION_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    Overlap {
        track_id: TrackId,
        first: ClipId,
        second: ClipId,
    },
    InvalidTimeRange {
        clip_id: ClipId,
        start: f64,
        end: f64,
    },
    NegativeStart {
        clip_id: ClipId,
        start: f64,
    },
    DurationMismatch {
        clip_id: ClipId,
        duration: f64,
        span: f64,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap {
                track_id,
                first,
                second,
            } => write!(f, "clips {first} and {second} overlap on track {track_id}"),
            Self::InvalidTimeRange {
                clip_id,
                start,
                end,
            } => write!(f, "clip {clip_id} has start {start} >= end {end}"),
            Self::NegativeStart { clip_id, start } => {
                write!(f, "clip {clip_id} starts at negative time {start}")
            }
            Self::DurationMismatch {
                clip_id,
                duration,
                span,
            } => write!(f, "clip {clip_id} duration {duration} != span {span}"),
        }
    }
}

/// Reject timelines whose references do not line up.
pub fn check_structure(timeline: &Timeline) -> Result<()> {
    let mut clip_ids: HashSet<&ClipId> = HashSet::new();
    for track in &timeline.tracks {
        for clip in &track.clips {
            if !clip_ids.insert(&clip.id) {
                return Err(CoreError::DuplicateClipId(clip.id.clone()));
            }
            if clip.track_id != track.id {
                return Err(CoreError::ClipTrackMismatch {
                    clip_id: clip.id.clone(),
                    claimed: clip.track_id.clone(),
                    actual: track.id.clone(),
                });
            }
            if let Some(group_id) = &clip.group_id {
                let group = timeline.group(group_id).map_err(|_| CoreError::DanglingGroupReference {
                    clip_id: clip.id.clone(),
                    group_id: group_id.clone(),
                })?;
                if !group.clip_ids.contains(&clip.id) {
                    return Err(CoreError::GroupMemberMismatch {
                        group_id: group_id.clone(),
                        clip_id: clip.id.clone(),
                    });
                }
            }
        }
    }

    let mut seen: HashSet<&ClipId> = HashSet::new();
    for group in &timeline.groups {
        for clip_id in &group.clip_ids {
            if !seen.insert(clip_id) {
                return Err(CoreError::DuplicateGroupMember(clip_id.clone()));
            }
            let points_back = timeline
                .find_clip(clip_id)
                .is_some_and(|c| c.group_id.as_ref() == Some(&group.id));
            if !points_back {
                return Err(CoreError::GroupMemberMismatch {
                    group_id: group.id.clone(),
                    clip_id: clip_id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Non-fatal layout problems, in track order.
pub fn collect_warnings(timeline: &Timeline) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    for track in &timeline.tracks {
        for clip in &track.clips {
            if clip.start_time >= clip.end_time {
                warnings.push(ValidationWarning::InvalidTimeRange {
                    clip_id: clip.id.clone(),
                    start: clip.start_time,
                    end: clip.end_time,
                });
            }
            if clip.start_time < 0.0 {
                warnings.push(ValidationWarning::NegativeStart {
                    clip_id: clip.id.clone(),
                    start: clip.start_time,
                });
            }
            let span = clip.end_time - clip.start_time;
            if (clip.duration - span).abs() > DURATION_TOLERANCE {
                warnings.push(ValidationWarning::DurationMismatch {
                    clip_id: clip.id.clone(),
                    duration: clip.duration,
                    span,
                });
            }
        }

        let ordered = track.clips_by_start();
        for (i, a) in ordered.iter().enumerate() {
            for b in ordered.iter().skip(i + 1) {
                if b.start_time >= a.end_time {
                    break;
                }
                if a.overlaps(b) && !a.shares_group_with(b) {
                    warnings.push(ValidationWarning::Overlap {
                        track_id: track.id.clone(),
                        first: a.id.clone(),
                        second: b.id.clone(),
                    });
                }
            }
        }
    }
    warnings
}

pub fn log_warnings(warnings: &[ValidationWarning]) {
    for warning in warnings {
        warn!(%warning, "timeline validation");
    }
}
