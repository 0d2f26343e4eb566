use thiserror::Error;

use crate::timeline::{ClipId, GroupId, TrackId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("track not found: {0}")]
    TrackNotFound(TrackId),

    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("split position {position}s is outside clip {clip_id}")]
    SplitOutsideClip { clip_id: ClipId, position: f64 },

    #[error("invalid time range: start {start} >= end {end}")]
    InvalidTimeRange { start: f64, end: f64 },

    #[error("invalid range [{start}, {end}) for a target of duration {duration}")]
    InvalidRangeOffsets { start: f64, end: f64, duration: f64 },

    #[error("grouping needs at least 2 clips, got {0}")]
    GroupTooSmall(usize),

    #[error("cannot group clips that span more than one track")]
    GroupSpansTracks,

    #[error("clip {0} already belongs to a group")]
    AlreadyGrouped(ClipId),

    #[error("no selected clip belongs to a group")]
    NothingToUngroup,

    #[error("drag anchor not found: {0}")]
    AnchorNotFound(ClipId),

    #[error("clip {clip_id} claims track {claimed} but lives on {actual}")]
    ClipTrackMismatch {
        clip_id: ClipId,
        claimed: TrackId,
        actual: TrackId,
    },

    #[error("clip {clip_id} references missing group {group_id}")]
    DanglingGroupReference { clip_id: ClipId, group_id: GroupId },

    #[error("group {group_id} lists clip {clip_id} which does not point back at it")]
    GroupMemberMismatch { group_id: GroupId, clip_id: ClipId },

    #[error("clip id {0} is used more than once")]
    DuplicateClipId(ClipId),

    #[error("clip {0} is listed by more than one group entry")]
    DuplicateGroupMember(ClipId),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("audio decode failed for {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Rejections the editor treats as silent no-ops rather than failures.
    pub fn is_noop_rejection(&self) -> bool {
        matches!(
            self,
            CoreError::GroupTooSmall(_)
                | CoreError::GroupSpansTracks
                | CoreError::AlreadyGrouped(_)
                | CoreError::NothingToUngroup
                | CoreError::AnchorNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
