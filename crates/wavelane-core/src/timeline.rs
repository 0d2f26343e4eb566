use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// A fresh, globally unique id.
            pub fn fresh() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identity of a clip. Split descendants derive theirs from the parent id.
    ClipId,
    "clip"
);
string_id!(TrackId, "track");
string_id!(GroupId, "group");

impl ClipId {
    /// `{parent}-{suffix}`, used for split and range descendants.
    pub fn derived(&self, suffix: &str) -> ClipId {
        ClipId(format!("{}-{}", self.0, suffix))
    }
}

/// One contiguous audio segment placed on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub track_id: TrackId,
    pub start_time: f64,
    pub end_time: f64,
    /// Always `end_time - start_time`; every mutator goes through [`Clip::set_span`].
    pub duration: f64,
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    /// Seconds into the source audio represented by this clip's first sample.
    #[serde(default)]
    pub source_start_offset: f64,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Lane within an expanded group.
    #[serde(default)]
    pub group_track_index: Option<usize>,
    /// Amplitude samples spanning exactly `[start_time, end_time)`.
    #[serde(default)]
    pub waveform_data: Vec<f32>,
    pub color: String,
}

impl Clip {
    pub fn new(
        id: impl Into<ClipId>,
        track_id: impl Into<TrackId>,
        name: impl Into<String>,
        start_time: f64,
        duration: f64,
    ) -> Self {
        Self {
            id: id.into(),
            track_id: track_id.into(),
            start_time,
            end_time: start_time + duration,
            duration,
            name: name.into(),
            selected: false,
            source_start_offset: 0.0,
            group_id: None,
            group_track_index: None,
            waveform_data: Vec::new(),
            color: crate::palette::color_for_index(0).to_owned(),
        }
    }

    /// Move both edges, keeping `duration` consistent.
    pub fn set_span(&mut self, start_time: f64, end_time: f64) {
        self.start_time = start_time;
        self.end_time = end_time;
        self.duration = end_time - start_time;
    }

    /// Translate without changing the length.
    pub fn move_to(&mut self, start_time: f64) {
        let duration = self.duration;
        self.set_span(start_time, start_time + duration);
    }

    /// True if `t` lies strictly inside the clip.
    pub fn strictly_contains(&self, t: f64) -> bool {
        self.start_time < t && t < self.end_time
    }

    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    /// Grouped clips sharing a group stack into sub-lanes and may overlap.
    pub fn shares_group_with(&self, other: &Clip) -> bool {
        matches!((&self.group_id, &other.group_id), (Some(a), Some(b)) if a == b)
    }

    /// Samples covering the local window `[from, to)` of this clip.
    pub fn waveform_slice(&self, from: f64, to: f64) -> Vec<f32> {
        slice_samples(&self.waveform_data, self.duration, from, to)
    }
}

/// Samples spread evenly over `duration` seconds, cut to the local window
/// `[from, to)`. Windows outside `[0, duration]` are clamped.
pub fn slice_samples(samples: &[f32], duration: f64, from: f64, to: f64) -> Vec<f32> {
    if samples.is_empty() || duration <= 0.0 {
        return Vec::new();
    }
    let len = samples.len();
    let index = |local: f64| -> usize {
        let ratio = (local / duration).clamp(0.0, 1.0);
        ((ratio * len as f64).round() as usize).min(len)
    };
    let (lo, hi) = (index(from), index(to));
    if lo >= hi {
        return Vec::new();
    }
    samples[lo..hi].to_vec()
}

/// Whether a track holds audio or video clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    #[default]
    Audio,
    Video,
}

/// A lane of clips. Clip order is irrelevant; layout sorts by start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    #[serde(default)]
    pub track_type: TrackType,
    pub clips: Vec<Clip>,
    pub height: f32,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>, track_type: TrackType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            track_type,
            clips: Vec::new(),
            height: 80.0,
        }
    }

    pub fn audio(id: impl Into<TrackId>, name: impl Into<String>) -> Self {
        Self::new(id, name, TrackType::Audio)
    }

    pub fn get_clip(&self, clip_id: &ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| &c.id == clip_id)
    }

    /// Clips ordered by start time, ties broken by id.
    pub fn clips_by_start(&self) -> Vec<&Clip> {
        let mut clips: Vec<&Clip> = self.clips.iter().collect();
        clips.sort_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        clips
    }

    /// End of the last clip on this track, or 0.
    pub fn end_position(&self) -> f64 {
        self.clips.iter().map(|c| c.end_time).fold(0.0, f64::max)
    }
}

/// A named bundle of clips on one track that drags and splits as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub clip_ids: Vec<ClipId>,
    pub color: String,
    /// Collapsed groups render as one merged waveform row.
    pub collapsed: bool,
    pub track_id: TrackId,
}

/// Tracks plus the groups spanning their clips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_mut(&mut self, id: &TrackId) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))
    }

    /// Every clip, in track order then storage order.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|t| t.clips.iter())
    }

    pub fn clips_mut(&mut self) -> impl Iterator<Item = &mut Clip> {
        self.tracks.iter_mut().flat_map(|t| t.clips.iter_mut())
    }

    pub fn find_clip(&self, id: &ClipId) -> Option<&Clip> {
        self.clips().find(|c| &c.id == id)
    }

    pub fn find_clip_mut(&mut self, id: &ClipId) -> Option<&mut Clip> {
        self.clips_mut().find(|c| &c.id == id)
    }

    pub fn contains_clip(&self, id: &ClipId) -> bool {
        self.find_clip(id).is_some()
    }

    pub fn group(&self, id: &GroupId) -> Result<&Group> {
        self.groups
            .iter()
            .find(|g| &g.id == id)
            .ok_or_else(|| CoreError::GroupNotFound(id.clone()))
    }

    pub fn group_mut(&mut self, id: &GroupId) -> Result<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| CoreError::GroupNotFound(id.clone()))
    }

    /// Member clips of a group, in `clip_ids` order.
    pub fn group_members(&self, id: &GroupId) -> Vec<&Clip> {
        match self.group(id) {
            Ok(group) => group
                .clip_ids
                .iter()
                .filter_map(|cid| self.find_clip(cid))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// `(earliest start, latest end)` over a group's members.
    pub fn group_span(&self, id: &GroupId) -> Option<(f64, f64)> {
        let members = self.group_members(id);
        if members.is_empty() {
            return None;
        }
        let start = members.iter().map(|c| c.start_time).fold(f64::MAX, f64::min);
        let end = members.iter().map(|c| c.end_time).fold(f64::MIN, f64::max);
        Some((start, end))
    }

    /// One amplitude row for a collapsed group: `buckets` evenly spaced over
    /// the group span, each the maximum absolute amplitude of any member
    /// sample falling into it.
    pub fn group_waveform(&self, id: &GroupId, buckets: usize) -> Option<Vec<f32>> {
        let (start, end) = self.group_span(id)?;
        let span = end - start;
        if buckets == 0 || span <= 0.0 {
            return Some(Vec::new());
        }
        let mut merged = vec![0.0f32; buckets];
        for clip in self.group_members(id) {
            let n = clip.waveform_data.len();
            if n == 0 {
                continue;
            }
            for (i, sample) in clip.waveform_data.iter().enumerate() {
                let t = clip.start_time + clip.duration * (i as f64 + 0.5) / n as f64;
                let bucket = (((t - start) / span) * buckets as f64) as usize;
                let slot = &mut merged[bucket.min(buckets - 1)];
                *slot = slot.max(sample.abs());
            }
        }
        Some(merged)
    }

    /// Latest clip end across all tracks.
    pub fn max_clip_end(&self) -> f64 {
        self.tracks
            .iter()
            .map(Track::end_position)
            .fold(0.0, f64::max)
    }
}
