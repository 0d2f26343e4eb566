use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::error::{CoreError, Result};
use crate::media::AudioSource;
use crate::ops::{self, ClipPlacement};
use crate::selection::{RangeSelection, Selection};
use crate::state::{TimelineState, total_duration_for};
use crate::timeline::{ClipId, GroupId, Track, TrackId, TrackType};
use crate::validate;

/// A named change to the timeline. Commands carry any ids they create so
/// that [`reduce`] stays deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Click on a clip; `toggle` is meta/ctrl.
    SelectClip { clip_id: ClipId, toggle: bool },
    SelectGroup(GroupId),
    SetSelection(Vec<ClipId>),
    ClearSelection,

    /// Split at the playhead, scoped to the selection when there is one.
    SplitAtPlayhead,
    SplitAt(f64),
    RangeSplit(RangeSelection),
    RangeDelete(RangeSelection),
    DeleteSelected,
    Group(GroupId),
    Ungroup,
    SetGroupCollapsed { group_id: GroupId, collapsed: bool },
    ToggleGroupCollapsed(GroupId),

    /// Live drag/trim result: new bounds for each listed clip.
    PlaceClips(Vec<ClipPlacement>),

    AddTrack {
        track_id: TrackId,
        name: String,
        track_type: TrackType,
    },
    /// Append a clip for `source` at the end of the track.
    AddClip {
        clip_id: ClipId,
        track_id: TrackId,
        source: AudioSource,
    },

    SetPlayhead(f64),
    /// Advance a playing playhead by `dt` seconds.
    AdvancePlayhead(f64),
    SetPlaying(bool),
    TogglePlayback,
    SetViewport { zoom: f64, offset: f64 },
}

impl Command {
    /// Group the selection under a fresh id.
    pub fn group() -> Self {
        Command::Group(GroupId::fresh())
    }

    pub fn add_track(name: impl Into<String>, track_type: TrackType) -> Self {
        Command::AddTrack {
            track_id: TrackId::fresh(),
            name: name.into(),
            track_type,
        }
    }

    pub fn add_clip(track_id: TrackId, source: AudioSource) -> Self {
        Command::AddClip {
            clip_id: ClipId::fresh(),
            track_id,
            source,
        }
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SelectClip { .. } => "select clip",
            Command::SelectGroup(_) => "select group",
            Command::SetSelection(_) => "set selection",
            Command::ClearSelection => "clear selection",
            Command::SplitAtPlayhead => "split at playhead",
            Command::SplitAt(_) => "split",
            Command::RangeSplit(_) => "range split",
            Command::RangeDelete(_) => "range delete",
            Command::DeleteSelected => "delete",
            Command::Group(_) => "group",
            Command::Ungroup => "ungroup",
            Command::SetGroupCollapsed { .. } => "set group collapsed",
            Command::ToggleGroupCollapsed(_) => "toggle group collapsed",
            Command::PlaceClips(_) => "place clips",
            Command::AddTrack { .. } => "add track",
            Command::AddClip { .. } => "add clip",
            Command::SetPlayhead(_) => "set playhead",
            Command::AdvancePlayhead(_) => "advance playhead",
            Command::SetPlaying(_) => "set playing",
            Command::TogglePlayback => "toggle playback",
            Command::SetViewport { .. } => "set viewport",
        }
    }
}

/// Compute the state that results from applying `command` to `state`.
///
/// Pure: `state` is never modified. On `Err` nothing should be committed.
pub fn reduce(state: &TimelineState, command: &Command, config: &EditorConfig) -> Result<TimelineState> {
    let mut next = state.clone();
    let selection = state.selected_clips.ids();

    match command {
        Command::SelectClip { clip_id, toggle } => {
            if !state.timeline.contains_clip(clip_id) {
                return Err(CoreError::ClipNotFound(clip_id.clone()));
            }
            next.selected_clips = state.selected_clips.click(&state.timeline, clip_id, *toggle);
        }
        Command::SelectGroup(group_id) => {
            state.timeline.group(group_id)?;
            next.selected_clips = Selection::of_group(&state.timeline, group_id);
        }
        Command::SetSelection(ids) => {
            next.selected_clips = Selection::from_ids(ids.iter().cloned());
        }
        Command::ClearSelection => next.selected_clips.clear(),

        Command::SplitAtPlayhead => {
            next.timeline = ops::split_at(&state.timeline, state.playhead_position, selection)?;
            next.selected_clips.clear();
        }
        Command::SplitAt(position) => {
            next.timeline = ops::split_at(&state.timeline, *position, selection)?;
            next.selected_clips.clear();
        }
        Command::RangeSplit(range) => {
            next.timeline = ops::range_split(&state.timeline, range)?;
        }
        Command::RangeDelete(range) => {
            next.timeline = ops::range_delete(&state.timeline, range)?;
        }
        Command::DeleteSelected => {
            next.timeline = ops::delete_clips(&state.timeline, selection);
            next.selected_clips.clear();
        }
        Command::Group(group_id) => {
            next.timeline = ops::group_clips(&state.timeline, selection, group_id.clone())?;
            next.selected_clips.clear();
        }
        Command::Ungroup => {
            next.timeline = ops::ungroup_clips(&state.timeline, selection)?;
            next.selected_clips.clear();
        }
        Command::SetGroupCollapsed {
            group_id,
            collapsed,
        } => {
            next.timeline = ops::set_group_collapsed(&state.timeline, group_id, *collapsed)?;
        }
        Command::ToggleGroupCollapsed(group_id) => {
            let collapsed = state.timeline.group(group_id)?.collapsed;
            next.timeline = ops::set_group_collapsed(&state.timeline, group_id, !collapsed)?;
        }

        Command::PlaceClips(placements) => {
            next.timeline = ops::apply_placements(&state.timeline, placements)?;
        }

        Command::AddTrack {
            track_id,
            name,
            track_type,
        } => {
            let mut track = Track::new(track_id.clone(), name.clone(), *track_type);
            track.height = config.default_track_height;
            next.timeline.tracks.push(track);
        }
        Command::AddClip {
            clip_id,
            track_id,
            source,
        } => {
            let color_index = state.timeline.clips().count();
            let clip = source.to_clip(clip_id.clone(), track_id.clone(), color_index);
            next.timeline = ops::append_clip(&state.timeline, clip)?;
        }

        Command::SetPlayhead(position) => next.playhead_position = *position,
        Command::AdvancePlayhead(dt) => {
            if state.is_playing {
                next.playhead_position = state.playhead_position + dt;
                if next.playhead_position >= state.total_duration {
                    next.is_playing = false;
                }
            }
        }
        Command::SetPlaying(playing) => next.is_playing = *playing,
        Command::TogglePlayback => next.is_playing = !state.is_playing,
        Command::SetViewport { zoom, offset } => {
            next.zoom_level = *zoom;
            next.viewport_offset = *offset;
        }
    }

    finalize(&mut next, config)?;
    Ok(next)
}

/// Re-derive dependent fields and reject structurally broken results.
fn finalize(state: &mut TimelineState, config: &EditorConfig) -> Result<()> {
    validate::check_structure(&state.timeline)?;

    state.selected_clips.retain_existing(&state.timeline);
    let selected = &state.selected_clips;
    for clip in state.timeline.clips_mut() {
        clip.selected = selected.contains(&clip.id);
    }

    state.total_duration = total_duration_for(&state.timeline, config);
    state.playhead_position = state.playhead_position.clamp(0.0, state.total_duration);
    state.zoom_level = config.clamp_zoom(state.zoom_level);
    state.viewport_offset = state.viewport_offset.max(0.0);
    Ok(())
}

/// Serializable summary of a state, handed to loggers and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub tracks: usize,
    pub clips: usize,
    pub groups: usize,
    pub selected: usize,
    pub total_duration: f64,
}

impl From<&TimelineState> for StateSummary {
    fn from(state: &TimelineState) -> Self {
        Self {
            tracks: state.timeline.tracks.len(),
            clips: state.timeline.clips().count(),
            groups: state.timeline.groups.len(),
            selected: state.selected_clips.len(),
            total_duration: state.total_duration,
        }
    }
}
