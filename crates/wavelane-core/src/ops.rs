//! Clip operations: point split, range split/delete, delete, group, ungroup.
//!
//! Every function takes the current [`Timeline`] by reference and returns a
//! new one. Nothing is partially applied: on `Err` the caller's timeline is
//! untouched, and the store commits an `Ok` result in one step.

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::selection::{RangeSelection, RangeTarget};
use crate::timeline::{Clip, ClipId, Group, GroupId, Timeline, TrackId};

/// Final bounds for one clip, as proposed by a drag or trim.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlacement {
    pub clip_id: ClipId,
    pub start_time: f64,
    pub end_time: f64,
    pub source_start_offset: f64,
    /// Samples for the new span. `None` cuts them from the clip's current
    /// samples, which can shrink a clip's audio but never extend it.
    pub waveform_data: Option<Vec<f32>>,
}

impl ClipPlacement {
    pub fn of(clip: &Clip) -> Self {
        Self {
            clip_id: clip.id.clone(),
            start_time: clip.start_time,
            end_time: clip.end_time,
            source_start_offset: clip.source_start_offset,
            waveform_data: Some(clip.waveform_data.clone()),
        }
    }

    /// True when the placement carries a non-empty waveform.
    pub fn holds_samples(&self) -> bool {
        self.waveform_data.as_ref().is_some_and(|w| !w.is_empty())
    }
}

// =============================================================================
// Per-clip primitives
// =============================================================================

/// The part of `clip` covering local window `[from, to)`, with a new id.
fn sub_clip(clip: &Clip, id: ClipId, from: f64, to: f64) -> Clip {
    let mut part = clip.clone();
    part.id = id;
    part.selected = false;
    part.set_span(clip.start_time + from, clip.start_time + to);
    part.source_start_offset = clip.source_start_offset + from;
    part.waveform_data = clip.waveform_slice(from, to);
    part
}

/// Split `clip` at absolute time `p` into `{id}-left` and `{id}-right`.
pub fn split_clip(clip: &Clip, p: f64) -> Result<(Clip, Clip)> {
    if !clip.strictly_contains(p) {
        return Err(CoreError::SplitOutsideClip {
            clip_id: clip.id.clone(),
            position: p,
        });
    }
    let local = p - clip.start_time;
    let mut left = sub_clip(clip, clip.id.derived("left"), 0.0, local);
    let mut right = sub_clip(clip, clip.id.derived("right"), local, clip.duration);
    // Pin the shared edge exactly to `p` so left.end == right.start.
    left.set_span(clip.start_time, p);
    right.set_span(p, clip.end_time);
    Ok((left, right))
}

/// The `{id}-before` (`0..s`) and `{id}-after` (`e..duration`) parts left when
/// removing local window `[s, e)`. Either is `None` when empty.
pub fn range_parts(clip: &Clip, s: f64, e: f64) -> Result<(Option<Clip>, Option<Clip>)> {
    if !(s < e) || s < 0.0 || e > clip.duration {
        return Err(CoreError::InvalidRangeOffsets {
            start: s,
            end: e,
            duration: clip.duration,
        });
    }
    let before = (s > 0.0).then(|| sub_clip(clip, clip.id.derived("before"), 0.0, s));
    let after = (e < clip.duration).then(|| {
        let mut part = sub_clip(clip, clip.id.derived("after"), e, clip.duration);
        part.set_span(clip.start_time + e, clip.end_time);
        part
    });
    Ok((before, after))
}

// =============================================================================
// Timeline helpers
// =============================================================================

/// Put `replacements` where `id` was, on the same track and in the same group
/// slot. An empty replacement list removes the clip.
fn replace_clip(timeline: &mut Timeline, id: &ClipId, replacements: Vec<Clip>) -> Result<()> {
    let track = timeline
        .tracks
        .iter_mut()
        .find(|t| t.clips.iter().any(|c| &c.id == id))
        .ok_or_else(|| CoreError::ClipNotFound(id.clone()))?;
    let idx = track
        .clips
        .iter()
        .position(|c| &c.id == id)
        .ok_or_else(|| CoreError::ClipNotFound(id.clone()))?;
    let group_id = track.clips[idx].group_id.clone();
    let new_ids: Vec<ClipId> = replacements.iter().map(|c| c.id.clone()).collect();
    track.clips.splice(idx..=idx, replacements);

    if let Some(group_id) = group_id {
        let group = timeline.group_mut(&group_id)?;
        if let Some(slot) = group.clip_ids.iter().position(|c| c == id) {
            group.clip_ids.splice(slot..=slot, new_ids);
        }
    }
    Ok(())
}

/// Dissolve groups left with fewer than two members.
fn prune_groups(timeline: &mut Timeline) {
    let mut dissolved: Vec<GroupId> = Vec::new();
    for group in &mut timeline.groups {
        let existing: Vec<ClipId> = group
            .clip_ids
            .iter()
            .filter(|id| {
                timeline
                    .tracks
                    .iter()
                    .any(|t| t.clips.iter().any(|c| &c.id == *id))
            })
            .cloned()
            .collect();
        group.clip_ids = existing;
        if group.clip_ids.len() < 2 {
            dissolved.push(group.id.clone());
        }
    }
    if dissolved.is_empty() {
        return;
    }
    for clip in timeline.clips_mut() {
        if clip.group_id.as_ref().is_some_and(|g| dissolved.contains(g)) {
            clip.group_id = None;
            clip.group_track_index = None;
        }
    }
    timeline.groups.retain(|g| !dissolved.contains(&g.id));
    debug!(count = dissolved.len(), "dissolved undersized groups");
}

// =============================================================================
// Operations
// =============================================================================

/// Split every eligible clip strictly containing `p`.
///
/// With an empty `selection` every clip is eligible, otherwise only the
/// selected ones. Clips not containing `p` are untouched.
pub fn split_at(timeline: &Timeline, p: f64, selection: &[ClipId]) -> Result<Timeline> {
    let targets: Vec<Clip> = timeline
        .clips()
        .filter(|c| selection.is_empty() || selection.contains(&c.id))
        .filter(|c| c.strictly_contains(p))
        .cloned()
        .collect();

    let mut next = timeline.clone();
    for clip in &targets {
        let (left, right) = split_clip(clip, p)?;
        replace_clip(&mut next, &clip.id, vec![left, right])?;
    }
    debug!(position = p, split = targets.len(), "split at position");
    Ok(next)
}

/// Remove the window described by `range`, keeping the before/after parts.
///
/// For a group target the offsets are relative to the group's earliest start
/// and the window is applied to every member it intersects.
pub fn range_split(timeline: &Timeline, range: &RangeSelection) -> Result<Timeline> {
    let mut next = timeline.clone();
    match &range.target {
        RangeTarget::Clip(clip_id) => {
            let clip = timeline
                .find_clip(clip_id)
                .ok_or_else(|| CoreError::ClipNotFound(clip_id.clone()))?;
            let (s, e) = clamp_window(range.start_offset, range.end_offset, clip.duration)?;
            let (before, after) = range_parts(clip, s, e)?;
            replace_clip(&mut next, clip_id, before.into_iter().chain(after).collect())?;
        }
        RangeTarget::Group(group_id) => {
            let (group_start, group_end) = timeline
                .group_span(group_id)
                .ok_or_else(|| CoreError::GroupNotFound(group_id.clone()))?;
            let (s, e) = clamp_window(range.start_offset, range.end_offset, group_end - group_start)?;
            let (abs_s, abs_e) = (group_start + s, group_start + e);
            let members: Vec<Clip> = timeline.group_members(group_id).into_iter().cloned().collect();
            for clip in &members {
                let local_s = (abs_s - clip.start_time).clamp(0.0, clip.duration);
                let local_e = (abs_e - clip.start_time).clamp(0.0, clip.duration);
                if local_s >= local_e {
                    continue;
                }
                let (before, after) = range_parts(clip, local_s, local_e)?;
                replace_clip(&mut next, &clip.id, before.into_iter().chain(after).collect())?;
            }
        }
    }
    prune_groups(&mut next);
    debug!(?range, "range removed");
    Ok(next)
}

/// Same operation as [`range_split`]; invoked from the delete shortcut.
pub fn range_delete(timeline: &Timeline, range: &RangeSelection) -> Result<Timeline> {
    range_split(timeline, range)
}

fn clamp_window(start: f64, end: f64, duration: f64) -> Result<(f64, f64)> {
    let s = start.clamp(0.0, duration);
    let e = end.clamp(0.0, duration);
    if s >= e {
        return Err(CoreError::InvalidRangeOffsets {
            start,
            end,
            duration,
        });
    }
    Ok((s, e))
}

/// Remove every clip in `ids`. Unknown ids are ignored.
pub fn delete_clips(timeline: &Timeline, ids: &[ClipId]) -> Timeline {
    let mut next = timeline.clone();
    let mut removed = 0;
    for track in &mut next.tracks {
        let before = track.clips.len();
        track.clips.retain(|c| !ids.contains(&c.id));
        removed += before - track.clips.len();
    }
    prune_groups(&mut next);
    debug!(removed, "deleted clips");
    next
}

/// Bundle the selected clips into a new collapsed group.
///
/// Needs at least two clips, all on one track and none already grouped.
pub fn group_clips(timeline: &Timeline, selection: &[ClipId], group_id: GroupId) -> Result<Timeline> {
    if selection.len() < 2 {
        return Err(CoreError::GroupTooSmall(selection.len()));
    }
    let clips: Vec<&Clip> = selection
        .iter()
        .map(|id| timeline.find_clip(id).ok_or_else(|| CoreError::ClipNotFound(id.clone())))
        .collect::<Result<_>>()?;

    let track_id: TrackId = clips[0].track_id.clone();
    if clips.iter().any(|c| c.track_id != track_id) {
        return Err(CoreError::GroupSpansTracks);
    }
    if let Some(grouped) = clips.iter().find(|c| c.group_id.is_some()) {
        return Err(CoreError::AlreadyGrouped(grouped.id.clone()));
    }

    let color = clips[0].color.clone();
    let mut next = timeline.clone();
    for (index, id) in selection.iter().enumerate() {
        if let Some(clip) = next.find_clip_mut(id) {
            clip.group_id = Some(group_id.clone());
            clip.group_track_index = Some(index);
        }
    }
    let name = format!("Group {}", next.groups.len() + 1);
    next.groups.push(Group {
        id: group_id.clone(),
        name,
        clip_ids: selection.to_vec(),
        color,
        collapsed: true,
        track_id,
    });
    debug!(%group_id, members = selection.len(), "grouped clips");
    Ok(next)
}

/// Dissolve every group referenced by a selected clip.
pub fn ungroup_clips(timeline: &Timeline, selection: &[ClipId]) -> Result<Timeline> {
    let mut group_ids: Vec<GroupId> = Vec::new();
    for id in selection {
        if let Some(gid) = timeline.find_clip(id).and_then(|c| c.group_id.clone()) {
            if !group_ids.contains(&gid) {
                group_ids.push(gid);
            }
        }
    }
    if group_ids.is_empty() {
        return Err(CoreError::NothingToUngroup);
    }

    let mut next = timeline.clone();
    for clip in next.clips_mut() {
        if clip.group_id.as_ref().is_some_and(|g| group_ids.contains(g)) {
            clip.group_id = None;
            clip.group_track_index = None;
        }
    }
    next.groups.retain(|g| !group_ids.contains(&g.id));
    debug!(groups = group_ids.len(), "ungrouped");
    Ok(next)
}

/// Apply new bounds to each listed clip. `duration` follows the new span and
/// `waveform_data` is replaced so it covers exactly that span.
pub fn apply_placements(timeline: &Timeline, placements: &[ClipPlacement]) -> Result<Timeline> {
    let mut next = timeline.clone();
    for placement in placements {
        let clip = next
            .find_clip_mut(&placement.clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(placement.clip_id.clone()))?;
        let samples = match &placement.waveform_data {
            Some(samples) => samples.clone(),
            None => {
                let from = placement.source_start_offset - clip.source_start_offset;
                clip.waveform_slice(from, from + (placement.end_time - placement.start_time))
            }
        };
        clip.set_span(placement.start_time, placement.end_time);
        clip.source_start_offset = placement.source_start_offset;
        clip.waveform_data = samples;
    }
    Ok(next)
}

/// Append `clip` to its track, after the track's last clip.
pub fn append_clip(timeline: &Timeline, mut clip: Clip) -> Result<Timeline> {
    let mut next = timeline.clone();
    let track = next.track_mut(&clip.track_id)?;
    clip.move_to(track.end_position());
    debug!(clip_id = %clip.id, track_id = %track.id, start = clip.start_time, "appended clip");
    track.clips.push(clip);
    Ok(next)
}

pub fn set_group_collapsed(timeline: &Timeline, group_id: &GroupId, collapsed: bool) -> Result<Timeline> {
    let mut next = timeline.clone();
    next.group_mut(group_id)?.collapsed = collapsed;
    Ok(next)
}
