//! Pointer-driven move, trim and playhead drags.
//!
//! `Idle → Armed → Dragging → Idle`. A mouse-down arms a drag and captures
//! the pointer; nothing moves until the pointer travels past the threshold on
//! either axis. While dragging, every move yields the new bounds computed
//! from the pre-drag snapshot, so repeated moves never accumulate drift.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use crate::config::EditorConfig;
use crate::coords::CoordinateMapper;
use crate::error::{CoreError, Result};
use crate::ops::ClipPlacement;
use crate::selection::Selection;
use crate::snap::{SnapEngine, SnapResult, SnapState};
use crate::state::TimelineState;
use crate::timeline::{ClipId, slice_samples};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    TrimStart,
    TrimEnd,
    Playhead,
}

// =============================================================================
// Pointer capture
// =============================================================================

/// Registry of global pointer move/up listeners on the host input surface.
///
/// The host routes window-wide pointer events to the editor only while
/// [`PointerListeners::active`] is non-zero.
#[derive(Debug, Clone, Default)]
pub struct PointerListeners {
    active: Rc<Cell<usize>>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> PointerCapture {
        self.active.set(self.active.get() + 1);
        PointerCapture {
            active: Rc::clone(&self.active),
        }
    }

    pub fn active(&self) -> usize {
        self.active.get()
    }
}

/// One registration of the global move/up listeners. Dropping it
/// deregisters, so every way out of a drag releases the pointer.
#[derive(Debug)]
pub struct PointerCapture {
    active: Rc<Cell<usize>>,
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        self.active.set(self.active.get().saturating_sub(1));
    }
}

// =============================================================================
// Drag state
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    Clips {
        kind: DragKind,
        anchor: ClipId,
        /// Pre-drag bounds of every dragged clip, anchor first.
        originals: Vec<ClipPlacement>,
    },
    Playhead {
        original: f64,
    },
}

impl DragTarget {
    pub fn kind(&self) -> DragKind {
        match self {
            DragTarget::Clips { kind, .. } => *kind,
            DragTarget::Playhead { .. } => DragKind::Playhead,
        }
    }

    pub fn dragged_ids(&self) -> Vec<ClipId> {
        match self {
            DragTarget::Clips { originals, .. } => {
                originals.iter().map(|p| p.clip_id.clone()).collect()
            }
            DragTarget::Playhead { .. } => Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct DragSession {
    pub target: DragTarget,
    pub origin: Point,
    _capture: PointerCapture,
}

#[derive(Debug, Default)]
pub enum DragState {
    #[default]
    Idle,
    Armed(DragSession),
    Dragging(DragSession),
}

impl DragState {
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            DragState::Idle => None,
            DragState::Armed(s) | DragState::Dragging(s) => Some(s),
        }
    }
}

/// Proposed change produced by a pointer move.
#[derive(Debug, Clone, PartialEq)]
pub enum DragUpdate {
    Clips(Vec<ClipPlacement>),
    Playhead(f64),
}

/// How a pointer-up ended the gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum DragRelease {
    /// Nothing was armed.
    Ignored,
    /// Released before crossing the threshold: a plain click.
    Click(DragTarget),
    Dropped(DragTarget),
}

// =============================================================================
// Controller
// =============================================================================

#[derive(Debug)]
pub struct DragController {
    state: DragState,
    snap_state: SnapState,
    snap: SnapEngine,
    snap_enabled: bool,
    threshold_px: f64,
    min_clip_duration: f64,
    listeners: PointerListeners,
}

impl DragController {
    pub fn new(config: &EditorConfig, listeners: PointerListeners) -> Self {
        Self {
            state: DragState::Idle,
            snap_state: SnapState::Inactive,
            snap: SnapEngine::new(config.snap_threshold_px),
            snap_enabled: config.snap_enabled,
            threshold_px: config.drag_threshold_px,
            min_clip_duration: config.min_clip_duration,
            listeners,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn snap_state(&self) -> &SnapState {
        &self.snap_state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Arm a clip drag on mouse-down.
    ///
    /// The dragged set is the whole selection when the anchor is selected,
    /// otherwise just the anchor, in both cases widened to full groups.
    /// Trims only ever touch the anchor. An unknown anchor leaves the
    /// controller idle.
    pub fn begin_clip_drag(
        &mut self,
        state: &TimelineState,
        anchor: &ClipId,
        kind: DragKind,
        origin: Point,
    ) -> Result<()> {
        let anchor_clip = state
            .timeline
            .find_clip(anchor)
            .ok_or_else(|| CoreError::AnchorNotFound(anchor.clone()))?;

        let ids: Vec<ClipId> = match kind {
            DragKind::Move => {
                let base = if state.selected_clips.contains(anchor) {
                    state.selected_clips.clone()
                } else {
                    Selection::from_ids([anchor.clone()])
                };
                let mut ordered = vec![anchor.clone()];
                for id in base.expanded_to_groups(&state.timeline).ids() {
                    if id != anchor {
                        ordered.push(id.clone());
                    }
                }
                ordered
            }
            _ => vec![anchor.clone()],
        };

        let mut originals = vec![ClipPlacement::of(anchor_clip)];
        originals.extend(
            ids.iter()
                .skip(1)
                .filter_map(|id| state.timeline.find_clip(id))
                .map(ClipPlacement::of),
        );

        debug!(%anchor, ?kind, clips = originals.len(), "drag armed");
        self.arm(
            DragTarget::Clips {
                kind,
                anchor: anchor.clone(),
                originals,
            },
            origin,
        );
        Ok(())
    }

    pub fn begin_playhead_drag(&mut self, state: &TimelineState, origin: Point) {
        self.arm(
            DragTarget::Playhead {
                original: state.playhead_position,
            },
            origin,
        );
    }

    fn arm(&mut self, target: DragTarget, origin: Point) {
        // Any previous session is dropped first, releasing its capture.
        self.state = DragState::Idle;
        self.snap_state = SnapState::Inactive;
        self.state = DragState::Armed(DragSession {
            target,
            origin,
            _capture: self.listeners.acquire(),
        });
    }

    /// Feed a pointer position. Returns the change to apply, if any.
    pub fn pointer_move(
        &mut self,
        state: &TimelineState,
        mapper: &CoordinateMapper,
        pos: Point,
    ) -> Option<DragUpdate> {
        if let DragState::Armed(session) = &self.state {
            let dx = (pos.x - session.origin.x).abs();
            let dy = (pos.y - session.origin.y).abs();
            if dx <= self.threshold_px && dy <= self.threshold_px {
                return None;
            }
            let DragState::Armed(session) = std::mem::take(&mut self.state) else {
                return None;
            };
            debug!(kind = ?session.target.kind(), "drag started");
            self.state = DragState::Dragging(session);
        }

        let DragState::Dragging(session) = &self.state else {
            return None;
        };
        let dx = pos.x - session.origin.x;

        let (update, snap) = match &session.target {
            DragTarget::Playhead { .. } => {
                let t = mapper.pixel_to_time(pos.x).clamp(0.0, state.total_duration);
                (DragUpdate::Playhead(t), None)
            }
            DragTarget::Clips {
                kind, originals, ..
            } => {
                let delta = mapper.delta_to_time(dx);
                let dragged: HashSet<ClipId> =
                    originals.iter().map(|p| p.clip_id.clone()).collect();
                let snap_at = |t: f64| -> Option<SnapResult> {
                    if !self.snap_enabled {
                        return None;
                    }
                    self.snap.find_snap(
                        mapper.time_to_pixel(t),
                        state.tracks(),
                        &dragged,
                        mapper,
                    )
                };
                match kind {
                    DragKind::Move => self.compute_move(originals, delta, snap_at),
                    DragKind::TrimStart => self.compute_trim_start(&originals[0], delta, snap_at),
                    DragKind::TrimEnd => self.compute_trim_end(&originals[0], delta, snap_at),
                    DragKind::Playhead => return None,
                }
            }
        };

        self.snap_state = SnapState::from(snap.as_ref());
        Some(update)
    }

    fn compute_move(
        &self,
        originals: &[ClipPlacement],
        delta: f64,
        snap_at: impl Fn(f64) -> Option<SnapResult>,
    ) -> (DragUpdate, Option<SnapResult>) {
        let anchor = &originals[0];
        let target = anchor.start_time + delta;
        let snap = snap_at(target);
        let proposed = snap.as_ref().map_or(target, |s| s.time).max(0.0);

        // Keep the earliest dragged clip from crossing zero as well.
        let earliest = originals
            .iter()
            .map(|p| p.start_time)
            .fold(f64::MAX, f64::min);
        let shift = (proposed - anchor.start_time).max(-earliest);

        let placements = originals
            .iter()
            .map(|p| ClipPlacement {
                start_time: p.start_time + shift,
                end_time: p.end_time + shift,
                ..p.clone()
            })
            .collect();
        (DragUpdate::Clips(placements), snap)
    }

    fn compute_trim_start(
        &self,
        original: &ClipPlacement,
        delta: f64,
        snap_at: impl Fn(f64) -> Option<SnapResult>,
    ) -> (DragUpdate, Option<SnapResult>) {
        let target = original.start_time + delta;
        let snap = snap_at(target);
        let mut lower = 0.0f64.max(original.start_time - original.source_start_offset);
        // Held samples cover only the clip's own span; it cannot grow past them.
        if original.holds_samples() {
            lower = lower.max(original.start_time);
        }
        let upper = original.end_time - self.min_clip_duration;
        let start = snap.as_ref().map_or(target, |s| s.time).clamp(lower, upper.max(lower));
        let placement = ClipPlacement {
            clip_id: original.clip_id.clone(),
            start_time: start,
            end_time: original.end_time,
            source_start_offset: original.source_start_offset + (start - original.start_time),
            waveform_data: original.waveform_data.as_ref().map(|samples| {
                let duration = original.end_time - original.start_time;
                slice_samples(samples, duration, start - original.start_time, duration)
            }),
        };
        (DragUpdate::Clips(vec![placement]), snap)
    }

    fn compute_trim_end(
        &self,
        original: &ClipPlacement,
        delta: f64,
        snap_at: impl Fn(f64) -> Option<SnapResult>,
    ) -> (DragUpdate, Option<SnapResult>) {
        let target = original.end_time + delta;
        let snap = snap_at(target);
        let lower = original.start_time + self.min_clip_duration;
        let upper = if original.holds_samples() {
            original.end_time
        } else {
            f64::INFINITY
        };
        let end = snap.as_ref().map_or(target, |s| s.time).clamp(lower, upper.max(lower));
        let placement = ClipPlacement {
            end_time: end,
            waveform_data: original.waveform_data.as_ref().map(|samples| {
                let duration = original.end_time - original.start_time;
                slice_samples(samples, duration, 0.0, end - original.start_time)
            }),
            ..original.clone()
        };
        (DragUpdate::Clips(vec![placement]), snap)
    }

    /// End the gesture on pointer-up. Changes were already applied live, so
    /// there is nothing to commit; the capture is released here.
    pub fn pointer_up(&mut self) -> DragRelease {
        self.snap_state = SnapState::Inactive;
        match std::mem::take(&mut self.state) {
            DragState::Idle => DragRelease::Ignored,
            DragState::Armed(session) => DragRelease::Click(session.target),
            DragState::Dragging(session) => {
                debug!(kind = ?session.target.kind(), "drag dropped");
                DragRelease::Dropped(session.target)
            }
        }
    }

    /// Abort the gesture. Returns the update that puts everything back where
    /// it was before the drag, when anything had moved.
    pub fn cancel(&mut self) -> Option<DragUpdate> {
        self.snap_state = SnapState::Inactive;
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                debug!(kind = ?session.target.kind(), "drag cancelled");
                Some(match session.target {
                    DragTarget::Clips { originals, .. } => DragUpdate::Clips(originals),
                    DragTarget::Playhead { original } => DragUpdate::Playhead(original),
                })
            }
            DragState::Armed(_) | DragState::Idle => None,
        }
    }
}
