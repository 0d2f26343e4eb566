use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use wavelane_core::commands::Command;
use wavelane_core::config::EditorConfig;
use wavelane_core::coords::CoordinateMapper;
use wavelane_core::drag::{DragController, DragKind, DragRelease, DragTarget, DragUpdate, Point, PointerListeners};
use wavelane_core::error::Result;
use wavelane_core::media::{self, AudioLoader, SourceLibrary};
use wavelane_core::selection::{ClipZone, HitTarget, RangeSelection, RangeTarget, resolve_target};
use wavelane_core::snap::SnapState;
use wavelane_core::state::TimelineState;
use wavelane_core::store::{Listener, ListenerId, TimelineStore};
use wavelane_core::timeline::{ClipId, GroupId, Timeline, TrackId};
use wavelane_core::zoom::{ZoomController, ZoomPhase};

use crate::keyboard::{Shortcut, shortcut_for};
use crate::message::{KeyPress, Message, Modifiers};

/// A press inside a clip body that may grow into a range selection.
#[derive(Debug, Clone)]
struct RangeGesture {
    clip_id: ClipId,
    target: RangeTarget,
    /// Timeline time where local offset 0 sits.
    target_start: f64,
    target_duration: f64,
    origin: Point,
    anchor_offset: f64,
    modifiers: Modifiers,
    active: bool,
}

pub struct Editor {
    store: TimelineStore,
    drag: DragController,
    zoom: ZoomController,
    listeners: PointerListeners,
    range: Option<RangeSelection>,
    range_gesture: Option<RangeGesture>,
    /// Modifiers held at the last pointer-down, used when it resolves to a click.
    press_modifiers: Modifiers,
    pub library: SourceLibrary,
    loader: Option<Box<dyn AudioLoader>>,
    pub status_message: String,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self> {
        Ok(Self::from_store(TimelineStore::new(config)?))
    }

    pub fn with_timeline(config: EditorConfig, timeline: Timeline) -> Result<Self> {
        Ok(Self::from_store(TimelineStore::with_timeline(config, timeline)?))
    }

    fn from_store(store: TimelineStore) -> Self {
        let listeners = PointerListeners::new();
        let config = store.config();
        Self {
            drag: DragController::new(config, listeners.clone()),
            zoom: ZoomController::new(config),
            listeners,
            range: None,
            range_gesture: None,
            press_modifiers: Modifiers::NONE,
            library: SourceLibrary::new(),
            loader: None,
            status_message: String::new(),
            store,
        }
    }

    pub fn with_loader(mut self, loader: Box<dyn AudioLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn state(&self) -> &TimelineState {
        self.store.state()
    }

    pub fn snapshot(&self) -> Arc<TimelineState> {
        self.store.snapshot()
    }

    pub fn config(&self) -> &EditorConfig {
        self.store.config()
    }

    pub fn range_selection(&self) -> Option<&RangeSelection> {
        self.range.as_ref()
    }

    pub fn snap_state(&self) -> &SnapState {
        self.drag.snap_state()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn zoom_phase(&self) -> ZoomPhase {
        self.zoom.phase()
    }

    /// Global pointer listeners currently registered by drags.
    pub fn pointer_listeners(&self) -> &PointerListeners {
        &self.listeners
    }

    /// Register the timeline-changed callback.
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.store.unsubscribe(id);
    }

    fn mapper(&self) -> CoordinateMapper {
        self.store.state().mapper(self.store.config())
    }

    /// Send a command to the store. Rejections the editor treats as no-ops
    /// stay silent; anything else lands in the status line.
    fn dispatch(&mut self, command: Command) -> bool {
        let name = command.name();
        match self.store.dispatch(command) {
            Ok(()) => true,
            Err(e) if e.is_noop_rejection() => {
                debug!(command = name, reason = %e, "ignored");
                false
            }
            Err(e) => {
                warn!(command = name, error = %e, "command failed");
                self.status_message = format!("{name} failed: {e}");
                false
            }
        }
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::PointerDown {
                chain,
                position,
                modifiers,
            } => self.pointer_down(resolve_target(&chain), position, modifiers),
            Message::PointerMoved(position) => self.pointer_moved(position),
            Message::PointerUp(position) => self.pointer_up(position),
            Message::Wheel {
                delta,
                anchor_px,
                zoom,
                at,
            } => {
                if zoom {
                    self.zoom.handle_wheel_zoom(delta, anchor_px, at);
                } else {
                    let offset = self.zoom.viewport().offset + delta;
                    self.zoom.set_offset(offset);
                }
                self.sync_viewport();
            }
            Message::KeyPressed(press) => self.key_pressed(press),
            Message::ZoomIn(at) => {
                self.zoom.zoom_in(at);
                self.sync_viewport();
            }
            Message::ZoomOut(at) => {
                self.zoom.zoom_out(at);
                self.sync_viewport();
            }
            Message::SetZoom { level, smooth, at } => {
                self.zoom.set_zoom_level(level, smooth, at);
                self.sync_viewport();
            }
            Message::AnimationFrame(now) => {
                if self.zoom.phase() == ZoomPhase::Animating {
                    self.zoom.tick(now);
                    self.sync_viewport();
                }
            }
            Message::PlaybackTick(dt) => {
                if self.state().is_playing {
                    self.dispatch(Command::AdvancePlayhead(dt.as_secs_f64()));
                }
            }
            Message::AddTrack { name, track_type } => {
                self.dispatch(Command::add_track(name, track_type));
            }
            Message::ToggleGroupCollapsed(group_id) => {
                self.dispatch(Command::ToggleGroupCollapsed(group_id));
            }
            Message::ImportFiles { track_id, paths } => self.import_files(track_id, &paths),
            Message::Teardown => self.teardown(),
        }
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    fn pointer_down(&mut self, target: HitTarget, position: Point, modifiers: Modifiers) {
        self.press_modifiers = modifiers;
        self.range_gesture = None;
        match target {
            HitTarget::Clip { id, zone } => {
                let kind = match zone {
                    ClipZone::Header => Some(DragKind::Move),
                    ClipZone::StartEdge => Some(DragKind::TrimStart),
                    ClipZone::EndEdge => Some(DragKind::TrimEnd),
                    ClipZone::Body => None,
                };
                match kind {
                    Some(kind) => {
                        self.range = None;
                        self.begin_clip_drag(&id, kind, position);
                    }
                    None => self.begin_range_gesture(&id, position, modifiers),
                }
            }
            HitTarget::Group(group_id) => {
                self.range = None;
                self.group_pressed(&group_id, position);
            }
            HitTarget::Button => {}
            HitTarget::Background => {
                self.range = None;
                self.dispatch(Command::ClearSelection);
                let t = self.mapper().pixel_to_time(position.x);
                self.dispatch(Command::SetPlayhead(t));
                let state = self.store.snapshot();
                self.drag.begin_playhead_drag(&state, position);
            }
        }
    }

    fn begin_clip_drag(&mut self, id: &ClipId, kind: DragKind, position: Point) {
        let state = self.store.snapshot();
        if let Err(e) = self.drag.begin_clip_drag(&state, id, kind, position) {
            debug!(error = %e, "drag not started");
        }
    }

    /// A press on a group header selects the group and arms a move of it.
    fn group_pressed(&mut self, group_id: &GroupId, position: Point) {
        if !self.dispatch(Command::SelectGroup(group_id.clone())) {
            return;
        }
        let anchor = self.state().selected_clips.ids().first().cloned();
        if let Some(anchor) = anchor {
            self.begin_clip_drag(&anchor, DragKind::Move, position);
        }
    }

    fn begin_range_gesture(&mut self, clip_id: &ClipId, position: Point, modifiers: Modifiers) {
        let timeline = &self.state().timeline;
        let Some(clip) = timeline.find_clip(clip_id) else {
            return;
        };
        let collapsed_group = clip
            .group_id
            .as_ref()
            .filter(|gid| timeline.group(gid).is_ok_and(|g| g.collapsed));
        let (target, start, duration) = match collapsed_group {
            Some(gid) => match timeline.group_span(gid) {
                Some((start, end)) => (RangeTarget::Group(gid.clone()), start, end - start),
                None => return,
            },
            None => (RangeTarget::Clip(clip_id.clone()), clip.start_time, clip.duration),
        };
        // A range on another target is stale once a different clip is pressed.
        if self.range.as_ref().is_some_and(|r| r.target != target) {
            self.range = None;
        }
        let anchor_offset = (self.mapper().pixel_to_time(position.x) - start).clamp(0.0, duration);
        self.range_gesture = Some(RangeGesture {
            clip_id: clip_id.clone(),
            target,
            target_start: start,
            target_duration: duration,
            origin: position,
            anchor_offset,
            modifiers,
            active: modifiers.shift,
        });
    }

    fn pointer_moved(&mut self, position: Point) {
        if self.drag.is_active() {
            let state = self.store.snapshot();
            let mapper = self.mapper();
            match self.drag.pointer_move(&state, &mapper, position) {
                Some(DragUpdate::Clips(placements)) => {
                    self.dispatch(Command::PlaceClips(placements));
                }
                Some(DragUpdate::Playhead(t)) => {
                    self.dispatch(Command::SetPlayhead(t));
                }
                None => {}
            }
            return;
        }

        let threshold = self.config().range_drag_threshold_px;
        let mapper = self.mapper();
        if let Some(gesture) = &mut self.range_gesture {
            if !gesture.active && (position.x - gesture.origin.x).abs() > threshold {
                gesture.active = true;
            }
            if gesture.active {
                let offset = (mapper.pixel_to_time(position.x) - gesture.target_start)
                    .clamp(0.0, gesture.target_duration);
                self.range = Some(RangeSelection::new(
                    gesture.target.clone(),
                    gesture.anchor_offset,
                    offset,
                ));
            }
        }
    }

    fn pointer_up(&mut self, _position: Point) {
        if self.drag.is_active() {
            match self.drag.pointer_up() {
                DragRelease::Click(DragTarget::Clips { anchor, .. }) => {
                    let toggle = self.press_modifiers.is_command();
                    self.dispatch(Command::SelectClip {
                        clip_id: anchor,
                        toggle,
                    });
                }
                DragRelease::Click(DragTarget::Playhead { .. })
                | DragRelease::Dropped(_)
                | DragRelease::Ignored => {}
            }
            return;
        }

        if let Some(gesture) = self.range_gesture.take() {
            let range_made = gesture.active && self.range.as_ref().is_some_and(|r| r.width() > 0.0);
            if !range_made {
                self.range = None;
                self.dispatch(Command::SelectClip {
                    clip_id: gesture.clip_id,
                    toggle: gesture.modifiers.is_command(),
                });
            }
        }
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    fn key_pressed(&mut self, press: KeyPress) {
        let Some(shortcut) = shortcut_for(&press) else {
            return;
        };
        match shortcut {
            Shortcut::Delete => match self.range.take() {
                Some(range) => {
                    self.dispatch(Command::RangeDelete(range));
                }
                None => {
                    if !self.state().selected_clips.is_empty() {
                        self.dispatch(Command::DeleteSelected);
                    }
                }
            },
            Shortcut::Split => match self.range.take() {
                Some(range) => {
                    self.dispatch(Command::RangeSplit(range));
                }
                None => {
                    self.dispatch(Command::SplitAtPlayhead);
                }
            },
            Shortcut::ToggleGroup => {
                if self.state().has_grouped_selection() {
                    self.dispatch(Command::Ungroup);
                } else {
                    self.dispatch(Command::group());
                }
            }
            Shortcut::TogglePlayback => {
                self.dispatch(Command::TogglePlayback);
            }
            Shortcut::Cancel => {
                self.cancel_drag();
                self.range = None;
                self.range_gesture = None;
                self.dispatch(Command::ClearSelection);
            }
        }
    }

    /// Abort any drag in progress, putting dragged items back.
    fn cancel_drag(&mut self) {
        match self.drag.cancel() {
            Some(DragUpdate::Clips(originals)) => {
                self.dispatch(Command::PlaceClips(originals));
            }
            Some(DragUpdate::Playhead(t)) => {
                self.dispatch(Command::SetPlayhead(t));
            }
            None => {}
        }
    }

    // =========================================================================
    // Zoom, import, teardown
    // =========================================================================

    fn sync_viewport(&mut self) {
        let viewport = self.zoom.viewport();
        self.dispatch(Command::SetViewport {
            zoom: viewport.zoom,
            offset: viewport.offset,
        });
    }

    fn import_files(&mut self, track_id: TrackId, paths: &[PathBuf]) {
        let Some(loader) = self.loader.as_deref_mut() else {
            self.status_message = "No audio loader configured".into();
            return;
        };
        let report = media::load_sources(loader, paths);
        let mut imported = 0;
        for source in report.sources {
            self.library.import(source.clone());
            if self.dispatch(Command::add_clip(track_id.clone(), source)) {
                imported += 1;
            }
        }
        self.status_message = if report.failures.is_empty() {
            format!("Imported {imported} files")
        } else {
            format!("Imported {imported} files, skipped {}", report.failures.len())
        };
    }

    /// Release pointer captures and stop the zoom animation.
    pub fn teardown(&mut self) {
        self.drag.cancel();
        self.range_gesture = None;
        self.zoom.cancel_animation();
    }
}
