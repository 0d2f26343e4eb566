use std::path::PathBuf;
use std::time::{Duration, Instant};

use wavelane_core::drag::Point;
use wavelane_core::selection::TargetMarker;
use wavelane_core::timeline::{GroupId, TrackId, TrackType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
        alt: false,
    };

    pub fn command() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    /// Cmd on macOS, Ctrl elsewhere; either is accepted.
    pub fn is_command(&self) -> bool {
        self.meta || self.ctrl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Space,
    Escape,
    Character(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Set when an unrelated text field has focus; shortcuts stay silent.
    pub text_input_focused: bool,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            text_input_focused: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Pointer
    PointerDown {
        /// Event target chain, innermost element first.
        chain: Vec<TargetMarker>,
        position: Point,
        modifiers: Modifiers,
    },
    PointerMoved(Point),
    PointerUp(Point),
    /// Wheel over the timeline. With `zoom` set the wheel zooms around
    /// `anchor_px`, otherwise it scrolls horizontally by `delta` pixels.
    Wheel {
        delta: f64,
        anchor_px: Option<f64>,
        zoom: bool,
        at: Instant,
    },

    // Keyboard
    KeyPressed(KeyPress),

    // Zoom. Every zoom message carries the host's clock reading so a
    // recorded message stream replays to the same viewport.
    ZoomIn(Instant),
    ZoomOut(Instant),
    SetZoom { level: f64, smooth: bool, at: Instant },
    AnimationFrame(Instant),

    // Playback
    PlaybackTick(Duration),

    // Tracks, groups, import
    AddTrack { name: String, track_type: TrackType },
    ToggleGroupCollapsed(GroupId),
    ImportFiles { track_id: TrackId, paths: Vec<PathBuf> },

    /// Component is going away: release captures and stop animations.
    Teardown,
}
