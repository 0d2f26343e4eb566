//! Message builders for driving an [`Editor`](crate::editor::Editor) from
//! integration tests.

use wavelane_core::drag::Point;
use wavelane_core::selection::{ClipZone, TargetMarker};
use wavelane_core::timeline::{ClipId, GroupId};

use crate::message::{Key, KeyPress, Message, Modifiers};

/// Target chain for a press inside a clip's `zone`, innermost first.
pub fn clip_chain(clip_id: &str, zone: ClipZone) -> Vec<TargetMarker> {
    vec![
        TargetMarker::Element,
        TargetMarker::Clip {
            id: ClipId::from(clip_id),
            zone,
        },
    ]
}

pub fn press_clip(clip_id: &str, zone: ClipZone, x: f64) -> Message {
    press_clip_with(clip_id, zone, x, Modifiers::NONE)
}

pub fn press_clip_with(clip_id: &str, zone: ClipZone, x: f64, modifiers: Modifiers) -> Message {
    Message::PointerDown {
        chain: clip_chain(clip_id, zone),
        position: Point::new(x, 20.0),
        modifiers,
    }
}

pub fn press_group(group_id: &str, x: f64) -> Message {
    Message::PointerDown {
        chain: vec![TargetMarker::Group {
            id: GroupId::from(group_id),
        }],
        position: Point::new(x, 10.0),
        modifiers: Modifiers::NONE,
    }
}

pub fn press_background(x: f64) -> Message {
    Message::PointerDown {
        chain: Vec::new(),
        position: Point::new(x, 40.0),
        modifiers: Modifiers::NONE,
    }
}

pub fn move_to(x: f64) -> Message {
    Message::PointerMoved(Point::new(x, 20.0))
}

pub fn release_at(x: f64) -> Message {
    Message::PointerUp(Point::new(x, 20.0))
}

pub fn key(key: Key) -> Message {
    Message::KeyPressed(KeyPress::new(key, Modifiers::NONE))
}

pub fn command_key(c: char) -> Message {
    Message::KeyPressed(KeyPress::new(Key::Character(c), Modifiers::command()))
}
