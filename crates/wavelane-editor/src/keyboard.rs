//! Global keyboard shortcuts.

use crate::message::{Key, KeyPress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Delete/Backspace: the range selection if any, else the selected clips.
    Delete,
    /// Cmd/Ctrl+S: split the range if any, else split at the playhead.
    Split,
    /// Cmd/Ctrl+G: ungroup if the selection has grouped clips, else group.
    ToggleGroup,
    /// Space.
    TogglePlayback,
    /// Escape: cancel drag, clear selection and range.
    Cancel,
}

pub fn shortcut_for(press: &KeyPress) -> Option<Shortcut> {
    if press.text_input_focused {
        return None;
    }
    let command = press.modifiers.is_command();
    match press.key {
        Key::Delete | Key::Backspace => Some(Shortcut::Delete),
        Key::Space => Some(Shortcut::TogglePlayback),
        Key::Escape => Some(Shortcut::Cancel),
        Key::Character(c) if command && c.eq_ignore_ascii_case(&'s') => Some(Shortcut::Split),
        Key::Character(c) if command && c.eq_ignore_ascii_case(&'g') => Some(Shortcut::ToggleGroup),
        Key::Character(_) => None,
    }
}
