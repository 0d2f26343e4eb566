//! Timeline editing engine for a multi-track audio editor.

pub mod commands;
pub mod config;
pub mod coords;
pub mod drag;
pub mod error;
pub mod media;
pub mod ops;
pub mod palette;
pub mod selection;
pub mod snap;
pub mod state;
pub mod store;
pub mod timeline;
pub mod validate;
pub mod zoom;
