//! The single owner of committed timeline state.

use std::sync::Arc;

use tracing::debug;

use crate::commands::{self, Command, StateSummary};
use crate::config::EditorConfig;
use crate::error::Result;
use crate::state::TimelineState;
use crate::timeline::Timeline;
use crate::validate;

/// Called with every committed snapshot.
pub type Listener = Box<dyn FnMut(&Arc<TimelineState>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

/// Holds the current [`TimelineState`] and replaces it wholesale on every
/// successful command. Readers holding an older snapshot keep seeing it
/// unchanged.
pub struct TimelineStore {
    config: EditorConfig,
    state: Arc<TimelineState>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: usize,
}

impl std::fmt::Debug for TimelineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineStore")
            .field("state", &StateSummary::from(self.state.as_ref()))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TimelineStore {
    /// An empty timeline. The config is validated first.
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let state = TimelineState::new(&config);
        Ok(Self {
            config,
            state: Arc::new(state),
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    /// Start from an existing timeline. An invalid config or broken
    /// references are rejected.
    pub fn with_timeline(config: EditorConfig, timeline: Timeline) -> Result<Self> {
        config.validate()?;
        validate::check_structure(&timeline)?;
        validate::log_warnings(&validate::collect_warnings(&timeline));
        let state = TimelineState::with_timeline(&config, timeline);
        Ok(Self {
            config,
            state: Arc::new(state),
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    /// A cheap handle on the current snapshot.
    pub fn snapshot(&self) -> Arc<TimelineState> {
        Arc::clone(&self.state)
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    /// Apply `command`. On success the new snapshot is committed, layout
    /// warnings are logged and listeners are notified. On error the current
    /// snapshot is left exactly as it was.
    pub fn dispatch(&mut self, command: Command) -> Result<()> {
        let next = match commands::reduce(&self.state, &command, &self.config) {
            Ok(next) => next,
            Err(e) => {
                debug!(command = command.name(), error = %e, "command rejected");
                return Err(e);
            }
        };
        if next == *self.state {
            return Ok(());
        }
        validate::log_warnings(&validate::collect_warnings(&next.timeline));
        self.state = Arc::new(next);
        debug!(command = command.name(), summary = ?StateSummary::from(self.state.as_ref()), "committed");
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        let snapshot = Arc::clone(&self.state);
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }
}
