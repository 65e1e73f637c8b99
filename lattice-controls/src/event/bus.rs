//! Event bus owned by each control.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::listener::{Listener, ListenerId};

/// Events a control emits to its consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEvent {
    /// The user clicked the control, whatever the resulting state.
    Click,
    /// The checked state changed, from any cause.
    Change,
}

impl ControlEvent {
    pub fn name(self) -> &'static str {
        match self {
            ControlEvent::Click => "click",
            ControlEvent::Change => "change",
        }
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Listener registry for control events.
///
/// Cloning the bus shares the underlying registry.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<RwLock<Vec<Listener<ControlEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `event`.
    pub fn on<F>(&self, event: ControlEvent, handler: F) -> ListenerId
    where
        F: Fn(ControlEvent) + Send + Sync + 'static,
    {
        let listener = Listener::new(event, handler);
        let id = listener.id();
        self.listeners.write().push(listener);
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|listener| listener.id() != id);
        listeners.len() != before
    }

    /// Notify every handler registered for `event`.
    ///
    /// Returns the number of handlers invoked.
    pub fn fire(&self, event: ControlEvent) -> usize {
        let matching: Vec<_> = self
            .listeners
            .read()
            .iter()
            .filter(|listener| listener.listens_to(event))
            .cloned()
            .collect();

        tracing::trace!(%event, listeners = matching.len(), "firing control event");

        for listener in &matching {
            listener.notify();
        }
        matching.len()
    }

    pub fn listener_count(&self, event: ControlEvent) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|listener| listener.listens_to(event))
            .count()
    }

    /// Drop every handler.
    pub fn clear(&self) {
        self.listeners.write().clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("click_listeners", &self.listener_count(ControlEvent::Click))
            .field("change_listeners", &self.listener_count(ControlEvent::Change))
            .finish()
    }
}
