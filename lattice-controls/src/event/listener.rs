//! Listener types for control and DOM events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Unique identifier for a registered listener.
///
/// Ids are shared between control-level listeners and DOM listeners so a
/// handle from one can never be mistaken for a handle from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered event handler.
///
/// The handler is reference counted so the bus can snapshot its listeners
/// and release its lock before invoking any of them.
pub struct Listener<E> {
    id: ListenerId,
    event: E,
    handler: Arc<dyn Fn(E) + Send + Sync>,
}

impl<E: Copy + PartialEq> Listener<E> {
    /// Create a new listener for the given event.
    pub fn new<F>(event: E, handler: F) -> Self
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        Self {
            id: ListenerId::new(),
            event,
            handler: Arc::new(handler),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether this listener is interested in `event`.
    pub fn listens_to(&self, event: E) -> bool {
        self.event == event
    }

    /// Invoke the handler.
    pub fn notify(&self) {
        (self.handler)(self.event);
    }
}

impl<E: Copy> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            event: self.event,
            handler: Arc::clone(&self.handler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn listener_ids_are_unique() {
        let id1 = ListenerId::new();
        let id2 = ListenerId::new();
        let id3 = ListenerId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn listener_notify_calls_handler() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let listener = Listener::new(1u8, move |_| {
            called_clone.store(true, Ordering::SeqCst);
        });

        assert!(listener.listens_to(1));
        assert!(!listener.listens_to(2));
        assert!(!called.load(Ordering::SeqCst));
        listener.notify();
        assert!(called.load(Ordering::SeqCst));
    }
}
