//! Control Events
//!
//! Controls notify their consumers through a small, typed event bus rather
//! than through the DOM. A control owns one [`EventBus`]; consumers attach
//! handlers with `on` and detach them with the returned [`ListenerId`].
//!
//! # Ordering
//!
//! Handlers run synchronously, in registration order, on the thread that
//! fired the event. The bus never holds its lock while a handler runs, so
//! handlers may register or remove listeners and call back into the control
//! that fired the event.

mod bus;
mod listener;

pub use bus::{ControlEvent, EventBus};
pub use listener::{Listener, ListenerId};
