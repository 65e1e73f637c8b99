//! Document Model
//!
//! Controls render into a [`Document`]: a small element tree with the
//! services a form control needs from its host page.
//!
//! # Overview
//!
//! - Elements are addressed by [`NodeId`] handles and, once they carry an
//!   `id` attribute, by that id through [`Document::get_element_by_id`].
//! - `<input>` elements hold native state (`checked`, `disabled`,
//!   `readOnly`, `value`) separate from their attributes, as browsers do.
//! - Listeners are registered per element and per [`DomEventType`].
//! - [`Document::click`] simulates user interaction, including the
//!   difference between hosts that dispatch native `change` events and
//!   legacy hosts that only dispatch `click`.
//!
//! # Instrumentation
//!
//! Script writes to native properties are counted per element. Repaint
//! tests use the counts to check that only the affected properties were
//! touched.

mod document;
mod node;

pub use document::{DomListener, Document};
pub use node::{DomEvent, DomEventType, Element, NodeId, WriteCounts};
