//! Lattice Controls
//!
//! This crate provides form controls for the Lattice UI framework.
//! It implements:
//!
//! - A checkable input control (`CheckBox`)
//! - Declarative, diff-based repainting (painter sets)
//! - Two-way synchronization between control state and the rendered element
//! - The framework services the controls consume (document, helper, registry)
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `dom`: In-memory document the controls render into
//! - `event`: Listener bookkeeping for control-level events
//! - `control`: The `Control` contract, the shared input-control base,
//!   painters and the control registry
//! - `checkbox`: The checkbox control itself
//!
//! # Example
//!
//! ```rust,ignore
//! use lattice_controls::{CheckBox, CheckBoxOptions, ControlEvent, Document};
//! use serde_json::json;
//!
//! let document = Document::new();
//! let options = CheckBoxOptions::new()
//!     .value("x")
//!     .datasource(json!([{ "value": "x" }, { "value": "y" }]));
//!
//! let checkbox = CheckBox::new(&document, options)?;
//! checkbox.on(ControlEvent::Change, |_| println!("toggled"));
//! checkbox.render()?;
//!
//! assert!(checkbox.is_checked());
//! ```

pub mod checkbox;
pub mod control;
pub mod dom;
pub mod error;
pub mod event;
pub mod options;
pub mod value;

pub use checkbox::{CheckBox, CheckBoxState};
pub use control::{
    Category, Change, Changes, Control, ControlHelper, ControlRegistry, Field, InputControl,
    Painter, PainterSet, Property, PropertyKey, PropertyPatch, RenderStage,
};
pub use dom::{DomEvent, DomEventType, Document, NodeId, WriteCounts};
pub use error::{ControlError, Result};
pub use event::{ControlEvent, EventBus, ListenerId};
pub use options::CheckBoxOptions;
pub use value::{loose_eq, PlainFormatter, ValueFormatter, DEFAULT_VALUE};
