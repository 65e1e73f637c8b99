//! Control Framework
//!
//! This module defines the contract every control implements and the shared
//! machinery controls are built from.
//!
//! # Lifecycle
//!
//! 1. A control is constructed with its options. The main element is
//!    created (or adopted from host markup) and the options are applied.
//!
//! 2. [`Control::render`] builds the control's structure once, moves the
//!    control to [`RenderStage::Rendered`] and runs a full repaint. The move
//!    is one-way.
//!
//! 3. Every later [`Control::set_properties`] call returns the [`Changes`] it
//!    made and, once rendered, repaints only what those changes affect.
//!
//! 4. [`Control::dispose`] detaches the control's DOM listeners.
//!
//! # Composition
//!
//! Concrete controls embed an [`InputControl`] for the generic property
//! plumbing and compose its painters with their own in a [`PainterSet`].

mod helper;
mod input;
mod painter;
mod property;
mod registry;

pub use helper::{next_control_id, ControlHelper};
pub use input::{InputControl, DISABLED_CLASS, HIDDEN_CLASS, READONLY_CLASS};
pub use painter::{PaintFn, Painter, PainterSet};
pub use property::{Change, Changes, Field, Property, PropertyKey, PropertyPatch};
pub use registry::{ControlFactory, ControlRegistry};

use serde_json::Value;

use crate::dom::{Document, NodeId};
use crate::error::Result;

/// Where a control is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderStage {
    /// Options applied, no structure built yet. Reads come from the model.
    Initial,
    /// Structure built. The rendered element is the source of truth.
    Rendered,
}

/// Broad classification of controls, used by forms to decide how a
/// control's value is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Not a form input.
    Control,
    /// A value input.
    Input,
    /// A checkable input; contributes its value only while checked.
    Check,
}

/// The contract between a control and the framework.
pub trait Control: Send + Sync {
    /// Registered type name, e.g. `"CheckBox"`.
    fn type_name(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Create the element the control renders into when the host supplied
    /// none, or when host markup has to be replaced.
    fn create_main(&self, document: &Document) -> NodeId;

    /// Apply construction options given as a JSON object.
    fn init_options(&self, options: Value) -> Result<()>;

    /// Build the control's structure. Called once, by [`render`](Self::render).
    fn init_structure(&self) -> Result<()>;

    /// Apply a partial update and return the properties that changed.
    fn set_properties(&self, patch: PropertyPatch) -> Result<Changes>;

    /// Repaint the properties in `changes`, or everything when `None`.
    fn repaint(&self, changes: Option<&Changes>) -> Result<()>;

    /// The element that should receive focus.
    fn focus_target(&self) -> Option<NodeId>;

    fn main(&self) -> NodeId;

    fn stage(&self) -> RenderStage;

    /// Advance the render stage.
    fn change_stage(&self, stage: RenderStage);

    /// Detach everything the control registered with its document.
    fn dispose(&self);

    /// Build the structure on first call, then paint everything.
    ///
    /// The stage advances as soon as the structure exists, so a failed
    /// paint can be retried with another `render`.
    fn render(&self) -> Result<()> {
        if self.stage() == RenderStage::Initial {
            self.init_structure()?;
            self.change_stage(RenderStage::Rendered);
        }
        self.repaint(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControlError;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// A control whose first paint fails.
    struct FlakyPaint {
        main: NodeId,
        stage: Mutex<RenderStage>,
        built: AtomicUsize,
        fail_next_paint: AtomicBool,
    }

    impl FlakyPaint {
        fn new(document: &Document) -> Self {
            Self {
                main: document.create_element("div"),
                stage: Mutex::new(RenderStage::Initial),
                built: AtomicUsize::new(0),
                fail_next_paint: AtomicBool::new(true),
            }
        }
    }

    impl Control for FlakyPaint {
        fn type_name(&self) -> &'static str {
            "FlakyPaint"
        }

        fn category(&self) -> Category {
            Category::Control
        }

        fn create_main(&self, document: &Document) -> NodeId {
            document.create_element("div")
        }

        fn init_options(&self, _options: Value) -> Result<()> {
            Ok(())
        }

        fn init_structure(&self) -> Result<()> {
            if self.built.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(ControlError::AlreadyRendered("flaky".into()));
            }
            Ok(())
        }

        fn set_properties(&self, _patch: PropertyPatch) -> Result<Changes> {
            Ok(Changes::new())
        }

        fn repaint(&self, _changes: Option<&Changes>) -> Result<()> {
            if self.fail_next_paint.swap(false, Ordering::SeqCst) {
                return Err(ControlError::ElementNotFound("ctrl-flaky-box".into()));
            }
            Ok(())
        }

        fn focus_target(&self) -> Option<NodeId> {
            None
        }

        fn main(&self) -> NodeId {
            self.main
        }

        fn stage(&self) -> RenderStage {
            *self.stage.lock()
        }

        fn change_stage(&self, stage: RenderStage) {
            let mut current = self.stage.lock();
            if stage > *current {
                *current = stage;
            }
        }

        fn dispose(&self) {}
    }

    #[test]
    fn failed_first_paint_can_be_retried() {
        let control = FlakyPaint::new(&Document::new());

        assert!(control.render().is_err());
        assert_eq!(control.stage(), RenderStage::Rendered);

        control.render().unwrap();
        assert_eq!(control.built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stages_are_ordered() {
        assert!(RenderStage::Initial < RenderStage::Rendered);
    }
}
