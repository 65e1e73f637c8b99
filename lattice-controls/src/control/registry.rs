//! Control Registry
//!
//! The registry maps type names to factories. Applications build one at
//! startup and hand it to whatever instantiates controls from markup or
//! configuration; nothing registers itself implicitly.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use super::Control;
use crate::checkbox::CheckBox;
use crate::dom::Document;
use crate::error::{ControlError, Result};

/// Builds a control from a document and JSON options.
pub type ControlFactory = fn(&Document, Value) -> Result<Box<dyn Control>>;

/// Factory table keyed by control type name.
#[derive(Clone, Default)]
pub struct ControlRegistry {
    factories: IndexMap<&'static str, ControlFactory>,
}

impl ControlRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every control this crate provides.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(CheckBox::TYPE, create_checkbox);
        registry
    }

    /// Register a factory. Returns the factory it replaced, if any.
    pub fn register(
        &mut self,
        type_name: &'static str,
        factory: ControlFactory,
    ) -> Option<ControlFactory> {
        tracing::debug!(type_name, "registering control type");
        self.factories.insert(type_name, factory)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Instantiate a control of `type_name`.
    pub fn create(
        &self,
        type_name: &str,
        document: &Document,
        options: Value,
    ) -> Result<Box<dyn Control>> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| ControlError::UnknownControlType(type_name.to_string()))?;
        factory(document, options)
    }
}

fn create_checkbox(document: &Document, options: Value) -> Result<Box<dyn Control>> {
    let checkbox = CheckBox::from_value(document, options)?;
    Ok(Box::new(checkbox))
}

impl fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{Category, RenderStage};
    use serde_json::json;

    #[test]
    fn builtin_registry_creates_checkboxes() {
        let registry = ControlRegistry::with_builtin();
        assert!(registry.contains("CheckBox"));

        let document = Document::new();
        let control = registry
            .create("CheckBox", &document, json!({ "value": "x", "datasource": "x" }))
            .unwrap();

        assert_eq!(control.type_name(), "CheckBox");
        assert_eq!(control.category(), Category::Check);
        assert_eq!(control.stage(), RenderStage::Initial);
    }

    #[test]
    fn unknown_types_are_errors() {
        let registry = ControlRegistry::new();
        let result = registry.create("Slider", &Document::new(), json!({}));
        assert!(matches!(result, Err(ControlError::UnknownControlType(name)) if name == "Slider"));
    }

    #[test]
    fn register_replaces_existing_factory() {
        let mut registry = ControlRegistry::with_builtin();
        let previous = registry.register(CheckBox::TYPE, create_checkbox);
        assert!(previous.is_some());
        assert_eq!(registry.type_names().collect::<Vec<_>>(), vec!["CheckBox"]);
    }
}
