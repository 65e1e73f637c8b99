//! Input Control Base
//!
//! State and behavior shared by every form input: the raw value and its
//! string form, interaction flags, title, name, render stage, and the
//! pass-through property bag.
//!
//! # Value and Raw Value
//!
//! The raw value is the single stored value; `value()` is always the raw
//! value run through the control's [`ValueFormatter`]. A patch may assign
//! either one:
//!
//! - `rawValue` is stored as given (and wins if both are present)
//! - `value` alone is parsed into the raw value
//!
//! Both keys are reported in the change set when the raw value changes and
//! its string form changes with it.

use std::fmt;
use std::mem;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::helper::ControlHelper;
use super::painter::Painter;
use super::property::{Changes, Field, Property, PropertyPatch};
use super::RenderStage;
use crate::dom::NodeId;
use crate::error::Result;
use crate::value::{PlainFormatter, ValueFormatter};

/// State class toggled on the main element while the control is disabled.
pub const DISABLED_CLASS: &str = "state-disabled";
/// State class toggled on the main element while the control is read-only.
pub const READONLY_CLASS: &str = "state-readonly";
/// State class toggled on the main element while the control is hidden.
pub const HIDDEN_CLASS: &str = "state-hidden";

/// The shared base embedded by concrete input controls.
pub struct InputControl {
    id: String,
    type_name: &'static str,
    stage: RenderStage,
    main: NodeId,

    raw_value: Value,
    disabled: bool,
    read_only: bool,
    hidden: bool,
    title: Option<String>,
    name: Option<String>,

    /// Properties no control declares, kept in assignment order.
    extras: IndexMap<String, Value>,

    formatter: Arc<dyn ValueFormatter>,
}

impl InputControl {
    pub fn new(type_name: &'static str, id: impl Into<String>, main: NodeId) -> Self {
        Self {
            id: id.into(),
            type_name,
            stage: RenderStage::Initial,
            main,
            raw_value: Value::Null,
            disabled: false,
            read_only: false,
            hidden: false,
            title: None,
            name: None,
            extras: IndexMap::new(),
            formatter: Arc::new(PlainFormatter),
        }
    }

    /// Replace the value formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn ValueFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn main(&self) -> NodeId {
        self.main
    }

    pub(crate) fn set_main(&mut self, main: NodeId) {
        self.main = main;
    }

    pub fn stage(&self) -> RenderStage {
        self.stage
    }

    pub fn is_in_stage(&self, stage: RenderStage) -> bool {
        self.stage == stage
    }

    /// Advance the render stage. Stages never move backwards; returns
    /// whether the stage changed.
    pub fn change_stage(&mut self, stage: RenderStage) -> bool {
        if stage <= self.stage {
            return false;
        }
        self.stage = stage;
        true
    }

    pub fn formatter(&self) -> &dyn ValueFormatter {
        self.formatter.as_ref()
    }

    pub fn raw_value(&self) -> &Value {
        &self.raw_value
    }

    /// The raw value in string form.
    pub fn value(&self) -> String {
        self.formatter.stringify_value(&self.raw_value)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    /// Apply a patch and return what changed.
    pub fn apply(&mut self, patch: PropertyPatch) -> Changes {
        let mut changes = Changes::new();
        let mut value = None;
        let mut raw_value = None;
        let mut rest = Vec::new();

        for property in patch {
            match property {
                Property::Value(v) => value = Some(v),
                Property::RawValue(raw) => raw_value = Some(raw),
                other => rest.push(other),
            }
        }

        let raw_value = raw_value.or_else(|| value.map(|v| self.formatter.parse_value(&v)));
        if let Some(raw_value) = raw_value {
            let old_value = self.value();
            let old_raw = mem::replace(&mut self.raw_value, raw_value);
            changes.record(Field::RawValue.into(), old_raw, self.raw_value.clone());
            let new_value = Value::String(self.value());
            changes.record(Field::Value.into(), Value::String(old_value), new_value);
        }

        for property in rest {
            let key = property.key();
            let (old, new): (Value, Value) = match property {
                Property::Disabled(flag) => {
                    (mem::replace(&mut self.disabled, flag).into(), flag.into())
                }
                Property::ReadOnly(flag) => {
                    (mem::replace(&mut self.read_only, flag).into(), flag.into())
                }
                Property::Hidden(flag) => {
                    (mem::replace(&mut self.hidden, flag).into(), flag.into())
                }
                Property::Title(title) => (
                    mem::replace(&mut self.title, title.clone()).into(),
                    title.into(),
                ),
                Property::Name(name) => (
                    mem::replace(&mut self.name, name.clone()).into(),
                    name.into(),
                ),
                // Inputs without a checked state keep it as plain data.
                Property::Checked(flag) => (
                    self.extras
                        .insert(Field::Checked.key().to_string(), Value::Bool(flag))
                        .unwrap_or(Value::Null),
                    Value::Bool(flag),
                ),
                Property::Extra(name, v) => (
                    self.extras.insert(name, v.clone()).unwrap_or(Value::Null),
                    v,
                ),
                Property::Value(_) | Property::RawValue(_) => continue,
            };
            changes.record(key, old, new);
        }

        changes
    }

    /// Painters every input control inherits.
    pub fn base_painters<S: AsRef<InputControl>>() -> Vec<Painter<S>> {
        vec![
            Painter::new("disabled-state", &[Field::Disabled], paint_disabled_state::<S>),
            Painter::new("readonly-state", &[Field::ReadOnly], paint_readonly_state::<S>),
            Painter::new("hidden-state", &[Field::Hidden], paint_hidden_state::<S>),
        ]
    }
}

impl AsRef<InputControl> for InputControl {
    fn as_ref(&self) -> &InputControl {
        self
    }
}

impl fmt::Debug for InputControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputControl")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .field("stage", &self.stage)
            .field("main", &self.main)
            .field("raw_value", &self.raw_value)
            .field("disabled", &self.disabled)
            .field("read_only", &self.read_only)
            .field("hidden", &self.hidden)
            .field("title", &self.title)
            .field("name", &self.name)
            .field("extras", &self.extras)
            .finish()
    }
}

fn paint_disabled_state<S: AsRef<InputControl>>(state: &S, helper: &ControlHelper) -> Result<()> {
    let input = state.as_ref();
    helper
        .document()
        .toggle_class(input.main(), DISABLED_CLASS, input.is_disabled())
}

fn paint_readonly_state<S: AsRef<InputControl>>(state: &S, helper: &ControlHelper) -> Result<()> {
    let input = state.as_ref();
    helper
        .document()
        .toggle_class(input.main(), READONLY_CLASS, input.is_read_only())
}

fn paint_hidden_state<S: AsRef<InputControl>>(state: &S, helper: &ControlHelper) -> Result<()> {
    let input = state.as_ref();
    helper
        .document()
        .toggle_class(input.main(), HIDDEN_CLASS, input.is_hidden())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PainterSet;
    use crate::dom::Document;
    use serde_json::json;

    struct NumberFormatter;

    impl ValueFormatter for NumberFormatter {
        fn parse_value(&self, value: &str) -> Value {
            value.parse::<i64>().map(Value::from).unwrap_or(Value::Null)
        }
    }

    fn input() -> InputControl {
        InputControl::new("Test", "test", NodeId::new())
    }

    #[test]
    fn value_is_parsed_into_raw_value() {
        let mut control = input();
        let changes = control.apply(PropertyPatch::new().with(Property::Value("yes".into())));

        assert_eq!(control.raw_value(), &json!("yes"));
        assert_eq!(control.value(), "yes");
        assert!(changes.contains(Field::RawValue));
        assert!(changes.contains(Field::Value));
    }

    #[test]
    fn raw_value_wins_over_value() {
        let mut control = input();
        control.apply(
            PropertyPatch::new()
                .with(Property::Value("on".into()))
                .with(Property::RawValue(json!(5))),
        );

        assert_eq!(control.raw_value(), &json!(5));
        assert_eq!(control.value(), "5");
    }

    #[test]
    fn formatter_controls_parsing() {
        let mut control = input().with_formatter(Arc::new(NumberFormatter));
        control.apply(PropertyPatch::new().with(Property::Value("42".into())));

        assert_eq!(control.raw_value(), &json!(42));
        assert_eq!(control.value(), "42");
    }

    #[test]
    fn repeated_assignment_reports_nothing() {
        let mut control = input();
        let patch = PropertyPatch::new()
            .with(Property::Disabled(true))
            .with(Property::Title(Some("Agree".into())))
            .with(Property::Extra("size".into(), json!("large")));

        let first = control.apply(patch.clone());
        assert_eq!(first.len(), 3);

        let second = control.apply(patch);
        assert!(second.is_empty());
    }

    #[test]
    fn extras_pass_through() {
        let mut control = input();
        control.apply(PropertyPatch::new().with(Property::Extra("tabIndex".into(), json!(3))));
        assert_eq!(control.extra("tabIndex"), Some(&json!(3)));
    }

    #[test]
    fn stages_only_move_forward() {
        let mut control = input();
        assert!(control.is_in_stage(RenderStage::Initial));
        assert!(control.change_stage(RenderStage::Rendered));
        assert!(!control.change_stage(RenderStage::Initial));
        assert!(control.is_in_stage(RenderStage::Rendered));
    }

    #[test]
    fn base_painters_toggle_state_classes() {
        let document = Document::new();
        let main = document.create_element("label");
        let helper = ControlHelper::new(document.clone(), "test");
        let mut control = InputControl::new("Test", "test", main);
        let painters = PainterSet::new(InputControl::base_painters::<InputControl>());

        let changes = control.apply(PropertyPatch::new().with(Property::Disabled(true)));
        painters.repaint(&control, &helper, Some(&changes)).unwrap();

        assert!(document.has_class(main, DISABLED_CLASS));
        assert!(!document.has_class(main, READONLY_CLASS));
        assert_eq!(painters.get("readonly-state").unwrap().run_count(), 0);
    }
}
