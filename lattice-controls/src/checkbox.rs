//! CheckBox Implementation
//!
//! A checkable input. The control keeps an abstract `checked` flag and a raw
//! value, renders them into a native checkbox plus a text label, and keeps
//! the two in sync in both directions.
//!
//! # Source of Truth
//!
//! Before rendering, [`CheckBox::is_checked`] reads the model. Once rendered
//! it reads the native checkbox, which is what the user last touched.
//!
//! # Initial State From a Datasource
//!
//! Construction options may carry a `datasource`, consumed once and never
//! stored:
//!
//! - a list of records: checked if any record's `value` loosely equals the
//!   control's value
//! - any other value: checked if it loosely equals the control's raw value
//!
//! See [`loose_eq`](crate::value::loose_eq) for the comparison rules.
//!
//! # Synchronization
//!
//! A click on the native box always emits [`ControlEvent::Click`]. The new
//! checked flag is then copied back into the model through
//! [`CheckBox::set_properties`], either from the native `change` event or,
//! on documents without change events, straight from the click handler.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde_json::Value;

use crate::control::{
    next_control_id, Category, Changes, Control, ControlHelper, Field, InputControl, Painter,
    PainterSet, Property, PropertyPatch, RenderStage,
};
use crate::dom::{DomEventType, Document, NodeId};
use crate::error::{ControlError, Result};
use crate::event::{ControlEvent, EventBus, ListenerId};
use crate::options::CheckBoxOptions;
use crate::value::{loose_eq, PlainFormatter, ValueFormatter, DEFAULT_VALUE};

/// Model state of a checkbox.
#[derive(Debug)]
pub struct CheckBoxState {
    input: InputControl,
    checked: bool,

    /// Id of the native checkbox, assigned when the structure is built.
    box_id: Option<String>,
}

impl CheckBoxState {
    fn new(input: InputControl) -> Self {
        Self {
            input,
            checked: false,
            box_id: None,
        }
    }

    pub fn input(&self) -> &InputControl {
        &self.input
    }

    /// The model's checked flag. Not authoritative once rendered.
    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn box_id(&self) -> Option<&str> {
        self.box_id.as_deref()
    }

    /// Apply a patch, handling `checked` here and the rest in the base.
    fn apply(&mut self, patch: PropertyPatch) -> Changes {
        let mut checked = None;
        let rest: PropertyPatch = patch
            .into_iter()
            .filter_map(|property| match property {
                Property::Checked(flag) => {
                    checked = Some(flag);
                    None
                }
                other => Some(other),
            })
            .collect();

        let mut changes = self.input.apply(rest);
        if let Some(flag) = checked {
            let old = std::mem::replace(&mut self.checked, flag);
            changes.record(Field::Checked.into(), Value::Bool(old), Value::Bool(flag));
        }
        changes
    }

    /// Decide the initial checked state from a datasource.
    ///
    /// Returns `true` if the datasource selected the box.
    fn resolve_datasource(&mut self, datasource: &Value) -> bool {
        match datasource {
            Value::Null => {}
            Value::Array(records) => {
                let value = Value::String(self.input.value());
                self.checked = records
                    .iter()
                    .any(|record| record.get("value").is_some_and(|v| loose_eq(v, &value)));
            }
            scalar => {
                if loose_eq(self.input.raw_value(), scalar) {
                    self.checked = true;
                }
            }
        }
        self.checked
    }

    /// The label text: explicit title, then the host's title attribute,
    /// then the value unless it is the default.
    pub fn resolve_title(&self, host_title: Option<&str>) -> String {
        if let Some(title) = self.input.title().filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        if let Some(title) = host_title.filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        let value = self.input.value();
        if value == DEFAULT_VALUE {
            String::new()
        } else {
            value
        }
    }

    fn box_node(&self, helper: &ControlHelper) -> Result<NodeId> {
        let id = self
            .box_id
            .as_deref()
            .ok_or_else(|| ControlError::ElementNotFound(helper.get_id(Some("box"))))?;
        helper
            .document()
            .get_element_by_id(id)
            .ok_or_else(|| ControlError::ElementNotFound(id.to_string()))
    }
}

impl AsRef<InputControl> for CheckBoxState {
    fn as_ref(&self) -> &InputControl {
        &self.input
    }
}

fn paint_value_and_checked(state: &CheckBoxState, helper: &ControlHelper) -> Result<()> {
    let value = state.input.formatter().stringify_value(state.input.raw_value());
    let node = state.box_node(helper)?;
    let document = helper.document();
    document.set_value(node, &value)?;
    document.set_checked(node, state.checked)
}

fn paint_interaction(state: &CheckBoxState, helper: &ControlHelper) -> Result<()> {
    let node = state.box_node(helper)?;
    let document = helper.document();
    document.set_disabled(node, state.input.is_disabled())?;
    document.set_read_only(node, state.input.is_read_only())
}

fn paint_title(state: &CheckBoxState, helper: &ControlHelper) -> Result<()> {
    let document = helper.document();
    let host_title = document.attribute(state.input.main(), "title");
    let title = state.resolve_title(host_title.as_deref());

    let text = helper.get_part("text")?;
    document.set_inner_html(text, &ControlHelper::escape_html(&title))?;
    document.set_attribute(state.box_node(helper)?, "title", &title)
}

fn painters() -> PainterSet<CheckBoxState> {
    PainterSet::compose(
        InputControl::base_painters(),
        vec![
            Painter::new("value", &[Field::RawValue, Field::Checked], paint_value_and_checked),
            Painter::new("interaction", &[Field::Disabled, Field::ReadOnly], paint_interaction),
            Painter::new("title", &[Field::Title], paint_title),
        ],
    )
}

struct Shared {
    state: RwLock<CheckBoxState>,
    helper: ControlHelper,
    events: EventBus,
    painters: PainterSet<CheckBoxState>,
}

/// A checkbox control.
///
/// `CheckBox` is a cheap handle; clones refer to the same control.
#[derive(Clone)]
pub struct CheckBox {
    shared: Arc<Shared>,
}

impl CheckBox {
    pub const TYPE: &'static str = "CheckBox";

    /// Create a checkbox and apply `options`.
    ///
    /// If `options.main` names an element in `document`, that element is
    /// adopted as host markup; otherwise a fresh `<label>` is created.
    pub fn new(document: &Document, options: CheckBoxOptions) -> Result<Self> {
        Self::with_formatter(document, options, Arc::new(PlainFormatter))
    }

    /// Create a checkbox whose value is converted by `formatter`.
    ///
    /// The formatter decides the string written to the native box and the
    /// string a list datasource is compared against.
    pub fn with_formatter(
        document: &Document,
        mut options: CheckBoxOptions,
        formatter: Arc<dyn ValueFormatter>,
    ) -> Result<Self> {
        let id = options
            .id
            .take()
            .unwrap_or_else(|| next_control_id(Self::TYPE));
        let helper = ControlHelper::new(document.clone(), id.clone());

        let main = match options.main.take() {
            Some(host) => document
                .get_element_by_id(&host)
                .ok_or(ControlError::ElementNotFound(host))?,
            None => create_label(document),
        };

        let checkbox = Self {
            shared: Arc::new(Shared {
                state: RwLock::new(CheckBoxState::new(
                    InputControl::new(Self::TYPE, id, main).with_formatter(formatter),
                )),
                helper,
                events: EventBus::new(),
                painters: painters(),
            }),
        };
        checkbox.apply_options(options)?;
        Ok(checkbox)
    }

    /// Create a checkbox from JSON options.
    pub fn from_value(document: &Document, options: Value) -> Result<Self> {
        Self::new(document, CheckBoxOptions::from_value(options)?)
    }

    fn apply_options(&self, options: CheckBoxOptions) -> Result<()> {
        let document = self.shared.helper.document();
        let main = self.main();
        let host_name = document.attribute(main, "name").filter(|n| !n.is_empty());

        // The base setter settles value/rawValue precedence, so the
        // datasource must be compared only after it ran.
        let (datasource, patch) = options.into_patch(host_name);
        self.set_properties(patch)?;

        let mut state = self.shared.state.write();
        if let Some(datasource) = datasource {
            let checked = state.resolve_datasource(&datasource);
            tracing::debug!(control = %state.input.id(), checked, "resolved datasource");
        }

        if state.input.title().map_or(true, str::is_empty) {
            let host_title = document.attribute(main, "title");
            let title = state.resolve_title(host_title.as_deref());
            state.input.set_title(title);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Public API
    // ------------------------------------------------------------------

    /// Set the checked state.
    pub fn set_checked(&self, checked: bool) -> Result<()> {
        self.set_properties(PropertyPatch::checked(checked)).map(|_| ())
    }

    /// The checked state: the native box once rendered, the model before.
    pub fn is_checked(&self) -> bool {
        let state = self.shared.state.read();
        if state.input.is_in_stage(RenderStage::Rendered) {
            if let Ok(node) = state.box_node(&self.shared.helper) {
                return self.shared.helper.document().is_checked(node);
            }
        }
        state.checked
    }

    /// Listen for a control event.
    pub fn on<F>(&self, event: ControlEvent, handler: F) -> ListenerId
    where
        F: Fn(ControlEvent) + Send + Sync + 'static,
    {
        self.shared.events.on(event, handler)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.shared.events.off(id)
    }

    pub fn id(&self) -> String {
        self.shared.state.read().input.id().to_string()
    }

    pub fn value(&self) -> String {
        self.shared.state.read().input.value()
    }

    pub fn raw_value(&self) -> Value {
        self.shared.state.read().input.raw_value().clone()
    }

    pub fn title(&self) -> String {
        self.shared
            .state
            .read()
            .input
            .title()
            .unwrap_or_default()
            .to_string()
    }

    pub fn name(&self) -> Option<String> {
        self.shared.state.read().input.name().map(str::to_string)
    }

    pub fn is_disabled(&self) -> bool {
        self.shared.state.read().input.is_disabled()
    }

    pub fn is_read_only(&self) -> bool {
        self.shared.state.read().input.is_read_only()
    }

    pub fn box_id(&self) -> Option<String> {
        self.shared.state.read().box_id.clone()
    }

    pub fn document(&self) -> &Document {
        self.shared.helper.document()
    }

    pub fn helper(&self) -> &ControlHelper {
        &self.shared.helper
    }

    /// Painter table, for inspecting run counts.
    pub fn painters(&self) -> &PainterSet<CheckBoxState> {
        &self.shared.painters
    }

    /// Read the native checked flag back into the model.
    fn sync_checked(&self) -> Result<()> {
        let node = {
            let state = self.shared.state.read();
            state.box_node(&self.shared.helper)?
        };
        let checked = self.shared.helper.document().is_checked(node);
        tracing::debug!(
            control = %self.shared.helper.control_id(),
            checked,
            "syncing checked state"
        );
        self.set_checked(checked)
    }

    fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    fn upgrade(shared: &Weak<Shared>) -> Option<Self> {
        shared.upgrade().map(|shared| Self { shared })
    }
}

fn create_label(document: &Document) -> NodeId {
    document.create_element("label")
}

impl Control for CheckBox {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn category(&self) -> Category {
        Category::Check
    }

    fn create_main(&self, document: &Document) -> NodeId {
        create_label(document)
    }

    fn init_options(&self, options: Value) -> Result<()> {
        self.apply_options(CheckBoxOptions::from_value(options)?)
    }

    fn init_structure(&self) -> Result<()> {
        let helper = &self.shared.helper;
        let document = helper.document();
        let mut state = self.shared.state.write();
        if state.box_id.is_some() {
            return Err(ControlError::AlreadyRendered(state.input.id().to_string()));
        }

        let host = state.input.main();
        let box_id = if document.tag_name(host).as_deref() == Some("input") {
            // Host markup is a bare <input>: keep its id on the new box and
            // wrap it in a fresh main element.
            let box_id = document
                .attribute(host, "id")
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| helper.get_id(Some("box")));
            let main = self.create_main(document);
            helper.replace_main(host, main)?;
            document.set_attribute(main, "id", &helper.get_id(None))?;
            state.input.set_main(main);
            box_id
        } else {
            if document.attribute(host, "id").map_or(true, |id| id.is_empty()) {
                document.set_attribute(host, "id", &helper.get_id(None))?;
            }
            helper.get_id(Some("box"))
        };

        let checkbox = document.create_element("input");
        document.set_attribute(checkbox, "type", "checkbox")?;
        if let Some(name) = state.input.name() {
            document.set_attribute(checkbox, "name", name)?;
        }
        document.set_attribute(checkbox, "id", &box_id)?;

        let text = document.create_element("span");
        document.set_attribute(text, "id", &helper.get_id(Some("text")))?;

        document.replace_children(state.input.main(), &[checkbox, text])?;
        state.box_id = Some(box_id.clone());
        drop(state);

        let change_events = document.supports_change_events();
        let weak = self.downgrade();
        helper.add_dom_event(checkbox, DomEventType::Click, move |_| {
            let Some(control) = CheckBox::upgrade(&weak) else {
                return;
            };
            control.shared.events.fire(ControlEvent::Click);
            if !change_events {
                if let Err(error) = control.sync_checked() {
                    tracing::warn!(%error, "checkbox sync failed");
                }
            }
        })?;

        if change_events {
            let weak = self.downgrade();
            helper.add_dom_event(checkbox, DomEventType::Change, move |_| {
                let Some(control) = CheckBox::upgrade(&weak) else {
                    return;
                };
                if let Err(error) = control.sync_checked() {
                    tracing::warn!(%error, "checkbox sync failed");
                }
            })?;
        }

        tracing::debug!(
            control = %helper.control_id(),
            %box_id,
            change_events,
            "built checkbox structure"
        );
        Ok(())
    }

    /// Apply `patch`, repaint if rendered, and emit `change` if the checked
    /// state moved.
    fn set_properties(&self, patch: PropertyPatch) -> Result<Changes> {
        let (changes, rendered) = {
            let mut state = self.shared.state.write();
            let changes = state.apply(patch);
            (changes, state.input.is_in_stage(RenderStage::Rendered))
        };
        if changes.is_empty() {
            return Ok(changes);
        }

        if rendered {
            self.repaint(Some(&changes))?;
        }
        if changes.contains(Field::Checked) {
            self.shared.events.fire(ControlEvent::Change);
        }
        Ok(changes)
    }

    fn repaint(&self, changes: Option<&Changes>) -> Result<()> {
        let state = self.shared.state.read();
        self.shared
            .painters
            .repaint(&state, &self.shared.helper, changes)
            .map(|_| ())
    }

    fn focus_target(&self) -> Option<NodeId> {
        let state = self.shared.state.read();
        state.box_node(&self.shared.helper).ok()
    }

    fn main(&self) -> NodeId {
        self.shared.state.read().input.main()
    }

    fn stage(&self) -> RenderStage {
        self.shared.state.read().input.stage()
    }

    fn change_stage(&self, stage: RenderStage) {
        self.shared.state.write().input.change_stage(stage);
    }

    fn dispose(&self) {
        let removed = self.shared.helper.clear_dom_events();
        self.shared.events.clear();
        tracing::debug!(control = %self.shared.helper.control_id(), removed, "disposed");
    }
}

impl fmt::Debug for CheckBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckBox")
            .field("state", &*self.shared.state.read())
            .field("events", &self.shared.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn checkbox(options: CheckBoxOptions) -> CheckBox {
        CheckBox::new(&Document::new(), options).unwrap()
    }

    #[test]
    fn defaults() {
        let cb = checkbox(CheckBoxOptions::new());
        assert_eq!(cb.value(), "on");
        assert!(!cb.is_checked());
        assert_eq!(cb.title(), "");
        assert_eq!(cb.category(), Category::Check);
    }

    #[test]
    fn explicit_checked_option() {
        assert!(checkbox(CheckBoxOptions::new().checked(true)).is_checked());
    }

    #[test]
    fn list_datasource_matches_on_value() {
        let cb = checkbox(
            CheckBoxOptions::new()
                .value("x")
                .datasource(json!([{ "value": "x" }, { "value": "y" }])),
        );
        assert!(cb.is_checked());

        let cb = checkbox(CheckBoxOptions::new().value("z").datasource(json!([{ "value": "x" }])));
        assert!(!cb.is_checked());
    }

    #[test]
    fn list_datasource_overrides_checked_option() {
        let cb = checkbox(
            CheckBoxOptions::new()
                .value("z")
                .checked(true)
                .datasource(json!([{ "value": "x" }])),
        );
        assert!(!cb.is_checked());
    }

    #[test]
    fn list_datasource_compares_loosely() {
        let cb = checkbox(CheckBoxOptions::new().value("1").datasource(json!([{ "value": 1 }])));
        assert!(cb.is_checked());
    }

    #[test]
    fn malformed_records_never_match() {
        let cb = checkbox(
            CheckBoxOptions::new()
                .value("x")
                .datasource(json!(["x", 5, null, { "label": "x" }])),
        );
        assert!(!cb.is_checked());
    }

    #[test]
    fn scalar_datasource_matches_on_raw_value() {
        let cb = checkbox(CheckBoxOptions::new().raw_value(3).datasource("3"));
        assert!(cb.is_checked());

        let cb = checkbox(CheckBoxOptions::new().raw_value(3).datasource(4));
        assert!(!cb.is_checked());
    }

    #[test]
    fn datasource_is_not_stored() {
        let cb = checkbox(CheckBoxOptions::new().datasource("on"));
        let state = cb.shared.state.read();
        assert!(state.input().extra("datasource").is_none());
    }

    #[test]
    fn title_falls_back_to_value() {
        assert_eq!(checkbox(CheckBoxOptions::new().value("yes")).title(), "yes");
        assert_eq!(checkbox(CheckBoxOptions::new().value("on")).title(), "");
        assert_eq!(
            checkbox(CheckBoxOptions::new().value("yes").title("Agree")).title(),
            "Agree"
        );
    }

    #[test]
    fn title_falls_back_to_host_title() {
        let document = Document::new();
        let host = document.create_element("input");
        document.set_attribute(host, "id", "agree").unwrap();
        document.set_attribute(host, "title", "I agree").unwrap();
        document.set_attribute(host, "name", "terms").unwrap();

        let options = CheckBoxOptions::new().main("agree").value("yes");
        let cb = CheckBox::new(&document, options).unwrap();
        assert_eq!(cb.title(), "I agree");
        assert_eq!(cb.name().as_deref(), Some("terms"));
    }

    #[test]
    fn set_properties_reports_changed_keys_only() {
        let cb = checkbox(CheckBoxOptions::new());

        let changes = cb
            .set_properties(
                PropertyPatch::new()
                    .with(Property::Checked(true))
                    .with(Property::Disabled(false)),
            )
            .unwrap();

        assert!(changes.contains(Field::Checked));
        assert!(!changes.contains(Field::Disabled));
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn missing_host_is_an_error() {
        let result = CheckBox::new(&Document::new(), CheckBoxOptions::new().main("nope"));
        assert!(matches!(result, Err(ControlError::ElementNotFound(id)) if id == "nope"));
    }

    #[test]
    fn structure_is_built_once() {
        let cb = checkbox(CheckBoxOptions::new());
        cb.render().unwrap();
        assert!(matches!(cb.init_structure(), Err(ControlError::AlreadyRendered(_))));
        // Rendering again only repaints
        cb.render().unwrap();
        assert_eq!(cb.stage(), RenderStage::Rendered);
    }
}
