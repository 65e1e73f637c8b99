//! Per-control helper: ids, parts, escaping and DOM listener bookkeeping.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::dom::{DomEvent, DomEventType, Document, NodeId};
use crate::error::{ControlError, Result};
use crate::event::ListenerId;

/// Generate a process-unique control id such as `checkbox3`.
pub fn next_control_id(type_name: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}{}", type_name.to_ascii_lowercase(), n)
}

/// Services a control uses to talk to its document.
///
/// Every DOM listener registered through [`add_dom_event`](Self::add_dom_event)
/// is remembered and removed by [`clear_dom_events`](Self::clear_dom_events)
/// when the control is disposed.
pub struct ControlHelper {
    control_id: String,
    document: Document,
    dom_events: Mutex<Vec<ListenerId>>,
}

impl ControlHelper {
    pub fn new(document: Document, control_id: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            document,
            dom_events: Mutex::new(Vec::new()),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    /// The element id for a named part of the control, or for the control's
    /// main element when `part` is `None`.
    pub fn get_id(&self, part: Option<&str>) -> String {
        match part {
            Some(part) => format!("ctrl-{}-{}", self.control_id, part),
            None => format!("ctrl-{}", self.control_id),
        }
    }

    /// Look up a named part in the document.
    pub fn get_part(&self, part: &str) -> Result<NodeId> {
        let id = self.get_id(Some(part));
        self.document
            .get_element_by_id(&id)
            .ok_or(ControlError::ElementNotFound(id))
    }

    /// Escape text for insertion as markup.
    pub fn escape_html(text: &str) -> String {
        v_htmlescape::escape(text).to_string()
    }

    /// Attach a DOM listener that is removed when the control is disposed.
    pub fn add_dom_event<F>(
        &self,
        node: NodeId,
        kind: DomEventType,
        handler: F,
    ) -> Result<ListenerId>
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        let id = self.document.add_event_listener(node, kind, handler)?;
        self.dom_events.lock().push(id);
        Ok(id)
    }

    /// Remove every DOM listener added through this helper.
    ///
    /// Returns how many were still attached.
    pub fn clear_dom_events(&self) -> usize {
        let ids: Vec<_> = self.dom_events.lock().drain(..).collect();
        ids.into_iter()
            .filter(|id| self.document.remove_event_listener(*id))
            .count()
    }

    /// Swap the control's main element for `replacement`.
    pub fn replace_main(&self, current: NodeId, replacement: NodeId) -> Result<()> {
        tracing::debug!(
            control = %self.control_id,
            %current,
            %replacement,
            "replacing main element"
        );
        self.document.replace_child(current, replacement)
    }
}

impl fmt::Debug for ControlHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlHelper")
            .field("control_id", &self.control_id)
            .field("dom_events", &self.dom_events.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_namespaced_by_part() {
        let helper = ControlHelper::new(Document::new(), "checkbox7");
        assert_eq!(helper.get_id(None), "ctrl-checkbox7");
        assert_eq!(helper.get_id(Some("box")), "ctrl-checkbox7-box");
        assert_eq!(helper.get_id(Some("text")), "ctrl-checkbox7-text");
    }

    #[test]
    fn control_ids_are_unique() {
        let a = next_control_id("CheckBox");
        let b = next_control_id("CheckBox");
        assert!(a.starts_with("checkbox"));
        assert_ne!(a, b);
    }

    #[test]
    fn get_part_finds_element_by_generated_id() {
        let document = Document::new();
        let helper = ControlHelper::new(document.clone(), "cb");
        let span = document.create_element("span");

        assert!(matches!(
            helper.get_part("text"),
            Err(ControlError::ElementNotFound(id)) if id == "ctrl-cb-text"
        ));

        document.set_attribute(span, "id", &helper.get_id(Some("text"))).unwrap();
        assert_eq!(helper.get_part("text").unwrap(), span);
    }

    #[test]
    fn escape_html_escapes_markup() {
        let escaped = ControlHelper::escape_html("<b>\"Tom\" & Jerry</b>");
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('"'));
        assert!(escaped.contains("&amp;"));
        assert!(escaped.contains("&lt;b&gt;"));
    }

    #[test]
    fn clear_dom_events_removes_tracked_listeners() {
        let document = Document::new();
        let helper = ControlHelper::new(document.clone(), "cb");
        let node = document.create_element("input");

        helper.add_dom_event(node, DomEventType::Click, |_| {}).unwrap();
        helper.add_dom_event(node, DomEventType::Change, |_| {}).unwrap();
        assert_eq!(document.listener_count(node, DomEventType::Click), 1);

        assert_eq!(helper.clear_dom_events(), 2);
        assert_eq!(document.listener_count(node, DomEventType::Click), 0);
        assert_eq!(helper.clear_dom_events(), 0);
    }
}
