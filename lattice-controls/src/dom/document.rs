//! In-memory document.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::node::{DomEvent, DomEventType, Element, NodeId, WriteCounts};
use crate::error::{ControlError, Result};
use crate::event::ListenerId;

/// Handler attached to an element.
pub type DomListener = Arc<dyn Fn(&DomEvent) + Send + Sync>;

struct ListenerEntry {
    id: ListenerId,
    target: NodeId,
    kind: DomEventType,
    handler: DomListener,
}

#[derive(Default)]
struct Tree {
    /// All live elements, attached or not.
    elements: IndexMap<NodeId, Element>,

    /// `id` attribute index. The most recent assignment wins.
    ids: HashMap<String, NodeId>,

    listeners: Vec<ListenerEntry>,
}

impl Tree {
    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element> {
        self.elements
            .get_mut(&node)
            .ok_or_else(|| ControlError::ElementNotFound(node.to_string()))
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.elements.get_mut(&node).and_then(|e| e.parent.take());
        if let Some(parent) = parent.and_then(|p| self.elements.get_mut(&p)) {
            parent.children.retain(|child| *child != node);
        }
    }

    /// Remove `node` and all of its descendants, their ids and listeners.
    fn remove_subtree(&mut self, node: NodeId) {
        self.detach(node);

        let mut pending = vec![node];
        let mut removed = Vec::new();
        while let Some(current) = pending.pop() {
            let Some(element) = self.elements.shift_remove(&current) else {
                continue;
            };
            if let Some(dom_id) = element.dom_id() {
                if self.ids.get(dom_id) == Some(&current) {
                    self.ids.remove(dom_id);
                }
            }
            pending.extend(element.children.iter().copied());
            removed.push(current);
        }

        self.listeners.retain(|entry| !removed.contains(&entry.target));
    }
}

/// A shared, in-memory element tree.
///
/// The document provides the services controls need from their host: element
/// creation and lookup by id, native input state, listeners, and simulated
/// user interaction. Cloning a `Document` shares the tree.
///
/// Every script-initiated write to a native property is counted per element
/// (see [`WriteCounts`]), which lets tests assert that a repaint touched only
/// what it had to.
#[derive(Clone)]
pub struct Document {
    tree: Arc<RwLock<Tree>>,

    /// Whether inputs dispatch native `change` events.
    change_events: bool,
}

impl Document {
    /// A document whose inputs dispatch `change` events.
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(Tree::default())),
            change_events: true,
        }
    }

    /// A document whose inputs never dispatch `change` events; only `click`
    /// reaches listeners.
    pub fn legacy() -> Self {
        Self {
            change_events: false,
            ..Self::new()
        }
    }

    pub fn supports_change_events(&self) -> bool {
        self.change_events
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let element = Element::new(tag);
        let id = element.id();
        self.tree.write().elements.insert(id, element);
        id
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.tree.read().elements.contains_key(&node)
    }

    /// Run `f` against an element, if it exists.
    pub fn with_element<R>(&self, node: NodeId, f: impl FnOnce(&Element) -> R) -> Option<R> {
        self.tree.read().elements.get(&node).map(f)
    }

    fn update<R>(&self, node: NodeId, f: impl FnOnce(&mut Element) -> R) -> Result<R> {
        let mut tree = self.tree.write();
        Ok(f(tree.element_mut(node)?))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.read().ids.get(id).copied()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.with_element(node, |e| e.tag().to_string())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_element(node, |e| e.attribute(name).map(str::to_string))
            .flatten()
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let mut tree = self.tree.write();
        let element = tree.element_mut(node)?;
        let previous_id = element.dom_id().map(str::to_string);
        element.set_attribute(name, value);

        if name == "id" {
            if let Some(previous) = previous_id {
                if tree.ids.get(&previous) == Some(&node) {
                    tree.ids.remove(&previous);
                }
            }
            if !value.is_empty() {
                tree.ids.insert(value.to_string(), node);
            }
        }
        Ok(())
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        let mut tree = self.tree.write();
        let removed = tree.element_mut(node)?.remove_attribute(name);
        if name == "id" {
            if let Some(previous) = &removed {
                if tree.ids.get(previous) == Some(&node) {
                    tree.ids.remove(previous);
                }
            }
        }
        Ok(removed)
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.with_element(node, |e| e.has_class(class)).unwrap_or(false)
    }

    pub fn toggle_class(&self, node: NodeId, class: &str, on: bool) -> Result<()> {
        self.update(node, |e| e.toggle_class(class, on))
    }

    // ------------------------------------------------------------------
    // Native input state
    // ------------------------------------------------------------------

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.with_element(node, Element::is_checked).unwrap_or(false)
    }

    pub fn set_checked(&self, node: NodeId, checked: bool) -> Result<()> {
        self.update(node, |e| {
            e.checked = checked;
            e.writes.checked += 1;
        })
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.with_element(node, Element::is_disabled).unwrap_or(false)
    }

    pub fn set_disabled(&self, node: NodeId, disabled: bool) -> Result<()> {
        self.update(node, |e| {
            e.disabled = disabled;
            e.writes.disabled += 1;
        })
    }

    pub fn is_read_only(&self, node: NodeId) -> bool {
        self.with_element(node, Element::is_read_only).unwrap_or(false)
    }

    pub fn set_read_only(&self, node: NodeId, read_only: bool) -> Result<()> {
        self.update(node, |e| {
            e.read_only = read_only;
            e.writes.read_only += 1;
        })
    }

    pub fn value(&self, node: NodeId) -> Option<String> {
        self.with_element(node, |e| e.value().to_string())
    }

    pub fn set_value(&self, node: NodeId, value: &str) -> Result<()> {
        self.update(node, |e| {
            e.value = value.to_string();
            e.writes.value += 1;
        })
    }

    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        self.with_element(node, |e| e.inner_html().to_string())
    }

    /// Set the text content of a leaf element.
    ///
    /// `html` is stored as given; callers escape untrusted text first.
    pub fn set_inner_html(&self, node: NodeId, html: &str) -> Result<()> {
        self.update(node, |e| {
            e.inner_html = html.to_string();
            e.writes.inner_html += 1;
        })
    }

    pub fn write_counts(&self, node: NodeId) -> WriteCounts {
        self.with_element(node, Element::write_counts).unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.with_element(node, Element::parent).flatten()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.with_element(node, |e| e.children().to_vec())
            .unwrap_or_default()
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut tree = self.tree.write();
        tree.element_mut(parent)?;
        tree.element_mut(child)?;
        tree.detach(child);
        tree.element_mut(child)?.parent = Some(parent);
        tree.element_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Replace the contents of `parent` with `children`.
    ///
    /// Previous children are removed from the document, along with their
    /// listeners.
    pub fn replace_children(&self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        let previous = {
            let mut tree = self.tree.write();
            let element = tree.element_mut(parent)?;
            element.inner_html.clear();
            element.writes.inner_html += 1;
            element.children.clone()
        };
        {
            let mut tree = self.tree.write();
            for child in previous {
                if !children.contains(&child) {
                    tree.remove_subtree(child);
                }
            }
        }
        for child in children {
            self.append_child(parent, *child)?;
        }
        Ok(())
    }

    /// Put `new` where `old` is and remove `old` from the document.
    pub fn replace_child(&self, old: NodeId, new: NodeId) -> Result<()> {
        let mut tree = self.tree.write();
        tree.element_mut(new)?;
        let parent = tree.element_mut(old)?.parent;

        tree.detach(new);
        if let Some(parent) = parent {
            let siblings = &mut tree.element_mut(parent)?.children;
            if let Some(slot) = siblings.iter_mut().find(|child| **child == old) {
                *slot = new;
            }
            tree.element_mut(old)?.parent = None;
            tree.element_mut(new)?.parent = Some(parent);
        }
        tree.remove_subtree(old);
        Ok(())
    }

    /// Remove `node` and its descendants from the document.
    pub fn remove(&self, node: NodeId) {
        self.tree.write().remove_subtree(node);
    }

    /// Serialize an element and its descendants.
    pub fn outer_html(&self, node: NodeId) -> Option<String> {
        let tree = self.tree.read();
        let mut out = String::new();
        write_element(&tree, node, &mut out)?;
        Some(out)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_event_listener<F>(
        &self,
        node: NodeId,
        kind: DomEventType,
        handler: F,
    ) -> Result<ListenerId>
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        let mut tree = self.tree.write();
        tree.element_mut(node)?;
        let id = ListenerId::new();
        tree.listeners.push(ListenerEntry {
            id,
            target: node,
            kind,
            handler: Arc::new(handler),
        });
        Ok(id)
    }

    /// Returns `false` if the listener was already gone.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut tree = self.tree.write();
        let before = tree.listeners.len();
        tree.listeners.retain(|entry| entry.id != id);
        tree.listeners.len() != before
    }

    pub fn listener_count(&self, node: NodeId, kind: DomEventType) -> usize {
        self.tree
            .read()
            .listeners
            .iter()
            .filter(|entry| entry.target == node && entry.kind == kind)
            .count()
    }

    /// Deliver an event to the listeners of `node`.
    ///
    /// Listeners run after the document lock is released, so they may
    /// read and write the document. Returns the number of listeners run.
    pub fn dispatch(&self, node: NodeId, kind: DomEventType) -> usize {
        let handlers: Vec<DomListener> = self
            .tree
            .read()
            .listeners
            .iter()
            .filter(|entry| entry.target == node && entry.kind == kind)
            .map(|entry| Arc::clone(&entry.handler))
            .collect();

        let event = DomEvent { kind, target: node };
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Simulate a user click on `node`.
    ///
    /// Disabled elements ignore the click. A checkbox input toggles its
    /// checked flag before `click` listeners run; if the document supports
    /// change events, `change` is dispatched afterwards.
    pub fn click(&self, node: NodeId) -> Result<()> {
        let toggled = {
            let mut tree = self.tree.write();
            let element = tree.element_mut(node)?;
            if element.disabled {
                return Ok(());
            }
            let is_checkbox = element.tag() == "input"
                && element
                    .attribute("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"));
            if is_checkbox {
                element.checked = !element.checked;
            }
            is_checkbox
        };

        self.dispatch(node, DomEventType::Click);
        if toggled && self.change_events {
            self.dispatch(node, DomEventType::Change);
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.read();
        f.debug_struct("Document")
            .field("elements", &tree.elements.len())
            .field("listeners", &tree.listeners.len())
            .field("change_events", &self.change_events)
            .finish()
    }
}

fn write_element(tree: &Tree, node: NodeId, out: &mut String) -> Option<()> {
    let element = tree.elements.get(&node)?;
    out.push('<');
    out.push_str(element.tag());
    for (name, value) in element.attributes() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&v_htmlescape::escape(value).to_string());
        out.push('"');
    }
    if element.is_void() {
        out.push_str(" />");
        return Some(());
    }
    out.push('>');
    if element.children().is_empty() {
        out.push_str(element.inner_html());
    } else {
        for child in element.children() {
            write_element(tree, *child, out)?;
        }
    }
    out.push_str("</");
    out.push_str(element.tag());
    out.push('>');
    Some(())
}
