//! Document Nodes
//!
//! This module defines the element type stored in the document.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

/// Handle to an element in a [`Document`](super::Document).
///
/// Handles are unique across all documents in the process, so a stale
/// handle never aliases an element created later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#node{}", self.0)
    }
}

/// Kinds of DOM events an element can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEventType {
    Click,
    Change,
}

/// An event delivered to DOM listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: DomEventType,
    pub target: NodeId,
}

/// Number of script-initiated writes per native property.
///
/// User interaction (a simulated click toggling `checked`) is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub value: usize,
    pub checked: usize,
    pub disabled: usize,
    pub read_only: usize,
    pub inner_html: usize,
    pub attributes: usize,
}

/// An element in the document.
#[derive(Debug, Clone)]
pub struct Element {
    /// Handle of this element.
    id: NodeId,

    /// Lowercase tag name.
    tag: String,

    /// Markup attributes, in insertion order.
    attributes: IndexMap<String, String>,

    /// Native form-input state. Meaningful for `<input>` elements only.
    pub(super) checked: bool,
    pub(super) disabled: bool,
    pub(super) read_only: bool,
    pub(super) value: String,

    /// Text content for leaf elements.
    pub(super) inner_html: String,

    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,

    pub(super) writes: WriteCounts,
}

impl Element {
    /// Create a detached element.
    pub fn new(tag: &str) -> Self {
        Self {
            id: NodeId::new(),
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            checked: false,
            disabled: false,
            read_only: false,
            value: String::new(),
            inner_html: String::new(),
            parent: None,
            children: Vec::new(),
            writes: WriteCounts::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The element's `id` attribute, if set and non-empty.
    pub fn dom_id(&self) -> Option<&str> {
        self.attribute("id").filter(|id| !id.is_empty())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(super) fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
        self.writes.attributes += 1;
    }

    pub(super) fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let removed = self.attributes.shift_remove(name);
        if removed.is_some() {
            self.writes.attributes += 1;
        }
        removed
    }

    /// Whether the space-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub(super) fn toggle_class(&mut self, class: &str, on: bool) {
        if self.has_class(class) == on {
            return;
        }
        let mut classes: Vec<&str> = self
            .attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        if on {
            classes.push(class);
        } else {
            classes.retain(|c| *c != class);
        }
        let joined = classes.join(" ");
        self.set_attribute("class", &joined);
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn write_counts(&self) -> WriteCounts {
        self.writes
    }

    /// Void elements serialize without a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "br" | "img" | "hr")
    }
}
