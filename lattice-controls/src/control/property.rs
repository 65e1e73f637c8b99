//! Property keys, patches and change sets.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::value::{to_js_string, truthy};

/// Properties known to the control framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Checked,
    Value,
    RawValue,
    Disabled,
    ReadOnly,
    Hidden,
    Title,
    Name,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Checked,
        Field::Value,
        Field::RawValue,
        Field::Disabled,
        Field::ReadOnly,
        Field::Hidden,
        Field::Title,
        Field::Name,
    ];

    /// The option key naming this property.
    pub fn key(self) -> &'static str {
        match self {
            Field::Checked => "checked",
            Field::Value => "value",
            Field::RawValue => "rawValue",
            Field::Disabled => "disabled",
            Field::ReadOnly => "readOnly",
            Field::Hidden => "hidden",
            Field::Title => "title",
            Field::Name => "name",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// A property name: either a known field or a pass-through key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Field(Field),
    Extra(String),
}

impl PropertyKey {
    pub fn parse(key: &str) -> Self {
        match Field::from_key(key) {
            Some(field) => PropertyKey::Field(field),
            None => PropertyKey::Extra(key.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PropertyKey::Field(field) => field.key(),
            PropertyKey::Extra(key) => key,
        }
    }
}

impl From<Field> for PropertyKey {
    fn from(field: Field) -> Self {
        PropertyKey::Field(field)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single property assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Checked(bool),
    Value(String),
    RawValue(Value),
    Disabled(bool),
    ReadOnly(bool),
    Hidden(bool),
    Title(Option<String>),
    Name(Option<String>),
    Extra(String, Value),
}

impl Property {
    pub fn key(&self) -> PropertyKey {
        match self {
            Property::Checked(_) => Field::Checked.into(),
            Property::Value(_) => Field::Value.into(),
            Property::RawValue(_) => Field::RawValue.into(),
            Property::Disabled(_) => Field::Disabled.into(),
            Property::ReadOnly(_) => Field::ReadOnly.into(),
            Property::Hidden(_) => Field::Hidden.into(),
            Property::Title(_) => Field::Title.into(),
            Property::Name(_) => Field::Name.into(),
            Property::Extra(key, _) => PropertyKey::Extra(key.clone()),
        }
    }

    /// Build a property from an untyped key/value pair.
    ///
    /// Flags take the value's truthiness, text properties its string form;
    /// `null` clears optional text.
    pub fn from_entry(key: &str, value: Value) -> Self {
        let text = |value: Value| match value {
            Value::Null => None,
            other => Some(to_js_string(&other)),
        };

        match PropertyKey::parse(key) {
            PropertyKey::Field(Field::Checked) => Property::Checked(truthy(&value)),
            PropertyKey::Field(Field::Value) => Property::Value(text(value).unwrap_or_default()),
            PropertyKey::Field(Field::RawValue) => Property::RawValue(value),
            PropertyKey::Field(Field::Disabled) => Property::Disabled(truthy(&value)),
            PropertyKey::Field(Field::ReadOnly) => Property::ReadOnly(truthy(&value)),
            PropertyKey::Field(Field::Hidden) => Property::Hidden(truthy(&value)),
            PropertyKey::Field(Field::Title) => Property::Title(text(value)),
            PropertyKey::Field(Field::Name) => Property::Name(text(value)),
            PropertyKey::Extra(key) => Property::Extra(key, value),
        }
    }
}

/// An ordered partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    properties: Vec<Property>,
}

impl PropertyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a patch that only sets `checked`.
    pub fn checked(checked: bool) -> Self {
        Self::new().with(Property::Checked(checked))
    }

    /// Add a property and return the patch, builder style.
    pub fn with(mut self, property: Property) -> Self {
        self.push(property);
        self
    }

    pub fn push(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Whether the patch assigns `key`.
    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.properties.iter().any(|property| &property.key() == key)
    }

    /// Build a patch from a JSON object's entries.
    pub fn from_object(object: serde_json::Map<String, Value>) -> Self {
        object
            .into_iter()
            .map(|(key, value)| Property::from_entry(&key, value))
            .collect()
    }
}

impl FromIterator<Property> for PropertyPatch {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PropertyPatch {
    type Item = Property;
    type IntoIter = std::vec::IntoIter<Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}

/// Old and new value of a changed property.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub old: Value,
    pub new: Value,
}

/// The properties a patch actually changed.
///
/// Assignments that leave a property at its current value are not
/// recorded, so an empty change set means nothing observable happened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    entries: IndexMap<PropertyKey, Change>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` went from `old` to `new`.
    ///
    /// Recording the same key twice keeps the first `old`; if the property
    /// ends where it started, the entry is dropped.
    pub fn record(&mut self, key: PropertyKey, old: Value, new: Value) {
        match self.entries.get_mut(&key) {
            Some(change) => {
                if change.old == new {
                    self.entries.shift_remove(&key);
                } else {
                    change.new = new;
                }
            }
            None if old != new => {
                self.entries.insert(key, Change { old, new });
            }
            None => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.entries.contains_key(&PropertyKey::Field(field))
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, field: Field) -> Option<&Change> {
        self.entries.get(&PropertyKey::Field(field))
    }

    /// Whether any of `fields` changed.
    pub fn touches(&self, fields: &[Field]) -> bool {
        fields.iter().any(|field| self.contains(*field))
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &Change)> {
        self.entries.iter()
    }
}
