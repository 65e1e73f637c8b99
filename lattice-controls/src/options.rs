//! Construction options for the checkbox control.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::control::{Field, Property, PropertyPatch};
use crate::error::Result;
use crate::value::{to_js_string, DEFAULT_VALUE};

/// Options accepted by [`CheckBox::new`](crate::CheckBox::new).
///
/// Keys use camelCase when decoded from JSON. Unknown keys are collected in
/// `extra` and passed through to the control's property bag.
///
/// Property values are loosely typed, as they often come from markup
/// attributes: flags take the value's truthiness and text properties its
/// string form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckBoxOptions {
    /// Control id. Generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Id of host markup to adopt as the main element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Submitted value. Defaults to `"on"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<Value>,

    /// Reference value or list of `{ "value": ... }` records deciding the
    /// initial checked state. Used once, never stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CheckBoxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode options from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decode options from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn main(mut self, main: impl Into<String>) -> Self {
        self.main = Some(main.into());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn raw_value(mut self, raw_value: impl Into<Value>) -> Self {
        self.raw_value = Some(raw_value.into());
        self
    }

    pub fn checked(mut self, checked: impl Into<Value>) -> Self {
        self.checked = Some(checked.into());
        self
    }

    pub fn datasource(mut self, datasource: impl Into<Value>) -> Self {
        self.datasource = Some(datasource.into());
        self
    }

    pub fn name(mut self, name: impl Into<Value>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<Value>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn disabled(mut self, disabled: impl Into<Value>) -> Self {
        self.disabled = Some(disabled.into());
        self
    }

    pub fn read_only(mut self, read_only: impl Into<Value>) -> Self {
        self.read_only = Some(read_only.into());
        self
    }

    pub fn hidden(mut self, hidden: impl Into<Value>) -> Self {
        self.hidden = Some(hidden.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Split the options into the datasource and the property patch.
    ///
    /// Defaults (`value: "on"`, `checked: false`) are filled in. `name_fallback`
    /// is used when no name was given.
    pub(crate) fn into_patch(
        self,
        name_fallback: Option<String>,
    ) -> (Option<Value>, PropertyPatch) {
        let mut patch = PropertyPatch::new();

        let value = match self.value {
            None | Some(Value::Null) => DEFAULT_VALUE.to_string(),
            Some(other) => to_js_string(&other),
        };
        patch.push(Property::Value(value));
        if let Some(raw_value) = self.raw_value {
            patch.push(Property::RawValue(raw_value));
        }
        let checked = self.checked.unwrap_or(Value::Bool(false));
        patch.push(Property::from_entry(Field::Checked.key(), checked));

        let name = self
            .name
            .filter(|name| !name.is_null())
            .map(|name| to_js_string(&name))
            .filter(|name| !name.is_empty())
            .or(name_fallback);
        if let Some(name) = name {
            patch.push(Property::Name(Some(name)));
        }

        let loose = [
            (Field::Title, self.title.filter(|title| !title.is_null())),
            (Field::Disabled, self.disabled),
            (Field::ReadOnly, self.read_only),
            (Field::Hidden, self.hidden),
        ];
        for (field, value) in loose {
            if let Some(value) = value {
                patch.push(Property::from_entry(field.key(), value));
            }
        }
        for property in PropertyPatch::from_object(self.extra) {
            patch.push(property);
        }

        (self.datasource, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PropertyKey;
    use serde_json::json;

    #[test]
    fn decodes_camel_case_and_collects_unknown_keys() {
        let options = CheckBoxOptions::from_json(
            r#"{ "value": "x", "rawValue": 1, "readOnly": true,
                 "datasource": [{"value": "x"}], "size": "small" }"#,
        )
        .unwrap();

        assert_eq!(options.value, Some(json!("x")));
        assert_eq!(options.raw_value, Some(json!(1)));
        assert_eq!(options.read_only, Some(json!(true)));
        assert_eq!(options.datasource, Some(json!([{ "value": "x" }])));
        assert_eq!(options.extra.get("size"), Some(&json!("small")));
        assert!(!options.extra.contains_key("readOnly"));
    }

    #[test]
    fn patch_has_defaults_and_no_datasource() {
        let (datasource, patch) = CheckBoxOptions::new().datasource("on").into_patch(None);

        assert_eq!(datasource, Some(json!("on")));
        assert!(patch.iter().any(|p| *p == Property::Value("on".into())));
        assert!(patch.iter().any(|p| *p == Property::Checked(false)));
        assert!(!patch.contains(&PropertyKey::Extra("datasource".into())));
        assert!(!patch.contains(&Field::Name.into()));
    }

    #[test]
    fn name_falls_back_to_host_name() {
        let (_, patch) = CheckBoxOptions::new().into_patch(Some("agree".into()));
        assert!(patch.iter().any(|p| *p == Property::Name(Some("agree".into()))));

        let (_, patch) = CheckBoxOptions::new()
            .name("own")
            .into_patch(Some("agree".into()));
        assert!(patch.iter().any(|p| *p == Property::Name(Some("own".into()))));
    }

    #[test]
    fn loose_values_are_coerced() {
        let options = CheckBoxOptions::from_value(json!({
            "checked": "checked",
            "disabled": 1,
            "readOnly": "",
            "title": 5,
            "name": 7,
        }))
        .unwrap();
        let (_, patch) = options.into_patch(None);

        assert!(patch.iter().any(|p| *p == Property::Checked(true)));
        assert!(patch.iter().any(|p| *p == Property::Disabled(true)));
        assert!(patch.iter().any(|p| *p == Property::ReadOnly(false)));
        assert!(patch.iter().any(|p| *p == Property::Title(Some("5".into()))));
        assert!(patch.iter().any(|p| *p == Property::Name(Some("7".into()))));
    }

    #[test]
    fn pass_through_keys_naming_fields_are_typed() {
        let (_, patch) = CheckBoxOptions::new().extra("hidden", "yes").into_patch(None);
        assert!(patch.iter().any(|p| *p == Property::Hidden(true)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CheckBoxOptions::from_json("{ value: }").is_err());
        assert!(CheckBoxOptions::from_value(json!({ "id": 3 })).is_err());
    }
}
