//! Value Semantics
//!
//! Controls carry their raw value as a `serde_json::Value` so hosts can hand
//! in strings, numbers, booleans or structured data. This module defines how
//! such values are compared and turned into strings.
//!
//! # Loose Equality
//!
//! Matching a checkbox against its datasource uses a loose comparison that
//! coerces between types the way form values usually need:
//!
//! - `null` equals only `null`
//! - values of the same primitive type compare by value (numbers as `f64`)
//! - a number compared to a string converts the string to a number
//!   (surrounding whitespace ignored, empty string is `0`, anything
//!   unparsable is `NaN` and never equal)
//! - a boolean converts to `0` or `1` and is compared again
//! - an array or object compared to a primitive is converted to its string
//!   form first (arrays join their elements with `,`, objects become
//!   `"[object Object]"`)
//! - two composites compare structurally, since JSON values carry no
//!   reference identity
//!
//! The relation is symmetric but not transitive: `"1" ≈ 1` and `1 ≈ "1.0"`
//! while `"1" ≉ "1.0"`.

use serde_json::{Number, Value};

/// The value a checkbox submits when no value was configured.
pub const DEFAULT_VALUE: &str = "on";

/// Compare two values with the loose coercion rules described above.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => number_to_f64(x) == number_to_f64(y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
            loose_eq(&Value::from(u8::from(*flag)), other)
        }
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            number_to_f64(n) == string_to_number(s)
        }
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => a == b,
        (composite @ (Value::Array(_) | Value::Object(_)), primitive)
        | (primitive, composite @ (Value::Array(_) | Value::Object(_))) => {
            loose_eq(&Value::String(to_js_string(composite)), primitive)
        }
    }
}

/// Convert a value to the string form used when it is displayed or
/// submitted.
///
/// Integral numbers print without a fractional part, `null` prints as
/// `"null"`. Value formatters usually special-case `null` before calling
/// this.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Whether a value counts as "set" when used as a flag.
///
/// `null`, `false`, `0` and the empty string are false; everything else,
/// including empty arrays and objects, is true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => {
            let f = number_to_f64(n);
            f != 0.0 && !f.is_nan()
        }
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn number_to_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn number_to_string(n: &Number) -> String {
    if !n.is_f64() {
        return n.to_string();
    }
    let f = number_to_f64(n);
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if f == 0.0 {
        "0".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => 10,
    };
    if radix != 10 {
        return u64::from_str_radix(&trimmed[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // `f64::from_str` also accepts "inf" and "nan", which are not numbers here.
    let numeric = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if numeric {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Converts between a control's raw value and its string form.
///
/// Controls that submit structured values (dates, numbers, ids) install
/// their own formatter; the defaults treat the raw value as plain text.
pub trait ValueFormatter: Send + Sync {
    /// Turn a raw value into the string written to the native element.
    fn stringify_value(&self, raw: &Value) -> String {
        match raw {
            Value::Null => String::new(),
            other => to_js_string(other),
        }
    }

    /// Turn a string value into the raw value stored on the control.
    fn parse_value(&self, value: &str) -> Value {
        Value::String(value.to_string())
    }
}

/// The default formatter: raw values are their own strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl ValueFormatter for PlainFormatter {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_type_comparisons() {
        assert!(loose_eq(&json!("x"), &json!("x")));
        assert!(!loose_eq(&json!("x"), &json!("y")));
        assert!(loose_eq(&json!(1), &json!(1.0)));
        assert!(loose_eq(&json!(true), &json!(true)));
        assert!(loose_eq(&json!(null), &json!(null)));
    }

    #[test]
    fn numeric_strings_equal_numbers() {
        assert!(loose_eq(&json!("1"), &json!(1)));
        assert!(loose_eq(&json!(2.5), &json!(" 2.5 ")));
        assert!(loose_eq(&json!(""), &json!(0)));
        assert!(loose_eq(&json!("0x10"), &json!(16)));
        assert!(!loose_eq(&json!("1a"), &json!(1)));
        assert!(!loose_eq(&json!("nan"), &json!(1)));
    }

    #[test]
    fn null_only_equals_null() {
        assert!(!loose_eq(&json!(null), &json!(0)));
        assert!(!loose_eq(&json!(""), &json!(null)));
        assert!(!loose_eq(&json!(false), &json!(null)));
    }

    #[test]
    fn booleans_compare_as_numbers() {
        assert!(loose_eq(&json!(true), &json!(1)));
        assert!(loose_eq(&json!("1"), &json!(true)));
        assert!(loose_eq(&json!(false), &json!("")));
        assert!(!loose_eq(&json!(true), &json!("true")));
    }

    #[test]
    fn composites_compare_through_their_string_form() {
        assert!(loose_eq(&json!([1, 2]), &json!("1,2")));
        assert!(loose_eq(&json!([5]), &json!(5)));
        assert!(loose_eq(&json!({"a": 1}), &json!("[object Object]")));
        assert!(loose_eq(&json!({"a": 1}), &json!({"a": 1})));
        assert!(!loose_eq(&json!([1]), &json!([2])));
    }

    #[test]
    fn js_string_forms() {
        assert_eq!(to_js_string(&json!(3)), "3");
        assert_eq!(to_js_string(&json!(3.0)), "3");
        assert_eq!(to_js_string(&json!(0.5)), "0.5");
        assert_eq!(to_js_string(&json!([1, null, "a"])), "1,,a");
        assert_eq!(to_js_string(&json!(false)), "false");
    }

    #[test]
    fn truthiness() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("0")));
        assert!(truthy(&json!([])));
    }

    #[test]
    fn plain_formatter_round_trips_strings() {
        let formatter = PlainFormatter;
        assert_eq!(formatter.parse_value("yes"), json!("yes"));
        assert_eq!(formatter.stringify_value(&json!("yes")), "yes");
        assert_eq!(formatter.stringify_value(&json!(null)), "");
        assert_eq!(formatter.stringify_value(&json!(42)), "42");
    }
}
