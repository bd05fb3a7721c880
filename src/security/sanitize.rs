//
//  teamcity-client
//  security/sanitize.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Parameter sanitization
//!
//! Bounds untrusted input before it reaches the network layer. The sanitizer never
//! fails: it truncates strings, strips keys, caps field and element counts and
//! replaces non-finite numbers with zero.
//!
//! ## Limits
//!
//! | Context | String length | Top-level fields | Key length |
//! |---------|---------------|------------------|------------|
//! | General parameters | 1000 | 50 | 100 |
//! | POST bodies | 10000 | 100 | 100 |
//! | Query parameters | 500 | 20 | 100 |
//!
//! Nested objects are always capped at 50 fields and arrays at 100 elements.
//! Fields beyond a cap are dropped in insertion order.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use teamcity_client::security::sanitize::sanitize_params;
//!
//! let raw = json!({ "build id!": 42, "": "dropped", "branch": "main" });
//! let clean = sanitize_params(&raw);
//! assert_eq!(clean, json!({ "buildid": 42, "branch": "main" }));
//! ```

use std::fmt::Display;

use serde_json::{Map, Number, Value};

/// Maximum string length for general parameters.
pub const MAX_STRING_LENGTH: usize = 1000;

/// Maximum string length inside POST bodies.
pub const MAX_BODY_STRING_LENGTH: usize = 10_000;

/// Maximum length of a single query value.
pub const MAX_QUERY_VALUE_LENGTH: usize = 500;

/// Maximum key length after stripping.
pub const MAX_KEY_LENGTH: usize = 100;

/// Maximum key length for locator dimensions.
pub const MAX_LOCATOR_KEY_LENGTH: usize = 50;

/// Field cap for nested objects.
pub const MAX_NESTED_FIELDS: usize = 50;

/// Field cap for the top level of a POST body.
pub const MAX_BODY_FIELDS: usize = 100;

/// Cap on the number of query parameters.
pub const MAX_QUERY_PARAMS: usize = 20;

/// Cap on array elements.
pub const MAX_ARRAY_LENGTH: usize = 100;

/// Bounds applied by one sanitization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum string length, in characters
    pub max_string: usize,
    /// Field cap for the top-level object
    pub max_fields: usize,
}

impl Limits {
    /// Limits for general operation parameters.
    pub const GENERAL: Limits = Limits {
        max_string: MAX_STRING_LENGTH,
        max_fields: MAX_NESTED_FIELDS,
    };

    /// Limits for POST bodies.
    pub const BODY: Limits = Limits {
        max_string: MAX_BODY_STRING_LENGTH,
        max_fields: MAX_BODY_FIELDS,
    };

    /// Limits for query parameters.
    pub const QUERY: Limits = Limits {
        max_string: MAX_QUERY_VALUE_LENGTH,
        max_fields: MAX_QUERY_PARAMS,
    };
}

/// Truncates `s` to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Strips a key down to `[A-Za-z0-9_-]` and truncates it to `max` characters.
///
/// Returns `None` when nothing is left.
///
/// # Example
///
/// ```rust
/// use teamcity_client::security::sanitize::sanitize_key;
///
/// assert_eq!(sanitize_key("build.type id", 100).as_deref(), Some("buildtypeid"));
/// assert_eq!(sanitize_key("$$$", 100), None);
/// ```
pub fn sanitize_key(key: &str, max: usize) -> Option<String> {
    let cleaned: String = key
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(max)
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Coerces non-finite numbers (NaN, ±Infinity) to zero.
///
/// ```rust
/// use teamcity_client::security::sanitize::sanitize_number;
///
/// assert_eq!(sanitize_number(f64::NAN), 0.0);
/// assert_eq!(sanitize_number(f64::NEG_INFINITY), 0.0);
/// assert_eq!(sanitize_number(2.5), 2.5);
/// ```
pub fn sanitize_number(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Stringifies any displayable value and truncates the result.
pub fn sanitize_display<T: Display>(value: T, max: usize) -> String {
    truncate_chars(&value.to_string(), max)
}

/// Sanitizes an arbitrary JSON value with the given limits.
///
/// The top level of an object is capped at `limits.max_fields`; nested objects at
/// [`MAX_NESTED_FIELDS`].
pub fn sanitize_value(value: &Value, limits: Limits) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_object(map, limits, limits.max_fields)),
        other => sanitize_nested(other, limits),
    }
}

/// Sanitizes general operation parameters.
pub fn sanitize_params(value: &Value) -> Value {
    sanitize_value(value, Limits::GENERAL)
}

/// Sanitizes a POST body.
pub fn sanitize_body(value: &Value) -> Value {
    sanitize_value(value, Limits::BODY)
}

/// Sanitizes query parameters into `(key, value)` pairs.
///
/// Null values are skipped. Non-string values are stringified; arrays and objects
/// are rendered as compact JSON. At most [`MAX_QUERY_PARAMS`] pairs are returned.
///
/// # Example
///
/// ```rust
/// use teamcity_client::security::sanitize::sanitize_query;
///
/// let pairs = sanitize_query(&[("locator", "state:running".into()), ("x y", 5.into())]);
/// assert_eq!(pairs, vec![
///     ("locator".to_string(), "state:running".to_string()),
///     ("xy".to_string(), "5".to_string()),
/// ]);
/// ```
pub fn sanitize_query(params: &[(&str, Value)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let key = sanitize_key(key, MAX_KEY_LENGTH)?;
            let value = match value {
                Value::Null => return None,
                Value::String(s) => truncate_chars(s, MAX_QUERY_VALUE_LENGTH),
                Value::Number(n) => number_to_string(n),
                other => sanitize_display(other, MAX_QUERY_VALUE_LENGTH),
            };
            Some((key, value))
        })
        .take(MAX_QUERY_PARAMS)
        .collect()
}

fn sanitize_nested(value: &Value, limits: Limits) -> Value {
    match value {
        Value::String(s) => Value::String(truncate_chars(s, limits.max_string)),
        Value::Number(n) => Value::Number(sanitize_json_number(n)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .take(MAX_ARRAY_LENGTH)
                .map(|item| sanitize_nested(item, limits))
                .collect(),
        ),
        Value::Object(map) => Value::Object(sanitize_object(map, limits, MAX_NESTED_FIELDS)),
        Value::Bool(_) | Value::Null => value.clone(),
    }
}

fn sanitize_object(map: &Map<String, Value>, limits: Limits, max_fields: usize) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in map {
        if out.len() >= max_fields {
            break;
        }
        if let Some(key) = sanitize_key(key, MAX_KEY_LENGTH) {
            out.insert(key, sanitize_nested(value, limits));
        }
    }
    out
}

fn sanitize_json_number(n: &Number) -> Number {
    match n.as_f64() {
        Some(f) if n.is_f64() && !f.is_finite() => Number::from(0),
        _ => n.clone(),
    }
}

fn number_to_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => sanitize_number(f).to_string(),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn max_string_len(value: &Value) -> usize {
        match value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.iter().map(max_string_len).max().unwrap_or(0),
            Value::Object(map) => map.values().map(max_string_len).max().unwrap_or(0),
            _ => 0,
        }
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_general_strings_are_bounded() {
        let long = "x".repeat(5000);
        let clean = sanitize_params(&json!({ "a": long, "b": { "c": [long.clone()] } }));
        assert!(max_string_len(&clean) <= MAX_STRING_LENGTH);
        assert_eq!(clean["a"].as_str().unwrap().len(), MAX_STRING_LENGTH);
    }

    #[test]
    fn test_body_strings_allow_more() {
        let long = "y".repeat(20_000);
        let clean = sanitize_body(&json!({ "comment": long }));
        assert_eq!(clean["comment"].as_str().unwrap().len(), MAX_BODY_STRING_LENGTH);
    }

    #[test]
    fn test_keys_are_stripped_and_empty_keys_dropped() {
        let clean = sanitize_params(&json!({ "bad key;": 1, "()": 2, "ok_key-1": 3 }));
        let obj = clean.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["badkey"], json!(1));
        assert_eq!(obj["ok_key-1"], json!(3));
    }

    #[test]
    fn test_long_keys_are_truncated() {
        let key = "k".repeat(300);
        let clean = sanitize_params(&json!({ key: true }));
        let (k, _) = clean.as_object().unwrap().iter().next().unwrap();
        assert_eq!(k.len(), MAX_KEY_LENGTH);
    }

    #[test]
    fn test_field_caps_keep_first_fields_in_order() {
        let mut body = Map::new();
        for i in 0..150 {
            body.insert(format!("f{i}"), json!(i));
        }
        let body = Value::Object(body);

        let top = sanitize_body(&body);
        assert_eq!(top.as_object().unwrap().len(), MAX_BODY_FIELDS);
        assert_eq!(top.as_object().unwrap().keys().next().unwrap(), "f0");
        assert!(top.get("f99").is_some());
        assert!(top.get("f100").is_none());

        let nested = sanitize_body(&json!({ "inner": body.clone() }));
        assert_eq!(nested["inner"].as_object().unwrap().len(), MAX_NESTED_FIELDS);

        let general = sanitize_params(&body);
        assert_eq!(general.as_object().unwrap().len(), MAX_NESTED_FIELDS);
    }

    #[test]
    fn test_arrays_are_capped_and_recursed() {
        let items: Vec<Value> = (0..250).map(|_| json!(["z".repeat(2000)])).collect();
        let clean = sanitize_params(&Value::Array(items));
        let arr = clean.as_array().unwrap();
        assert_eq!(arr.len(), MAX_ARRAY_LENGTH);
        assert_eq!(arr[0][0].as_str().unwrap().len(), MAX_STRING_LENGTH);
    }

    #[test]
    fn test_non_finite_numbers_become_zero() {
        assert_eq!(sanitize_number(f64::INFINITY), 0.0);
        assert_eq!(sanitize_number(f64::NAN), 0.0);
        assert_eq!(sanitize_number(-3.0), -3.0);
        assert_eq!(sanitize_params(&json!({ "n": 1.5 }))["n"], json!(1.5));
    }

    #[test]
    fn test_query_pairs_are_bounded() {
        let long = Value::String("q".repeat(900));
        let params: Vec<(String, Value)> =
            (0..30).map(|i| (format!("p{i}"), long.clone())).collect();
        let borrowed: Vec<(&str, Value)> =
            params.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();

        let pairs = sanitize_query(&borrowed);
        assert_eq!(pairs.len(), MAX_QUERY_PARAMS);
        assert!(pairs.iter().all(|(_, v)| v.len() == MAX_QUERY_VALUE_LENGTH));
    }

    #[test]
    fn test_query_skips_null_and_stringifies_others() {
        let pairs = sanitize_query(&[
            ("a", Value::Null),
            ("b", json!(true)),
            ("c", json!([1, 2])),
        ]);
        assert_eq!(
            pairs,
            vec![
                ("b".to_string(), "true".to_string()),
                ("c".to_string(), "[1,2]".to_string()),
            ]
        );
    }

    #[test]
    fn test_sanitize_display_truncates() {
        assert_eq!(sanitize_display(123456, 3), "123");
    }
}
