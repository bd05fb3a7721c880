//
//  teamcity-client
//  api/locator.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! TeamCity locator builder.
//!
//! A locator is TeamCity's filter syntax: comma-joined `key:value` pairs, with
//! nested groups written as `key:(inner:value)`.
//!
//! # Escaping
//!
//! * Keys are reduced to `[A-Za-z0-9_-]` and truncated to 50 characters
//! * Values lose `, ; ( ) [ ] { } ' " \` and are truncated to 200 characters
//! * At most 20 parts are emitted; the rest are dropped
//!
//! # Example
//!
//! ```rust
//! use teamcity_client::api::locator::Locator;
//!
//! let locator = Locator::new()
//!     .group("project", "id", "MyProject")
//!     .with("status", "FAILURE")
//!     .with("count", 5)
//!     .build();
//! assert_eq!(locator, "project:(id:MyProject),status:FAILURE,count:5");
//! ```

use std::fmt;

use serde::Deserialize;

use crate::security::sanitize::{sanitize_key, truncate_chars, MAX_LOCATOR_KEY_LENGTH};

/// Maximum length of a single locator value.
pub const MAX_LOCATOR_VALUE_LENGTH: usize = 200;

/// Maximum number of `key:value` parts in one locator.
pub const MAX_LOCATOR_PARTS: usize = 20;

/// Default `count` applied to build listings when the caller gives none.
pub const DEFAULT_BUILD_COUNT: u32 = 5;

const VALUE_FORBIDDEN: &[char] = &[',', ';', '(', ')', '[', ']', '{', '}', '\'', '"', '\\'];

/// A scalar locator value.
#[derive(Debug, Clone, PartialEq)]
pub enum LocatorValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for LocatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for LocatorValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for LocatorValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for LocatorValue {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<i64> for LocatorValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for LocatorValue {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u32> for LocatorValue {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<bool> for LocatorValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Removes locator metacharacters from a value and truncates it.
///
/// ```rust
/// use teamcity_client::api::locator::escape_value;
///
/// assert_eq!(escape_value("a,b"), "ab");
/// assert_eq!(escape_value("feature/(x)"), "feature/x");
/// ```
pub fn escape_value(value: &str) -> String {
    let cleaned: String = value.chars().filter(|c| !VALUE_FORBIDDEN.contains(c)).collect();
    truncate_chars(&cleaned, MAX_LOCATOR_VALUE_LENGTH)
}

/// Builds a locator from `(key, value)` pairs in iteration order.
///
/// `None` values and values that are empty after escaping are skipped.
///
/// ```rust
/// use teamcity_client::api::locator::{build_locator, LocatorValue};
///
/// let locator = build_locator([
///     ("status", Some(LocatorValue::from("FAILURE"))),
///     ("branch", None),
///     ("count", Some(LocatorValue::from(5))),
/// ]);
/// assert_eq!(locator, "status:FAILURE,count:5");
/// ```
pub fn build_locator<I, K>(entries: I) -> String
where
    I: IntoIterator<Item = (K, Option<LocatorValue>)>,
    K: AsRef<str>,
{
    entries
        .into_iter()
        .fold(Locator::new(), |locator, (key, value)| match value {
            Some(value) => locator.with(key.as_ref(), value),
            None => locator,
        })
        .build()
}

/// Incremental locator builder.
///
/// Parts that fail key or value sanitization are silently skipped, as are parts
/// beyond [`MAX_LOCATOR_PARTS`].
#[derive(Debug, Clone, Default)]
pub struct Locator {
    parts: Vec<String>,
}

impl Locator {
    /// Creates an empty locator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key:value`.
    pub fn with(mut self, key: &str, value: impl Into<LocatorValue>) -> Self {
        let value = escape_value(&value.into().to_string());
        if let Some(key) = sanitize_key(key, MAX_LOCATOR_KEY_LENGTH) {
            if !value.is_empty() {
                self.push(format!("{key}:{value}"));
            }
        }
        self
    }

    /// Appends `key:value` when `value` is `Some`.
    pub fn with_opt<V: Into<LocatorValue>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Appends a nested group `key:(inner:value)`.
    ///
    /// Only `value` comes from the caller; it is escaped before wrapping.
    pub fn group(mut self, key: &str, inner: &str, value: impl Into<LocatorValue>) -> Self {
        let value = escape_value(&value.into().to_string());
        let key = sanitize_key(key, MAX_LOCATOR_KEY_LENGTH);
        let inner = sanitize_key(inner, MAX_LOCATOR_KEY_LENGTH);
        if let (Some(key), Some(inner)) = (key, inner) {
            if !value.is_empty() {
                self.push(format!("{key}:({inner}:{value})"));
            }
        }
        self
    }

    /// Appends a nested group when `value` is `Some`.
    pub fn group_opt<V: Into<LocatorValue>>(self, key: &str, inner: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.group(key, inner, value),
            None => self,
        }
    }

    /// Returns `true` if a part with this key is already present.
    pub fn has_key(&self, key: &str) -> bool {
        let prefix = format!("{key}:");
        self.parts.iter().any(|p| p.starts_with(&prefix))
    }

    /// Returns `true` if no parts were added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Joins the parts into the final locator string.
    pub fn build(self) -> String {
        self.parts.join(",")
    }

    fn push(&mut self, part: String) {
        if self.parts.len() < MAX_LOCATOR_PARTS {
            self.parts.push(part);
        }
    }
}

/// Returns `true` if a raw locator already has a top-level `key:` dimension.
///
/// Only dimensions outside parentheses count, so `buildType:(count:3)` does not
/// satisfy `count`.
pub fn raw_has_dimension(locator: &str, key: &str) -> bool {
    let mut depth = 0usize;
    let mut start = 0usize;
    let bytes = locator.as_bytes();

    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                if locator[start..i].trim_start().starts_with(&format!("{key}:")) {
                    return true;
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    locator[start..].trim_start().starts_with(&format!("{key}:"))
}

/// Named build filters, mapped onto TeamCity locator dimensions.
///
/// When `locator` is set it is used verbatim and every other field is ignored.
///
/// | Field | Locator form |
/// |-------|--------------|
/// | `project` | `project:(id:<v>)` |
/// | `build_type` | `buildType:(id:<v>)` |
/// | `status` | `status:<v>` |
/// | `state` | `state:<v>` |
/// | `branch` | `branch:<v>` |
/// | `agent` | `agent:(name:<v>)` |
/// | `user` | `user:(username:<v>)` |
/// | `since_date` / `until_date` | `sinceDate:<v>` / `untilDate:<v>` |
/// | `tags` | `tag:<v>` per tag |
/// | `start` | `start:<n>` |
/// | `count` | `count:<n>` |
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildQuery {
    pub locator: Option<String>,
    pub project: Option<String>,
    pub build_type: Option<String>,
    pub status: Option<String>,
    pub state: Option<String>,
    pub branch: Option<String>,
    pub agent: Option<String>,
    pub user: Option<String>,
    pub since_date: Option<String>,
    pub until_date: Option<String>,
    pub tags: Vec<String>,
    pub start: Option<u32>,
    pub count: Option<u32>,
}

impl BuildQuery {
    /// Renders the structured fields as a locator (ignores `locator`).
    pub fn structured_locator(&self) -> Locator {
        let mut locator = Locator::new()
            .group_opt("project", "id", self.project.as_deref())
            .group_opt("buildType", "id", self.build_type.as_deref())
            .with_opt("status", self.status.as_deref())
            .with_opt("state", self.state.as_deref())
            .with_opt("branch", self.branch.as_deref())
            .group_opt("agent", "name", self.agent.as_deref())
            .group_opt("user", "username", self.user.as_deref())
            .with_opt("sinceDate", self.since_date.as_deref())
            .with_opt("untilDate", self.until_date.as_deref());

        for tag in &self.tags {
            locator = locator.with("tag", tag);
        }

        locator
            .with_opt("start", self.start)
            .with_opt("count", self.count)
    }

    /// Produces the final locator, guaranteeing a `count` dimension.
    ///
    /// A raw locator takes precedence; `count:5` is appended to it when it has no
    /// top-level `count`.
    ///
    /// ```rust
    /// use teamcity_client::api::locator::BuildQuery;
    ///
    /// let query = BuildQuery { status: Some("FAILURE".into()), ..Default::default() };
    /// assert_eq!(query.to_locator(), "status:FAILURE,count:5");
    ///
    /// let raw = BuildQuery { locator: Some("buildType:Bt1".into()), ..Default::default() };
    /// assert_eq!(raw.to_locator(), "buildType:Bt1,count:5");
    /// ```
    pub fn to_locator(&self) -> String {
        match self.locator.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            Some(raw) if raw_has_dimension(raw, "count") => raw.to_string(),
            Some(raw) => format!("{raw},count:{DEFAULT_BUILD_COUNT}"),
            None => {
                let locator = self.structured_locator();
                if locator.has_key("count") {
                    locator.build()
                } else {
                    locator.with("count", DEFAULT_BUILD_COUNT).build()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_count() {
        let locator = build_locator([
            ("status", Some(LocatorValue::from("FAILURE"))),
            ("count", Some(LocatorValue::from(5))),
        ]);
        assert_eq!(locator, "status:FAILURE,count:5");
    }

    #[test]
    fn test_missing_values_are_omitted() {
        let locator = build_locator([
            ("status", None),
            ("branch", Some(LocatorValue::from(""))),
            ("state", Some(LocatorValue::from("running"))),
        ]);
        assert_eq!(locator, "state:running");
    }

    #[test]
    fn test_value_comma_is_stripped() {
        let locator = build_locator([("name", Some(LocatorValue::from("a,b")))]);
        assert_eq!(locator, "name:ab");
    }

    #[test]
    fn test_all_metacharacters_are_stripped() {
        assert_eq!(escape_value(r#"a,b;c(d)e[f]g{h}i'j"k\l"#), "abcdefghijkl");
    }

    #[test]
    fn test_keys_are_sanitized_and_bounded() {
        let locator = Locator::new().with("bad key!", 1).with("%%", 2).build();
        assert_eq!(locator, "badkey:1");

        let long = "k".repeat(80);
        let locator = Locator::new().with(&long, true).build();
        assert_eq!(locator, format!("{}:true", "k".repeat(MAX_LOCATOR_KEY_LENGTH)));
    }

    #[test]
    fn test_values_are_truncated() {
        let locator = Locator::new().with("name", "v".repeat(300)).build();
        assert_eq!(locator.len(), "name:".len() + MAX_LOCATOR_VALUE_LENGTH);
    }

    #[test]
    fn test_parts_are_capped() {
        let locator = (0..30).fold(Locator::new(), |l, i| l.with(&format!("k{i}"), i));
        let built = locator.build();
        assert_eq!(built.split(',').count(), MAX_LOCATOR_PARTS);
        assert!(built.ends_with("k19:19"));
    }

    #[test]
    fn test_group_escapes_inner_value() {
        let locator = Locator::new().group("project", "id", "Evil),count:(9").build();
        assert_eq!(locator, "project:(id:Evilcount:9)");
    }

    #[test]
    fn test_build_query_named_parameters() {
        let query = BuildQuery {
            project: Some("Backend".into()),
            build_type: Some("Backend_Ci".into()),
            branch: Some("main".into()),
            agent: Some("agent-1".into()),
            user: Some("jdoe".into()),
            tags: vec!["release".into(), "nightly".into()],
            start: Some(10),
            count: Some(20),
            ..Default::default()
        };
        assert_eq!(
            query.to_locator(),
            "project:(id:Backend),buildType:(id:Backend_Ci),branch:main,agent:(name:agent-1),\
             user:(username:jdoe),tag:release,tag:nightly,start:10,count:20"
        );
    }

    #[test]
    fn test_raw_locator_takes_precedence() {
        let query = BuildQuery {
            locator: Some("buildType:X,count:2".into()),
            status: Some("FAILURE".into()),
            ..Default::default()
        };
        assert_eq!(query.to_locator(), "buildType:X,count:2");
    }

    #[test]
    fn test_raw_locator_nested_count_does_not_count() {
        assert!(!raw_has_dimension("buildType:(count:3)", "count"));
        assert!(raw_has_dimension("a:b, count:3", "count"));
        let query = BuildQuery {
            locator: Some("buildType:(count:3)".into()),
            ..Default::default()
        };
        assert_eq!(query.to_locator(), "buildType:(count:3),count:5");
    }

    #[test]
    fn test_default_count_applied() {
        assert_eq!(BuildQuery::default().to_locator(), "count:5");
    }
}
