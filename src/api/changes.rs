//
//  teamcity-client
//  api/changes.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! VCS changes.
//!
//! File lists are only requested when [`ChangeQuery::include_files`] is set; they
//! are the expensive part of a change listing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::TeamCityClient;
use super::common::ApiError;
use super::locator::{raw_has_dimension, Locator};

/// Changes returned when the caller gives no count.
pub const DEFAULT_CHANGE_COUNT: u32 = 10;

const CHANGE_FIELDS: &str = "count,change(id,version,username,date,comment,webUrl)";

const CHANGE_FIELDS_WITH_FILES: &str =
    "count,change(id,version,username,date,comment,webUrl,files(file(file,changeType)))";

/// A VCS change (commit).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub id: i64,
    /// VCS revision
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<ChangedFiles>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFiles {
    #[serde(default)]
    pub file: Vec<ChangedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    /// Path of the file
    pub file: String,
    /// `added`, `edited`, `removed`, ...
    #[serde(default)]
    pub change_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChangeList {
    #[serde(default)]
    change: Vec<Change>,
}

/// Filters for [`TeamCityClient::list_changes`].
///
/// A raw `locator` takes precedence over the named fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangeQuery {
    pub locator: Option<String>,
    pub build_id: Option<u64>,
    pub build_type: Option<String>,
    pub project: Option<String>,
    pub username: Option<String>,
    pub count: Option<u32>,
    pub include_files: bool,
}

impl ChangeQuery {
    /// Renders the final locator, always with a `count`.
    ///
    /// ```rust
    /// use teamcity_client::api::ChangeQuery;
    ///
    /// let query = ChangeQuery { build_id: Some(42), ..Default::default() };
    /// assert_eq!(query.to_locator(), "build:(id:42),count:10");
    /// ```
    pub fn to_locator(&self) -> String {
        if let Some(raw) = self.locator.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            return if raw_has_dimension(raw, "count") {
                raw.to_string()
            } else {
                format!("{raw},count:{DEFAULT_CHANGE_COUNT}")
            };
        }

        Locator::new()
            .group_opt("build", "id", self.build_id.map(|id| id.to_string()))
            .group_opt("buildType", "id", self.build_type.as_deref())
            .group_opt("project", "id", self.project.as_deref())
            .with_opt("username", self.username.as_deref())
            .with("count", self.count.unwrap_or(DEFAULT_CHANGE_COUNT))
            .build()
    }
}

impl TeamCityClient {
    /// Lists VCS changes.
    pub async fn list_changes(&self, query: &ChangeQuery) -> Result<Vec<Change>, ApiError> {
        let fields = if query.include_files {
            CHANGE_FIELDS_WITH_FILES
        } else {
            CHANGE_FIELDS
        };

        let list: ChangeList = self
            .get(
                "/changes",
                &[
                    ("locator", Value::from(query.to_locator())),
                    ("fields", Value::from(fields)),
                ],
            )
            .await?;
        Ok(list.change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_locator_gets_count() {
        let query = ChangeQuery {
            locator: Some("username:amara".into()),
            build_type: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(query.to_locator(), "username:amara,count:10");
    }

    #[test]
    fn test_files_are_optional() {
        let change: Change = serde_json::from_str(r#"{"id": 5, "version": "abc123"}"#).unwrap();
        assert!(change.files.is_none());

        let json = r#"{"id": 6, "files": {"file": [{"file": "src/main.rs", "changeType": "edited"}]}}"#;
        let change: Change = serde_json::from_str(json).unwrap();
        assert_eq!(change.files.unwrap().file[0].change_type.as_deref(), Some("edited"));
    }
}
