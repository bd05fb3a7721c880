//
//  teamcity-client
//  api/test_results.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Muted tests and test occurrences.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::TeamCityClient;
use super::common::ApiError;
use super::locator::{raw_has_dimension, Locator};

/// Mutes returned when the caller gives no count.
pub const DEFAULT_MUTE_COUNT: u32 = 100;

/// Upper bound on any mute listing; also what `all` asks for.
pub const MAX_MUTE_COUNT: u32 = 1000;

/// Test occurrences returned when the caller gives no count.
pub const DEFAULT_TEST_COUNT: u32 = 100;

/// Upper bound on test occurrences fetched for one build.
pub const MAX_TEST_COUNT: u32 = 1000;

const MUTE_FIELDS: &str = "count,mute(id,assignment(text,timestamp,user(username)),\
scope(project(id,name),buildTypes(buildType(id,name))),target(tests(test(id,name))),resolution(type))";

const TEST_FIELDS: &str = "count,testOccurrence(id,name,status,duration,details,muted)";

/// A muted test (or set of tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mute {
    pub id: i64,
    #[serde(default)]
    pub assignment: Option<MuteAssignment>,
    #[serde(default)]
    pub scope: Option<MuteScope>,
    #[serde(default)]
    pub target: Option<MuteTarget>,
    #[serde(default)]
    pub resolution: Option<MuteResolution>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteAssignment {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user: Option<MuteUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteUser {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteScope {
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub build_types: Option<BuildTypeRefs>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTypeRefs {
    #[serde(default)]
    pub build_type: Vec<NamedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteTarget {
    #[serde(default)]
    pub tests: Option<TestRefs>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRefs {
    #[serde(default)]
    pub test: Vec<NamedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteResolution {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// An `{id, name}` reference to a project, build type or test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Mute {
    /// Names of the muted tests.
    pub fn test_names(&self) -> Vec<&str> {
        self.target
            .as_ref()
            .and_then(|t| t.tests.as_ref())
            .map(|tests| tests.test.iter().filter_map(|t| t.name.as_deref()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct MuteList {
    #[serde(default)]
    mute: Vec<Mute>,
}

/// Filters for [`TeamCityClient::list_muted_tests`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MuteQuery {
    pub locator: Option<String>,
    pub project: Option<String>,
    pub count: Option<u32>,
    /// Ask for up to [`MAX_MUTE_COUNT`] mutes.
    pub all: bool,
}

impl MuteQuery {
    /// Renders the final locator.
    ///
    /// ```rust
    /// use teamcity_client::api::MuteQuery;
    ///
    /// let query = MuteQuery { project: Some("Web".into()), all: true, ..Default::default() };
    /// assert_eq!(query.to_locator(), "project:(id:Web),count:1000");
    /// ```
    pub fn to_locator(&self) -> String {
        if let Some(raw) = self.locator.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            return if raw_has_dimension(raw, "count") {
                raw.to_string()
            } else {
                format!("{raw},count:{}", self.effective_count())
            };
        }

        Locator::new()
            .group_opt("project", "id", self.project.as_deref())
            .with("count", self.effective_count())
            .build()
    }

    fn effective_count(&self) -> u32 {
        if self.all {
            MAX_MUTE_COUNT
        } else {
            self.count.unwrap_or(DEFAULT_MUTE_COUNT).min(MAX_MUTE_COUNT)
        }
    }
}

/// One run of one test in one build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOccurrence {
    pub id: String,
    pub name: String,
    /// `SUCCESS`, `FAILURE`, `UNKNOWN`
    #[serde(default)]
    pub status: Option<String>,
    /// Milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub muted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestOccurrenceList {
    #[serde(default)]
    test_occurrence: Vec<TestOccurrence>,
}

/// Filters for [`TeamCityClient::list_test_occurrences`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestOccurrenceQuery {
    pub build_id: u64,
    /// e.g. `FAILURE`
    pub status: Option<String>,
    pub count: Option<u32>,
}

impl TestOccurrenceQuery {
    /// ```rust
    /// use teamcity_client::api::TestOccurrenceQuery;
    ///
    /// let query = TestOccurrenceQuery { build_id: 9, status: Some("FAILURE".into()), count: None };
    /// assert_eq!(query.to_locator(), "build:(id:9),status:FAILURE,count:100");
    /// ```
    pub fn to_locator(&self) -> String {
        Locator::new()
            .group("build", "id", self.build_id.to_string())
            .with_opt("status", self.status.as_deref())
            .with("count", self.count.unwrap_or(DEFAULT_TEST_COUNT).min(MAX_TEST_COUNT))
            .build()
    }
}

impl TeamCityClient {
    /// Lists muted tests.
    pub async fn list_muted_tests(&self, query: &MuteQuery) -> Result<Vec<Mute>, ApiError> {
        let list: MuteList = self
            .get(
                "/mutes",
                &[
                    ("locator", Value::from(query.to_locator())),
                    ("fields", Value::from(MUTE_FIELDS)),
                ],
            )
            .await?;
        Ok(list.mute)
    }

    /// Lists the test runs of one build.
    pub async fn list_test_occurrences(
        &self,
        query: &TestOccurrenceQuery,
    ) -> Result<Vec<TestOccurrence>, ApiError> {
        let list: TestOccurrenceList = self
            .get(
                "/testOccurrences",
                &[
                    ("locator", Value::from(query.to_locator())),
                    ("fields", Value::from(TEST_FIELDS)),
                ],
            )
            .await?;
        Ok(list.test_occurrence)
    }
}
