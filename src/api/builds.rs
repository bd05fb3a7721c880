//
//  teamcity-client
//  api/builds.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Builds API
//!
//! Retrieval, listing, triggering and cancellation of builds.
//!
//! ## Lifecycle
//!
//! A build run is backed by a different resource depending on its phase:
//!
//! | State | Resource | Cancel via |
//! |-------|----------|------------|
//! | `queued` | `/buildQueue/id:<id>` | `DELETE` |
//! | `running` | `/builds/id:<id>` | `POST` cancel request |
//! | `finished` | `/builds/id:<id>` | not applicable |
//!
//! ## Example
//!
//! ```rust,no_run
//! use teamcity_client::api::{BuildQuery, TeamCityClient};
//!
//! # async fn example(client: TeamCityClient) -> Result<(), teamcity_client::api::common::ApiError> {
//! let query = BuildQuery {
//!     build_type: Some("MyProject_Build".to_string()),
//!     status: Some("FAILURE".to_string()),
//!     ..Default::default()
//! };
//! for build in client.list_builds(&query).await? {
//!     println!("#{} {}", build.number.unwrap_or_default(), build.status.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::TeamCityClient;
use super::common::{ApiError, SafeError};
use super::locator::{BuildQuery, Locator};
use super::{checked_id, BuildType};

/// Field projection used when fetching a single build.
const BUILD_FIELDS: &str = "id,buildTypeId,number,status,state,branchName,statusText,webUrl,\
queuedDate,startDate,finishDate,buildType(id,name,projectId,projectName,webUrl),\
triggered(type,date,user(username,name)),\
problemOccurrences(count,problemOccurrence(id,type,identity,details))";

/// Field projection used when listing builds.
const BUILD_LIST_FIELDS: &str =
    "count,build(id,buildTypeId,number,status,state,branchName,webUrl,queuedDate,startDate,finishDate)";

/// Comment attached to cancellations when the caller gives none.
pub const DEFAULT_CANCEL_COMMENT: &str = "Cancelled via tc";

/// Lifecycle phase of a build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Queued,
    Running,
    Finished,
    /// Any state this client does not know about
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A build run.
///
/// `id` is the server-assigned identifier; `number` is the human-facing build number
/// and is not unique across build configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: u64,
    #[serde(default)]
    pub build_type_id: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub state: BuildState,
    /// `SUCCESS`, `FAILURE`, `UNKNOWN`, ...
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub queued_date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub finish_date: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<BuildType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered: Option<Triggered>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_occurrences: Option<ProblemOccurrences>,
}

/// How a build was started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triggered {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Build problems (compilation errors, failed tests, exit codes, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOccurrences {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub problem_occurrence: Vec<ProblemOccurrence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemOccurrence {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuildList {
    #[serde(default)]
    build: Vec<Build>,
}

#[derive(Debug, Deserialize)]
struct BuildTypeList {
    #[serde(rename = "buildType", default)]
    build_type: Vec<BuildType>,
}

/// Parameters for [`TeamCityClient::trigger_build`].
///
/// Either `build_type_id` or `project_name` must be set. A project name resolves to
/// the first build configuration of that project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriggerBuildRequest {
    pub build_type_id: Option<String>,
    pub project_name: Option<String>,
    pub branch: Option<String>,
    pub comment: Option<String>,
    pub personal: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueBuildBody<'a> {
    build_type: IdRef<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<CommentBody<'a>>,
    personal: bool,
}

#[derive(Debug, Serialize)]
struct IdRef<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelRequest<'a> {
    comment: &'a str,
    readd_into_queue: bool,
}

/// Result of [`TeamCityClient::cancel_build`].
///
/// Every variant is a successful call; `NotApplicable` describes a build that was
/// neither queued nor running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CancelOutcome {
    /// Removed from the queue.
    Dequeued { build_id: u64 },
    /// Stop request accepted for a running build.
    Cancelled { build_id: u64 },
    /// The stop request failed, but a recheck found the build no longer running.
    ///
    /// The build may have completed normally or failed on its own; the server does
    /// not say which.
    AlreadyStopped { build_id: u64, state: BuildState },
    /// Nothing to cancel.
    NotApplicable {
        build_id: u64,
        state: BuildState,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
}

impl CancelOutcome {
    /// Human readable summary.
    pub fn describe(&self) -> String {
        match self {
            Self::Dequeued { build_id } => format!("Build {build_id} removed from the queue"),
            Self::Cancelled { build_id } => format!("Build {build_id} cancelled"),
            Self::AlreadyStopped { build_id, state } => {
                format!("Build {build_id} was no longer running (now {state})")
            }
            Self::NotApplicable {
                build_id,
                state,
                status,
            } => match status {
                Some(status) => format!(
                    "Build {build_id} is {state} ({status}); nothing to cancel"
                ),
                None => format!("Build {build_id} is {state}; nothing to cancel"),
            },
        }
    }
}

/// Steps of the cancellation protocol.
#[derive(Debug)]
enum CancelStep {
    /// Fetch the build to learn its state.
    Inspect,
    /// Queued: delete from the queue resource.
    DequeueQueued,
    /// Running: post a cancel request to the build resource.
    StopRunning,
    /// The stop request failed; re-fetch to see whether the build finished meanwhile.
    RecheckAfterFailure(ApiError),
    /// The build could not be fetched; it may exist only in the queue.
    QueueFallback(ApiError),
    Done(CancelOutcome),
}

/// Per-build failure inside a batch cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct FailedCancel {
    pub build_id: u64,
    pub error: SafeError,
}

/// Result of [`TeamCityClient::cancel_queued_builds`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchCancelReport {
    pub cancelled: Vec<CancelOutcome>,
    pub failed: Vec<FailedCancel>,
}

impl BatchCancelReport {
    /// Number of builds the batch attempted.
    pub fn attempted(&self) -> usize {
        self.cancelled.len() + self.failed.len()
    }
}

impl TeamCityClient {
    /// Fetches a build with its build type, trigger and problem details.
    pub async fn get_build(&self, build_id: u64) -> Result<Build, ApiError> {
        self.get(
            &format!("/builds/id:{build_id}"),
            &[("fields", Value::from(BUILD_FIELDS))],
        )
        .await
    }

    /// Lists builds matching a raw or structured query.
    ///
    /// A `count` dimension is always sent; it defaults to 5.
    pub async fn list_builds(&self, query: &BuildQuery) -> Result<Vec<Build>, ApiError> {
        let list: BuildList = self
            .get(
                "/builds",
                &[
                    ("locator", Value::from(query.to_locator())),
                    ("fields", Value::from(BUILD_LIST_FIELDS)),
                ],
            )
            .await?;
        Ok(list.build)
    }

    /// Lists builds waiting in the queue, optionally for one build configuration.
    pub async fn list_queued_builds(
        &self,
        build_type_id: Option<&str>,
    ) -> Result<Vec<Build>, ApiError> {
        let locator = Locator::new()
            .group_opt("buildType", "id", build_type_id)
            .build();

        let mut query = vec![("fields", Value::from(BUILD_LIST_FIELDS))];
        if !locator.is_empty() {
            query.push(("locator", Value::from(locator)));
        }

        let list: BuildList = self.get("/buildQueue", &query).await?;
        Ok(list.build)
    }

    /// Adds a build to the queue.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] if neither a build type nor a project name is given;
    ///   no request is sent
    /// - [`ApiError::BuildTypeNotFound`] if the project has no build configurations
    pub async fn trigger_build(&self, request: &TriggerBuildRequest) -> Result<Build, ApiError> {
        let build_type_id = non_empty(request.build_type_id.as_deref());
        let project_name = non_empty(request.project_name.as_deref());

        let build_type_id = match (build_type_id, project_name) {
            (Some(id), _) => checked_id("build type", id)?.to_string(),
            (None, Some(name)) => self.resolve_build_type(name).await?,
            (None, None) => {
                return Err(ApiError::Validation(
                    "Either buildTypeId or projectName is required to trigger a build".to_string(),
                ))
            }
        };

        let body = QueueBuildBody {
            build_type: IdRef { id: &build_type_id },
            branch_name: non_empty(request.branch.as_deref()),
            comment: non_empty(request.comment.as_deref()).map(|text| CommentBody { text }),
            personal: request.personal,
        };

        let build: Build = self.post("/buildQueue", &body).await?;
        tracing::info!("Queued build {} for {}", build.id, build_type_id);
        Ok(build)
    }

    async fn resolve_build_type(&self, project_name: &str) -> Result<String, ApiError> {
        let locator = Locator::new().group("project", "name", project_name).build();
        let result: Result<BuildTypeList, ApiError> = self
            .get(
                "/buildTypes",
                &[
                    ("locator", Value::from(locator)),
                    ("fields", Value::from("buildType(id,name,projectId,projectName)")),
                ],
            )
            .await;

        match result {
            Ok(list) => list
                .build_type
                .into_iter()
                .next()
                .map(|bt| bt.id)
                .ok_or_else(|| ApiError::BuildTypeNotFound(project_name.to_string())),
            Err(e) if e.is_not_found() => Err(ApiError::BuildTypeNotFound(project_name.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Cancels a build according to its lifecycle phase.
    ///
    /// 1. Fetch the build.
    /// 2. Queued: one `DELETE /buildQueue/id:<id>`. Running: one `POST /builds/id:<id>`
    ///    with `readdIntoQueue: false`; if that fails, re-fetch and report
    ///    [`CancelOutcome::AlreadyStopped`] when the build is no longer running.
    ///    Anything else: [`CancelOutcome::NotApplicable`].
    /// 3. If the fetch fails, try the queue delete anyway; if that fails too the
    ///    original fetch error is returned.
    pub async fn cancel_build(
        &self,
        build_id: u64,
        comment: Option<&str>,
    ) -> Result<CancelOutcome, ApiError> {
        let comment = non_empty(comment).unwrap_or(DEFAULT_CANCEL_COMMENT);
        let build_path = format!("/builds/id:{build_id}");
        let queue_path = format!("/buildQueue/id:{build_id}");

        let mut step = CancelStep::Inspect;
        loop {
            tracing::debug!("cancel {}: {:?}", build_id, step);
            step = match step {
                CancelStep::Inspect => match self.get_build(build_id).await {
                    Ok(build) => match build.state {
                        BuildState::Queued => CancelStep::DequeueQueued,
                        BuildState::Running => CancelStep::StopRunning,
                        state => CancelStep::Done(CancelOutcome::NotApplicable {
                            build_id,
                            state,
                            status: build.status,
                        }),
                    },
                    Err(e) => CancelStep::QueueFallback(e),
                },
                CancelStep::DequeueQueued => {
                    self.delete(&queue_path).await?;
                    CancelStep::Done(CancelOutcome::Dequeued { build_id })
                }
                CancelStep::StopRunning => {
                    let body = CancelRequest {
                        comment,
                        readd_into_queue: false,
                    };
                    match self.post_discard(&build_path, &body).await {
                        Ok(()) => CancelStep::Done(CancelOutcome::Cancelled { build_id }),
                        Err(e) => CancelStep::RecheckAfterFailure(e),
                    }
                }
                CancelStep::RecheckAfterFailure(original) => {
                    tracing::warn!("Stop request for build {} failed, rechecking state", build_id);
                    match self.get_build(build_id).await {
                        Ok(build) if build.state != BuildState::Running => {
                            CancelStep::Done(CancelOutcome::AlreadyStopped {
                                build_id,
                                state: build.state,
                            })
                        }
                        _ => return Err(original),
                    }
                }
                CancelStep::QueueFallback(original) => {
                    tracing::warn!("Build {} not readable, trying the queue", build_id);
                    match self.delete(&queue_path).await {
                        Ok(()) => CancelStep::Done(CancelOutcome::Dequeued { build_id }),
                        Err(_) => return Err(original),
                    }
                }
                CancelStep::Done(outcome) => {
                    tracing::info!("{}", outcome.describe());
                    return Ok(outcome);
                }
            };
        }
    }

    /// Cancels every queued build of a build configuration, one at a time.
    ///
    /// A failure is recorded against its build and never stops the rest. Only a
    /// failure to list the queue is returned as an error.
    pub async fn cancel_queued_builds(
        &self,
        build_type_id: &str,
        comment: Option<&str>,
    ) -> Result<BatchCancelReport, ApiError> {
        let build_type_id = checked_id("build type", build_type_id)?;
        let queued = self.list_queued_builds(Some(build_type_id)).await?;

        let mut report = BatchCancelReport::default();
        for build in queued {
            match self.cancel_build(build.id, comment).await {
                Ok(outcome) => report.cancelled.push(outcome),
                Err(e) => {
                    tracing::warn!("Failed to cancel queued build {}: {}", build.id, e);
                    report.failed.push(FailedCancel {
                        build_id: build.id,
                        error: self.safe_error("cancel_build", &e),
                    });
                }
            }
        }
        Ok(report)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_deserializes_teamcity_json() {
        let json = r#"{
            "id": 4211,
            "buildTypeId": "Web_Build",
            "number": "118",
            "status": "FAILURE",
            "state": "finished",
            "branchName": "main",
            "buildType": {"id": "Web_Build", "name": "Build", "projectId": "Web"},
            "triggered": {"type": "user", "user": {"username": "amara"}},
            "problemOccurrences": {"count": 1, "problemOccurrence": [{"type": "TC_EXIT_CODE"}]}
        }"#;
        let build: Build = serde_json::from_str(json).unwrap();
        assert_eq!(build.id, 4211);
        assert_eq!(build.state, BuildState::Finished);
        assert_eq!(build.build_type.unwrap().project_id.as_deref(), Some("Web"));
        assert_eq!(build.problem_occurrences.unwrap().count, 1);
    }

    #[test]
    fn test_unknown_state_is_tolerated() {
        let build: Build = serde_json::from_str(r#"{"id": 1, "state": "deleted"}"#).unwrap();
        assert_eq!(build.state, BuildState::Unknown);
        let build: Build = serde_json::from_str(r#"{"id": 2}"#).unwrap();
        assert_eq!(build.state, BuildState::Unknown);
    }

    #[test]
    fn test_queue_body_shape() {
        let body = QueueBuildBody {
            build_type: IdRef { id: "Web_Build" },
            branch_name: Some("feature/x"),
            comment: Some(CommentBody { text: "nightly" }),
            personal: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "buildType": {"id": "Web_Build"},
                "branchName": "feature/x",
                "comment": {"text": "nightly"},
                "personal": false
            })
        );
    }

    #[test]
    fn test_cancel_request_never_requeues() {
        let json = serde_json::to_value(CancelRequest {
            comment: "stop",
            readd_into_queue: false,
        })
        .unwrap();
        assert_eq!(json["readdIntoQueue"], false);
    }

    #[test]
    fn test_outcome_serialization_and_description() {
        let outcome = CancelOutcome::NotApplicable {
            build_id: 9,
            state: BuildState::Finished,
            status: Some("SUCCESS".into()),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "not_applicable");
        assert_eq!(json["state"], "finished");
        assert_eq!(outcome.describe(), "Build 9 is finished (SUCCESS); nothing to cancel");
    }

    #[tokio::test]
    async fn test_trigger_requires_an_identifier() {
        let client = TeamCityClient::with_base_url("http://127.0.0.1:9", "t").unwrap();
        let request = TriggerBuildRequest {
            branch: Some("main".into()),
            build_type_id: Some("   ".into()),
            ..Default::default()
        };
        let err = client.trigger_build(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
