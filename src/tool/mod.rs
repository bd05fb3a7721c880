//
//  teamcity-client
//  tool/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Operation Boundary
//!
//! Entry point for callers that pick an operation at runtime and pass untyped JSON
//! parameters, such as a natural-language router.
//!
//! ## Request Format
//!
//! ```json
//! {"operation": "list_builds", "params": {"buildType": "Web_Build", "status": "FAILURE"}}
//! ```
//!
//! ## Response Format
//!
//! ```json
//! {"ok": true, "data": [...]}
//! {"ok": false, "error": {"code": "RESOURCE_NOT_FOUND", "message": "...", "correlation_id": "get_build-1767225600000"}}
//! ```
//!
//! ## Flow
//!
//! 1. The raw request is sanitized with the general limits
//! 2. It is decoded into a typed [`ToolRequest`]; decoding failures are validation errors
//! 3. The matching client operation runs
//! 4. Errors are translated to [`SafeError`] before they leave this module
//!
//! Typed callers should use [`TeamCityClient`] directly; sanitization of the raw
//! parameter bag only happens here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::common::{ApiError, ErrorCode, SafeError};
use crate::api::logs::{LogMode, DEFAULT_TAIL_LINES};
use crate::api::{
    AgentQuery, BuildQuery, ChangeQuery, MuteQuery, TeamCityClient, TestOccurrenceQuery,
    TreeBounds, TriggerBuildRequest,
};
use crate::security::sanitize::{sanitize_key, sanitize_params, MAX_KEY_LENGTH};

/// A typed operation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "snake_case")]
pub enum ToolRequest {
    #[serde(rename_all = "camelCase")]
    GetBuild { build_id: u64 },
    ListBuilds(BuildQuery),
    #[serde(rename_all = "camelCase")]
    ListQueuedBuilds {
        #[serde(default)]
        build_type_id: Option<String>,
    },
    TriggerBuild(TriggerBuildRequest),
    #[serde(rename_all = "camelCase")]
    CancelBuild {
        build_id: u64,
        #[serde(default)]
        comment: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    CancelQueuedBuilds {
        build_type_id: String,
        #[serde(default)]
        comment: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    FetchBuildLog {
        build_id: u64,
        #[serde(default = "default_true")]
        tail: bool,
        #[serde(default)]
        line_count: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    ListArtifacts {
        build_id: u64,
        #[serde(default)]
        path: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    GetArtifactMetadata { build_id: u64, path: String },
    #[serde(rename_all = "camelCase")]
    GetArtifactContent { build_id: u64, path: String },
    ListAgents(AgentQuery),
    #[serde(rename_all = "camelCase")]
    CompatibleAgents { build_type_id: String },
    ListChanges(ChangeQuery),
    ListMutedTests(MuteQuery),
    ListTestOccurrences(TestOccurrenceQuery),
    #[serde(rename_all = "camelCase")]
    GetProject { project_id: String },
    #[serde(rename_all = "camelCase")]
    ListProjects {
        #[serde(default)]
        parent_project_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ListBuildTypes {
        #[serde(default)]
        project_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ProjectTree {
        #[serde(default)]
        project_id: Option<String>,
        #[serde(default)]
        max_depth: Option<usize>,
        #[serde(default)]
        max_nodes: Option<usize>,
    },
}

fn default_true() -> bool {
    true
}

impl ToolRequest {
    /// The operation name, used in correlation ids.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetBuild { .. } => "get_build",
            Self::ListBuilds(_) => "list_builds",
            Self::ListQueuedBuilds { .. } => "list_queued_builds",
            Self::TriggerBuild(_) => "trigger_build",
            Self::CancelBuild { .. } => "cancel_build",
            Self::CancelQueuedBuilds { .. } => "cancel_queued_builds",
            Self::FetchBuildLog { .. } => "fetch_build_log",
            Self::ListArtifacts { .. } => "list_artifacts",
            Self::GetArtifactMetadata { .. } => "get_artifact_metadata",
            Self::GetArtifactContent { .. } => "get_artifact_content",
            Self::ListAgents(_) => "list_agents",
            Self::CompatibleAgents { .. } => "compatible_agents",
            Self::ListChanges(_) => "list_changes",
            Self::ListMutedTests(_) => "list_muted_tests",
            Self::ListTestOccurrences(_) => "list_test_occurrences",
            Self::GetProject { .. } => "get_project",
            Self::ListProjects { .. } => "list_projects",
            Self::ListBuildTypes { .. } => "list_build_types",
            Self::ProjectTree { .. } => "project_tree",
        }
    }

    /// Decodes a raw request after sanitizing it.
    ///
    /// A missing `params` object is treated as `{}`.
    pub fn from_raw(raw: &Value) -> Result<Self, ApiError> {
        let mut sanitized = match sanitize_params(raw) {
            Value::Object(map) => map,
            _ => {
                return Err(ApiError::Validation(
                    "Request must be a JSON object".to_string(),
                ))
            }
        };
        if !sanitized.contains_key("params") {
            sanitized.insert("params".to_string(), Value::Object(Map::new()));
        }

        serde_json::from_value(Value::Object(sanitized))
            .map_err(|e| ApiError::Validation(format!("Invalid request: {e}")))
    }
}

/// The envelope returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SafeError>,
}

impl ToolResponse {
    fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: SafeError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Runs one raw request against the client.
///
/// Never fails: every error comes back as `{"ok": false, "error": ...}`.
pub async fn execute_tool(client: &TeamCityClient, raw: &Value) -> ToolResponse {
    let request = match ToolRequest::from_raw(raw) {
        Ok(request) => request,
        Err(e) => return ToolResponse::failure(client.safe_error(&raw_operation(raw), &e)),
    };

    let operation = request.name();
    tracing::debug!("Executing {}", operation);

    match dispatch(client, request).await {
        Ok(data) => ToolResponse::success(data),
        Err(e) => ToolResponse::failure(client.safe_error(operation, &e)),
    }
}

/// Runs a typed request and serializes its result.
pub async fn dispatch(client: &TeamCityClient, request: ToolRequest) -> Result<Value, ApiError> {
    match request {
        ToolRequest::GetBuild { build_id } => to_json(client.get_build(build_id).await?),
        ToolRequest::ListBuilds(query) => to_json(client.list_builds(&query).await?),
        ToolRequest::ListQueuedBuilds { build_type_id } => {
            to_json(client.list_queued_builds(build_type_id.as_deref()).await?)
        }
        ToolRequest::TriggerBuild(request) => to_json(client.trigger_build(&request).await?),
        ToolRequest::CancelBuild { build_id, comment } => {
            to_json(client.cancel_build(build_id, comment.as_deref()).await?)
        }
        ToolRequest::CancelQueuedBuilds {
            build_type_id,
            comment,
        } => to_json(
            client
                .cancel_queued_builds(&build_type_id, comment.as_deref())
                .await?,
        ),
        ToolRequest::FetchBuildLog {
            build_id,
            tail,
            line_count,
        } => {
            let mode = if tail {
                LogMode::Tail {
                    lines: line_count.unwrap_or(DEFAULT_TAIL_LINES),
                }
            } else {
                LogMode::Full
            };
            to_json(client.fetch_build_log(build_id, mode).await?)
        }
        ToolRequest::ListArtifacts { build_id, path } => {
            to_json(client.list_artifacts(build_id, path.as_deref()).await?)
        }
        ToolRequest::GetArtifactMetadata { build_id, path } => {
            to_json(client.artifact_metadata(build_id, &path).await?)
        }
        ToolRequest::GetArtifactContent { build_id, path } => {
            to_json(client.artifact_content(build_id, &path).await?)
        }
        ToolRequest::ListAgents(query) => to_json(client.list_agents(&query).await?),
        ToolRequest::CompatibleAgents { build_type_id } => {
            to_json(client.compatible_agents(&build_type_id).await?)
        }
        ToolRequest::ListChanges(query) => to_json(client.list_changes(&query).await?),
        ToolRequest::ListMutedTests(query) => to_json(client.list_muted_tests(&query).await?),
        ToolRequest::ListTestOccurrences(query) => {
            to_json(client.list_test_occurrences(&query).await?)
        }
        ToolRequest::GetProject { project_id } => to_json(client.get_project(&project_id).await?),
        ToolRequest::ListProjects { parent_project_id } => {
            to_json(client.list_projects(parent_project_id.as_deref()).await?)
        }
        ToolRequest::ListBuildTypes { project_id } => {
            to_json(client.list_build_types(project_id.as_deref()).await?)
        }
        ToolRequest::ProjectTree {
            project_id,
            max_depth,
            max_nodes,
        } => {
            let bounds = TreeBounds::clamped(max_depth, max_nodes);
            let tree = client.project_tree(project_id.as_deref(), bounds).await?;
            let total = tree.total_projects();
            let mut value = to_json(tree)?;
            if let Value::Object(map) = &mut value {
                map.insert("total_projects".to_string(), Value::from(total));
            }
            Ok(value)
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Internal(format!("result could not be encoded: {e}")))
}

fn raw_operation(raw: &Value) -> String {
    raw.get("operation")
        .and_then(Value::as_str)
        .and_then(|op| sanitize_key(op, MAX_KEY_LENGTH))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Returns `true` if the response carries the given error code.
pub fn has_error_code(response: &ToolResponse, code: ErrorCode) -> bool {
    response.error.as_ref().is_some_and(|e| e.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_camel_case_params() {
        let request = ToolRequest::from_raw(&json!({
            "operation": "cancel_build",
            "params": {"buildId": 42, "comment": "superseded"}
        }))
        .unwrap();
        assert!(matches!(
            request,
            ToolRequest::CancelBuild { build_id: 42, comment: Some(ref c) } if c == "superseded"
        ));
    }

    #[test]
    fn test_missing_params_default_to_empty() {
        let request = ToolRequest::from_raw(&json!({"operation": "list_agents"})).unwrap();
        assert_eq!(request.name(), "list_agents");

        let request = ToolRequest::from_raw(&json!({"operation": "project_tree"})).unwrap();
        assert!(matches!(
            request,
            ToolRequest::ProjectTree { project_id: None, max_depth: None, max_nodes: None }
        ));
    }

    #[test]
    fn test_fetch_log_defaults_to_tail() {
        let request = ToolRequest::from_raw(&json!({
            "operation": "fetch_build_log",
            "params": {"buildId": 1}
        }))
        .unwrap();
        assert!(matches!(
            request,
            ToolRequest::FetchBuildLog { tail: true, line_count: None, .. }
        ));
    }

    #[test]
    fn test_unknown_operation_is_validation_error() {
        let err = ToolRequest::from_raw(&json!({"operation": "drop_database"})).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = ToolRequest::from_raw(&json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_params_are_sanitized_before_decoding() {
        let long_branch = "b".repeat(5000);
        let tags = vec!["a"; 300];
        let request = ToolRequest::from_raw(&json!({
            "operation": "list_builds",
            "params": {"branch": long_branch, "tags": tags}
        }))
        .unwrap();
        match request {
            ToolRequest::ListBuilds(query) => {
                assert_eq!(query.branch.unwrap().len(), 1000);
                assert_eq!(query.tags.len(), 100);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_raw_operation_name() {
        assert_eq!(raw_operation(&json!({"operation": "get build!"})), "getbuild");
        assert_eq!(raw_operation(&json!({})), "unknown");
    }

    #[test]
    fn test_execute_reports_validation_without_io() {
        let client = TeamCityClient::with_base_url("http://127.0.0.1:9", "secret-token").unwrap();
        let response = tokio_test::block_on(execute_tool(
            &client,
            &json!({"operation": "trigger_build", "params": {"branch": "secret-token"}}),
        ));
        assert!(!response.ok);
        assert!(has_error_code(&response, ErrorCode::ValidationError));
        let text = serde_json::to_string(&response).unwrap();
        assert!(!text.contains("secret-token"));
    }
}
