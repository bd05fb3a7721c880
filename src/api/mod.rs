//
//  teamcity-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the client for TeamCity's REST API (`/app/rest`).
//!
//! ## Architecture
//!
//! - [`client`]: The HTTP transport, with authentication, validation and size limits
//! - [`locator`]: Builder for TeamCity's `key:value,key:(inner:value)` filter syntax
//! - [`common`]: Internal [`ApiError`](common::ApiError) and caller-facing
//!   [`SafeError`](common::SafeError)
//! - Resource operations, each an `impl TeamCityClient` block:
//!   [`builds`], [`logs`], [`artifacts`], [`agents`], [`changes`],
//!   [`test_results`], [`projects`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use teamcity_client::api::{LogMode, TeamCityClient};
//!
//! # async fn example() -> Result<(), teamcity_client::api::common::ApiError> {
//! let client = TeamCityClient::with_base_url("https://ci.example.com", "token")?;
//!
//! let outcome = client.cancel_build(4211, Some("superseded")).await?;
//! println!("{}", outcome.describe());
//!
//! let log = client.fetch_build_log(4211, LogMode::Tail { lines: 50 }).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Operations return [`ApiError`](common::ApiError). Before handing an error to
//! anything outside the process, translate it with
//! [`TeamCityClient::safe_error`], which maps it to a closed
//! [`ErrorCode`](common::ErrorCode) and strips the token:
//!
//! - `401` → `AUTHENTICATION_FAILED`
//! - `404` → `RESOURCE_NOT_FOUND`
//! - `5xx`, timeouts, other statuses → `EXTERNAL_SERVICE_ERROR`

pub mod agents;
pub mod artifacts;
pub mod builds;
pub mod changes;
pub mod client;
pub mod common;
pub mod locator;
pub mod logs;
pub mod projects;
pub mod test_results;

pub use agents::{Agent, AgentQuery};
pub use artifacts::{Artifact, ArtifactContent};
pub use builds::{BatchCancelReport, Build, BuildState, CancelOutcome, TriggerBuildRequest};
pub use changes::{Change, ChangeQuery};
pub use client::TeamCityClient;
pub use locator::{BuildQuery, Locator};
pub use logs::{slice_log, BuildLog, LogExcerpt, LogMode};
pub use projects::{BuildType, Project, ProjectTree, TreeBounds};
pub use test_results::{Mute, MuteQuery, TestOccurrence, TestOccurrenceQuery};

use common::ApiError;

/// Longest identifier accepted in a request path.
const MAX_ID_LENGTH: usize = 225;

/// Checks a project or build configuration id before it goes into a path.
///
/// TeamCity ids are made of letters, digits, `_`, `.` and `-`.
pub(crate) fn checked_id<'a>(kind: &str, id: &'a str) -> Result<&'a str, ApiError> {
    let id = id.trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LENGTH
        && !id.contains("..")
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if valid {
        Ok(id)
    } else {
        Err(ApiError::Validation(format!("Invalid {kind} id")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_id() {
        assert_eq!(checked_id("project", " Web_Api ").unwrap(), "Web_Api");
        assert!(checked_id("project", "_Root").is_ok());
        assert!(checked_id("project", "").is_err());
        assert!(checked_id("project", "a/b").is_err());
        assert!(checked_id("project", "a..b").is_err());
        assert!(checked_id("project", "Web.Api").is_ok());
        assert!(checked_id("project", "a(b)").is_err());
        assert!(checked_id("project", &"x".repeat(300)).is_err());
    }
}
