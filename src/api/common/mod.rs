//
//  teamcity-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the TeamCity client
//!
//! This module provides the error types shared by every resource operation.
//!
//! # Overview
//!
//! - [`ApiError`] - Internal error type returned by all client operations
//! - [`SafeError`] - Sanitized projection of an [`ApiError`] handed to callers
//! - [`ErrorCode`] - Closed set of error classes carried by a [`SafeError`]
//!
//! # Example
//!
//! ```rust
//! use teamcity_client::api::common::{ApiError, ErrorCode, SafeError};
//!
//! let err = ApiError::NotFound { path: "/builds/id:42".to_string() };
//! let safe = SafeError::from_api_error("get_build", &err, None);
//! assert_eq!(safe.code, ErrorCode::ResourceNotFound);
//! ```
//!
//! # Notes
//!
//! - [`ApiError`] never stores a full URL; status errors carry the request path only
//! - Network errors are stripped of their URL before they are wrapped

use thiserror::Error;

mod safe_error;

pub use safe_error::*;

/// Unified error type for all TeamCity API operations.
///
/// # Variants
///
/// | Variant | Description | Error code |
/// |---------|-------------|------------|
/// | `Validation` | Caller input rejected before any I/O | `VALIDATION_ERROR` |
/// | `Configuration` | Missing or invalid client configuration | `CONFIGURATION_ERROR` |
/// | `AuthFailed` | HTTP 401 | `AUTHENTICATION_FAILED` |
/// | `NotFound` | HTTP 404 | `RESOURCE_NOT_FOUND` |
/// | `BuildTypeNotFound` | Unknown build configuration | `RESOURCE_NOT_FOUND` |
/// | `ProjectNotFound` | Unknown project | `RESOURCE_NOT_FOUND` |
/// | `ServerError` | HTTP 5xx | `EXTERNAL_SERVICE_ERROR` |
/// | `UnexpectedStatus` | Any other non-2xx status | `EXTERNAL_SERVICE_ERROR` |
/// | `TooLarge` | Body over the transport ceiling | `EXTERNAL_SERVICE_ERROR` |
/// | `Network` | Timeout, connect or protocol failure | `EXTERNAL_SERVICE_ERROR` |
/// | `Decode` | Response body did not match the expected shape | `EXTERNAL_SERVICE_ERROR` |
/// | `Internal` | Unclassified | `INTERNAL_ERROR` |
#[derive(Error, Debug)]
pub enum ApiError {
    /// The caller supplied input the client refuses to send.
    ///
    /// Raised before any network I/O and never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The client could not be configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The server rejected the access token (HTTP 401).
    #[error("Authentication failed for {path}")]
    AuthFailed {
        /// Request path, without query string
        path: String,
    },

    /// The token is valid but lacks permission (HTTP 403).
    #[error("Permission denied for {path}")]
    Forbidden {
        /// Request path, without query string
        path: String,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("Resource not found: {path}")]
    NotFound {
        /// Request path, without query string
        path: String,
    },

    /// A build configuration referenced by the caller does not exist.
    #[error("Build configuration not found: {0}")]
    BuildTypeNotFound(String),

    /// A project referenced by the caller does not exist.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// The server failed to handle the request (HTTP 5xx).
    #[error("Server error (HTTP {status}) for {path}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Request path, without query string
        path: String,
    },

    /// Any other non-success status.
    #[error("Unexpected response (HTTP {status}) for {path}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Request path, without query string
        path: String,
    },

    /// The response body exceeded the transport ceiling for its kind.
    #[error("Response body exceeds the {limit} byte limit")]
    TooLarge {
        /// The ceiling that was exceeded, in bytes
        limit: u64,
    },

    /// A network-level error occurred during the request.
    ///
    /// The wrapped error has had its URL removed.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// An unexpected or unclassified failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Builds the error for a non-success HTTP status.
    ///
    /// # Parameters
    ///
    /// * `status` - The HTTP status code returned by the server
    /// * `path` - The request path, already stripped of its query string
    ///
    /// # Example
    ///
    /// ```rust
    /// use teamcity_client::api::common::ApiError;
    ///
    /// let err = ApiError::from_status(503, "/builds");
    /// assert_eq!(err.status(), Some(503));
    /// ```
    pub fn from_status(status: u16, path: &str) -> Self {
        let path = path.to_string();
        match status {
            401 => Self::AuthFailed { path },
            403 => Self::Forbidden { path },
            404 => Self::NotFound { path },
            s if s >= 500 => Self::ServerError { status: s, path },
            s => Self::UnexpectedStatus { status: s, path },
        }
    }

    /// Returns the HTTP status behind this error, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthFailed { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::ServerError { status, .. } | Self::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for every "does not exist" flavour of error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::BuildTypeNotFound(_) | Self::ProjectNotFound(_)
        )
    }

    /// Returns the request path this error relates to, if known.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::AuthFailed { path }
            | Self::Forbidden { path }
            | Self::NotFound { path }
            | Self::ServerError { path, .. }
            | Self::UnexpectedStatus { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(ApiError::from_status(401, "/x"), ApiError::AuthFailed { .. }));
        assert!(matches!(ApiError::from_status(403, "/x"), ApiError::Forbidden { .. }));
        assert!(matches!(ApiError::from_status(404, "/x"), ApiError::NotFound { .. }));
        assert!(matches!(
            ApiError::from_status(502, "/x"),
            ApiError::ServerError { status: 502, .. }
        ));
        assert!(matches!(
            ApiError::from_status(409, "/x"),
            ApiError::UnexpectedStatus { status: 409, .. }
        ));
    }

    #[test]
    fn test_not_found_family() {
        assert!(ApiError::from_status(404, "/builds/id:1").is_not_found());
        assert!(ApiError::BuildTypeNotFound("Bt".into()).is_not_found());
        assert!(ApiError::ProjectNotFound("P".into()).is_not_found());
        assert!(!ApiError::from_status(500, "/builds").is_not_found());
    }

    #[test]
    fn test_endpoint_is_path_only() {
        let err = ApiError::from_status(500, "/builds/id:7");
        assert_eq!(err.endpoint(), Some("/builds/id:7"));
        assert_eq!(ApiError::Validation("bad".into()).endpoint(), None);
    }
}
