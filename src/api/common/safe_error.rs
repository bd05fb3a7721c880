//
//  teamcity-client
//  api/common/safe_error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Secure error translation
//!
//! Converts an internal [`ApiError`] into a [`SafeError`]: a closed error code, a
//! message that never carries credentials, internal URLs or source chains, and a
//! correlation id built from the operation name and a timestamp.
//!
//! Only locally produced, known-safe errors (validation and configuration) keep their
//! original message. Everything that came back from the wire gets a fixed message.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ApiError;

/// Closed set of error classes exposed to callers.
///
/// Serialized in `SCREAMING_SNAKE_CASE`, e.g. `RESOURCE_NOT_FOUND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad caller input, caught before any I/O
    ValidationError,
    /// The target resource does not exist
    ResourceNotFound,
    /// The server rejected the credentials
    AuthenticationFailed,
    /// Transport or remote failure, including timeouts and 5xx
    ExternalServiceError,
    /// The client is not configured
    ConfigurationError,
    /// Anything unclassified
    InternalError,
}

impl ErrorCode {
    /// Returns the wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ApiError> for ErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Validation(_) => Self::ValidationError,
            ApiError::Configuration(_) => Self::ConfigurationError,
            ApiError::AuthFailed { .. } => Self::AuthenticationFailed,
            ApiError::NotFound { .. }
            | ApiError::BuildTypeNotFound(_)
            | ApiError::ProjectNotFound(_) => Self::ResourceNotFound,
            ApiError::Forbidden { .. }
            | ApiError::ServerError { .. }
            | ApiError::UnexpectedStatus { .. }
            | ApiError::TooLarge { .. }
            | ApiError::Network(_)
            | ApiError::Decode(_) => Self::ExternalServiceError,
            ApiError::Internal(_) => Self::InternalError,
        }
    }
}

/// The sanitized error returned to callers of the client.
///
/// # Fields
///
/// * `code` - Closed error class
/// * `message` - Human readable message, free of tokens and URLs
/// * `correlation_id` - `<operation>-<unix millis>`, for matching against logs
/// * `endpoint` - The request path involved, when there was one (never a query string)
///
/// # Example
///
/// ```rust
/// use teamcity_client::api::common::{ApiError, ErrorCode, SafeError};
///
/// let err = ApiError::from_status(401, "/builds");
/// let safe = SafeError::from_api_error("list_builds", &err, Some("s3cr3t"));
/// assert_eq!(safe.code, ErrorCode::AuthenticationFailed);
/// assert!(safe.correlation_id.starts_with("list_builds-"));
/// assert!(!safe.message.contains("s3cr3t"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeError {
    pub code: ErrorCode,
    pub message: String,
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl SafeError {
    /// Creates a safe error directly from a code and a local message.
    ///
    /// The message is still passed through [`redact`] when a secret is given.
    pub fn new(operation: &str, code: ErrorCode, message: &str, secret: Option<&str>) -> Self {
        Self {
            code,
            message: redact(message, secret),
            correlation_id: correlation_id(operation),
            endpoint: None,
        }
    }

    /// Translates an [`ApiError`] raised by `operation`.
    ///
    /// # Parameters
    ///
    /// * `operation` - Name of the client operation that failed
    /// * `err` - The internal error
    /// * `secret` - The configured bearer token, redacted from the message if present
    pub fn from_api_error(operation: &str, err: &ApiError, secret: Option<&str>) -> Self {
        let code = ErrorCode::from(err);
        let message = safe_message(operation, err);

        tracing::debug!(
            operation,
            code = code.as_str(),
            "translated error: {}",
            redact(&err.to_string(), secret)
        );

        Self {
            code,
            message: redact(&message, secret),
            correlation_id: correlation_id(operation),
            endpoint: err.endpoint().map(strip_query),
        }
    }
}

impl fmt::Display for SafeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (ref: {})", self.code, self.message, self.correlation_id)
    }
}

impl std::error::Error for SafeError {}

fn safe_message(operation: &str, err: &ApiError) -> String {
    match err {
        ApiError::Validation(msg) | ApiError::Configuration(msg) => msg.clone(),
        ApiError::AuthFailed { .. } => {
            "Authentication failed; check the configured access token".to_string()
        }
        ApiError::Forbidden { .. } => {
            format!("{operation} is not permitted for the configured token")
        }
        ApiError::NotFound { .. } => format!("{operation}: requested resource was not found"),
        ApiError::BuildTypeNotFound(id) => format!("Build configuration '{id}' was not found"),
        ApiError::ProjectNotFound(id) => format!("Project '{id}' was not found"),
        ApiError::ServerError { status, .. } | ApiError::UnexpectedStatus { status, .. } => {
            format!("{operation} failed: TeamCity returned HTTP {status}")
        }
        ApiError::TooLarge { limit } => {
            format!("{operation} failed: response exceeds the {limit} byte limit")
        }
        ApiError::Network(e) if e.is_timeout() => format!("{operation} timed out"),
        ApiError::Network(_) => format!("{operation} failed: TeamCity could not be reached"),
        ApiError::Decode(_) => format!("{operation} failed: unexpected response from TeamCity"),
        ApiError::Internal(_) => format!("{operation} failed due to an internal error"),
    }
}

/// Builds a correlation id of the form `<operation>-<unix millis>`.
pub fn correlation_id(operation: &str) -> String {
    format!("{}-{}", operation, Utc::now().timestamp_millis())
}

/// Replaces every occurrence of `secret` in `message` with `***`.
///
/// Empty secrets are ignored.
///
/// # Example
///
/// ```rust
/// use teamcity_client::api::common::redact;
///
/// assert_eq!(redact("token abc used", Some("abc")), "token *** used");
/// assert_eq!(redact("nothing", None), "nothing");
/// ```
pub fn redact(message: &str, secret: Option<&str>) -> String {
    match secret {
        Some(s) if !s.is_empty() => message.replace(s, "***"),
        _ => message.to_string(),
    }
}

fn strip_query(path: &str) -> String {
    path.split('?').next().unwrap_or_default().to_string()
}
