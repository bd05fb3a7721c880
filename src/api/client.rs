//
//  teamcity-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Transport for the TeamCity REST API
//!
//! This module provides the single HTTP client every resource operation goes through.
//!
//! ## Features
//!
//! - Bearer authentication on every request
//! - 30 second timeout and a redirect limit of 3
//! - Endpoint validation and query/body sanitization before any network I/O
//! - Response size ceilings (10 MB for JSON and text, 50 MB for raw bytes)
//! - Centralized translation of non-success statuses into [`ApiError`]
//! - Request logging as method and path only
//!
//! ## Request Pipeline
//!
//! ```text
//! sanitize query -> validate endpoint -> log -> send -> check_response -> read_limited
//! ```

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{redirect, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::common::{ApiError, SafeError};
use crate::auth::AuthCredential;
use crate::config::{server_root, ClientConfig};
use crate::security::{sanitize_body, sanitize_query, validate_endpoint};

/// Request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of redirects followed.
pub const MAX_REDIRECTS: usize = 3;

/// Ceiling for JSON and plain text responses.
pub const MAX_TEXT_BYTES: u64 = 10 * 1024 * 1024;

/// Ceiling for raw byte responses.
pub const MAX_BINARY_BYTES: u64 = 50 * 1024 * 1024;

/// Negotiated response representation.
///
/// | Variant | `Accept` | Ceiling |
/// |---------|----------|---------|
/// | `Json` | `application/json` | [`MAX_TEXT_BYTES`] |
/// | `Text` | `text/plain` | [`MAX_TEXT_BYTES`] |
/// | `Binary` | `application/octet-stream` | [`MAX_BINARY_BYTES`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Json,
    Text,
    Binary,
}

impl Accept {
    fn header(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain",
            Self::Binary => "application/octet-stream",
        }
    }

    /// The size ceiling for this representation, in bytes.
    pub fn limit(self) -> u64 {
        match self {
            Self::Json | Self::Text => MAX_TEXT_BYTES,
            Self::Binary => MAX_BINARY_BYTES,
        }
    }
}

/// Which base an endpoint path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoot {
    /// `<server>/app/rest`
    Rest,
    /// `<server>`, for endpoints outside the REST API such as the plain log download
    Server,
}

/// The TeamCity API client.
///
/// Built once from a validated [`ClientConfig`] and immutable afterwards, so it can
/// be cloned and shared freely between tasks.
///
/// # Example
///
/// ```rust,no_run
/// use teamcity_client::api::TeamCityClient;
/// use teamcity_client::config::ClientConfig;
///
/// # async fn example() -> Result<(), teamcity_client::api::common::ApiError> {
/// let config = ClientConfig::new("https://ci.example.com", "token")?;
/// let client = TeamCityClient::new(&config)?;
/// let build = client.get_build(1234).await?;
/// println!("{} is {:?}", build.number.unwrap_or_default(), build.state);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TeamCityClient {
    /// The underlying HTTP client
    http: Client,
    /// Normalized REST API base, e.g. `https://ci.example.com/app/rest`
    api_url: String,
    /// Server root, e.g. `https://ci.example.com`
    server_root: String,
    /// Bearer credential
    auth: AuthCredential,
}

impl TeamCityClient {
    /// Creates a client from validated connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(format!("tc/{}", crate::VERSION))
            .timeout(REQUEST_TIMEOUT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|_| ApiError::Configuration("HTTP client could not be built".to_string()))?;

        let api_url = config.api_url();
        Ok(Self {
            http,
            server_root: server_root(&api_url),
            api_url,
            auth: config.credential().clone(),
        })
    }

    /// Shorthand for [`ClientConfig::new`] followed by [`TeamCityClient::new`].
    pub fn with_base_url(server_url: &str, token: &str) -> Result<Self, ApiError> {
        Self::new(&ClientConfig::new(server_url, token)?)
    }

    /// The normalized REST API base.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The server root, without the REST API segment.
    pub fn server_root(&self) -> &str {
        &self.server_root
    }

    /// Translates an error raised by `operation` into its caller-facing form,
    /// redacting the configured token.
    pub fn safe_error(&self, operation: &str, err: &ApiError) -> SafeError {
        SafeError::from_api_error(operation, err, Some(self.auth.secret()))
    }

    /// GETs a JSON resource from the REST API.
    ///
    /// # Parameters
    ///
    /// * `path` - The API path (e.g., "/builds/id:42")
    /// * `query` - Query parameters; sanitized, then validated in raw form
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The endpoint fails validation (no request is sent)
    /// - The network request fails or the status is not 2xx
    /// - The body exceeds [`MAX_TEXT_BYTES`] or does not decode into `T`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, Value)],
    ) -> Result<T, ApiError> {
        let response = self
            .send(Method::GET, ApiRoot::Rest, path, query, None, Accept::Json)
            .await?;
        let bytes = read_limited(response, Accept::Json.limit()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GETs a plain text resource from the REST API.
    pub async fn get_text(&self, path: &str, query: &[(&str, Value)]) -> Result<String, ApiError> {
        self.get_text_at(ApiRoot::Rest, path, query).await
    }

    /// GETs a plain text resource relative to the given root.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; build logs are not
    /// guaranteed to be clean.
    pub async fn get_text_at(
        &self,
        root: ApiRoot,
        path: &str,
        query: &[(&str, Value)],
    ) -> Result<String, ApiError> {
        let response = self
            .send(Method::GET, root, path, query, None, Accept::Text)
            .await?;
        let bytes = read_limited(response, Accept::Text.limit()).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// GETs raw bytes from the REST API, up to [`MAX_BINARY_BYTES`].
    pub async fn get_bytes(&self, path: &str, query: &[(&str, Value)]) -> Result<Vec<u8>, ApiError> {
        let response = self
            .send(Method::GET, ApiRoot::Rest, path, query, None, Accept::Binary)
            .await?;
        read_limited(response, Accept::Binary.limit()).await
    }

    /// POSTs a JSON body and decodes the JSON response.
    ///
    /// The body is sanitized with the POST limits before it is sent.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_value(body)?;
        let response = self
            .send(Method::POST, ApiRoot::Rest, path, &[], Some(body), Accept::Json)
            .await?;
        let bytes = read_limited(response, Accept::Json.limit()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// POSTs a JSON body and ignores the response body.
    pub async fn post_discard<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let body = to_value(body)?;
        self.send(Method::POST, ApiRoot::Rest, path, &[], Some(body), Accept::Json)
            .await?;
        Ok(())
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, ApiRoot::Rest, path, &[], None, Accept::Json)
            .await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        root: ApiRoot,
        path: &str,
        query: &[(&str, Value)],
        body: Option<Value>,
        accept: Accept,
    ) -> Result<Response, ApiError> {
        let pairs = sanitize_query(query);
        if pairs.is_empty() {
            validate_endpoint(path)?;
        } else {
            let raw_query = pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            validate_endpoint(&format!("{path}?{raw_query}"))?;
        }

        let base = match root {
            ApiRoot::Rest => &self.api_url,
            ApiRoot::Server => &self.server_root,
        };

        tracing::debug!("{} {}", method, path);

        let mut request = self
            .http
            .request(method, format!("{base}{path}"))
            .header(ACCEPT, accept.header());
        if !pairs.is_empty() {
            request = request.query(&pairs);
        }
        if let Some(body) = body {
            request = request.json(&sanitize_body(&body));
        }
        request = self.auth.apply_to_request(request);

        let response = request.send().await?;
        check_response(response, path)
    }
}

/// Translates a non-success status into an [`ApiError`].
///
/// This is the only place statuses are interpreted. The response body of a failed
/// request is never read, so server error text cannot reach the caller.
pub fn check_response(response: Response, path: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::debug!("{} returned HTTP {}", path, status.as_u16());
        Err(ApiError::from_status(status.as_u16(), path))
    }
}

/// Reads a response body, failing once it exceeds `limit` bytes.
///
/// The declared `Content-Length` is checked first; the running total is checked
/// per chunk, so an undeclared oversized body is cut off early.
pub async fn read_limited(mut response: Response, limit: u64) -> Result<Vec<u8>, ApiError> {
    if response.content_length().is_some_and(|len| len > limit) {
        return Err(ApiError::TooLarge { limit });
    }

    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if (buf.len() + chunk.len()) as u64 > limit {
            return Err(ApiError::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn to_value<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Internal(format!("request body could not be encoded: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_normalizes_urls() {
        let client = TeamCityClient::with_base_url("https://ci.example.com/", "t").unwrap();
        assert_eq!(client.api_url(), "https://ci.example.com/app/rest");
        assert_eq!(client.server_root(), "https://ci.example.com");
    }

    #[test]
    fn test_client_debug_hides_token() {
        let client = TeamCityClient::with_base_url("https://ci.example.com", "s3cr3t-token").unwrap();
        assert!(!format!("{client:?}").contains("s3cr3t-token"));
    }

    #[test]
    fn test_safe_error_redacts_token() {
        let client = TeamCityClient::with_base_url("https://ci.example.com", "s3cr3t").unwrap();
        let err = ApiError::Validation("value s3cr3t rejected".into());
        let safe = client.safe_error("list_builds", &err);
        assert_eq!(safe.message, "value *** rejected");
    }

    #[test]
    fn test_accept_limits() {
        assert_eq!(Accept::Json.limit(), 10 * 1024 * 1024);
        assert_eq!(Accept::Text.limit(), Accept::Json.limit());
        assert_eq!(Accept::Binary.limit(), 50 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_validation_happens_before_io() {
        // Port 9 is never contacted: validation fails first.
        let client = TeamCityClient::with_base_url("http://127.0.0.1:9", "t").unwrap();
        let err = client
            .get::<Value>("/builds/../users", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = client
            .get::<Value>("/builds", &[("locator", Value::from("name:<script>"))])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
