//
//  teamcity-client
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Server URL Module
//!
//! Validation and normalization of the TeamCity server URL.
//!
//! ## Overview
//!
//! TeamCity serves its REST API under a fixed root segment, `/app/rest`. Users may
//! configure either the plain server URL or the API URL; both normalize to the same
//! API base. A few endpoints (the plain build log download) live outside the API
//! root and are addressed from the server root instead.
//!
//! | Configured | API base | Server root |
//! |------------|----------|-------------|
//! | `https://ci.example.com/` | `https://ci.example.com/app/rest` | `https://ci.example.com` |
//! | `https://ci.example.com/tc/app/rest` | `https://ci.example.com/tc/app/rest` | `https://ci.example.com/tc` |
//!
//! ## Usage
//!
//! ```rust
//! use teamcity_client::config::{normalize_base_url, server_root};
//!
//! let api = normalize_base_url("https://ci.example.com/");
//! assert_eq!(api, "https://ci.example.com/app/rest");
//! assert_eq!(server_root(&api), "https://ci.example.com");
//! ```

use url::Url;

use crate::api::common::ApiError;

/// The fixed REST API root segment.
pub const API_ROOT: &str = "/app/rest";

/// Normalizes a configured server URL to the REST API base.
///
/// Trailing slashes are removed and [`API_ROOT`] is appended if absent. The
/// operation is idempotent.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(API_ROOT) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_ROOT}")
    }
}

/// Strips [`API_ROOT`] from a normalized API base.
pub fn server_root(api_url: &str) -> String {
    api_url
        .strip_suffix(API_ROOT)
        .unwrap_or(api_url)
        .trim_end_matches('/')
        .to_string()
}

/// Parses and validates a server URL.
///
/// # Errors
///
/// Returns [`ApiError::Configuration`] if the URL does not parse, has no host, or
/// uses a scheme other than `http`/`https`. The error message never echoes the URL.
///
/// A query string or fragment is dropped; neither belongs in the API base.
pub fn parse_server_url(raw: &str) -> Result<Url, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::Configuration(
            "TeamCity server URL is not set".to_string(),
        ));
    }

    let mut url = Url::parse(raw).map_err(|_| {
        ApiError::Configuration("TeamCity server URL is not a valid URL".to_string())
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::Configuration(
            "TeamCity server URL must use http or https".to_string(),
        ));
    }
    if url.host_str().is_none() {
        return Err(ApiError::Configuration(
            "TeamCity server URL has no host".to_string(),
        ));
    }

    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
