//
//  teamcity-client
//  security/endpoint.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Endpoint validation
//!
//! Every request path and query string is checked here before the transport is
//! allowed to touch the network. The path and the query are checked separately:
//! a query legitimately uses `=`, `&`, `?`, `(` and `)`, none of which may appear
//! in a path.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::common::ApiError;

/// Maximum length of a whole endpoint, path and query together.
pub const MAX_ENDPOINT_LENGTH: usize = 500;

const PATH_FORBIDDEN: &[char] = &['<', '>', '\'', '"', ';', '&', '|', '`', '$', '(', ')'];
const QUERY_FORBIDDEN: &[char] = &['<', '>', '\'', '"', '`', ';', '|', '$'];

/// A scheme where a URL could begin: at the start of the segment, or right after
/// a separator that opens a path element, query value or locator value.
static DANGEROUS_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(^|[/=&,(:]\s*)(javascript|data|file):").expect("valid scheme regex")
});

/// Validates an endpoint of the form `path[?query]`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when:
/// - the endpoint or its path is empty, or a `?` is followed by nothing
/// - the endpoint as a whole is longer than [`MAX_ENDPOINT_LENGTH`]
/// - the path contains `..`, any of `< > ' " ; & | \` $ ( )`, or starts an
///   element with a `javascript:`/`data:`/`file:` scheme
/// - the query contains any of `< > ' " \` ; | $`, or one of those schemes at the
///   start of a value
///
/// A scheme name inside ordinary text (`Big Data: Warehouse`, `metadata:`) is
/// not a scheme and is accepted.
///
/// # Example
///
/// ```rust
/// use teamcity_client::security::endpoint::validate_endpoint;
///
/// assert!(validate_endpoint("/builds?locator=project:(id:Foo),count:5").is_ok());
/// assert!(validate_endpoint("/builds/../users").is_err());
/// assert!(validate_endpoint("/builds/(id)").is_err());
/// ```
pub fn validate_endpoint(endpoint: &str) -> Result<(), ApiError> {
    if endpoint.is_empty() {
        return Err(invalid("endpoint is empty"));
    }
    if endpoint.chars().count() > MAX_ENDPOINT_LENGTH {
        return Err(invalid("endpoint is too long"));
    }

    let (path, query) = match endpoint.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (endpoint, None),
    };

    validate_path(path)?;
    if let Some(query) = query {
        validate_query(query)?;
    }
    Ok(())
}

/// Validates a path segment on its own.
pub fn validate_path(path: &str) -> Result<(), ApiError> {
    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.chars().count() > MAX_ENDPOINT_LENGTH {
        return Err(invalid("path is too long"));
    }
    if path.contains("..") {
        return Err(invalid("path traversal is not allowed"));
    }
    if path.contains(PATH_FORBIDDEN) {
        return Err(invalid("path contains forbidden characters"));
    }
    if DANGEROUS_SCHEME.is_match(path) {
        return Err(invalid("path contains a forbidden scheme"));
    }
    Ok(())
}

/// Validates a raw (not yet percent-encoded) query segment.
pub fn validate_query(query: &str) -> Result<(), ApiError> {
    if query.is_empty() {
        return Err(invalid("query is empty"));
    }
    if query.chars().count() > MAX_ENDPOINT_LENGTH {
        return Err(invalid("query is too long"));
    }
    if query.contains(QUERY_FORBIDDEN) {
        return Err(invalid("query contains forbidden characters"));
    }
    if DANGEROUS_SCHEME.is_match(query) {
        return Err(invalid("query contains a forbidden scheme"));
    }
    Ok(())
}

fn invalid(reason: &str) -> ApiError {
    ApiError::Validation(format!("Invalid endpoint: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(endpoint: &str) -> bool {
        matches!(validate_endpoint(endpoint), Err(ApiError::Validation(_)))
    }

    #[test]
    fn test_accepts_typical_endpoints() {
        assert!(validate_endpoint("/builds/id:123").is_ok());
        assert!(validate_endpoint("/projects/id:_Root").is_ok());
        assert!(validate_endpoint("/builds?locator=status:FAILURE,count:5&fields=build(id)").is_ok());
        assert!(validate_endpoint("/downloadBuildLog.html?buildId=7&plain=true").is_ok());
        assert!(validate_endpoint("/builds?locator=sinceDate:20240101T000000+0000").is_ok());
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(rejected(""));
        assert!(rejected("?locator=x"));
        assert!(rejected("/builds?"));
        assert!(rejected(&format!("/{}", "a".repeat(MAX_ENDPOINT_LENGTH))));
        assert!(rejected(&format!("/builds?q={}", "a".repeat(MAX_ENDPOINT_LENGTH))));
    }

    #[test]
    fn test_length_limit_covers_path_and_query_together() {
        let half = MAX_ENDPOINT_LENGTH / 2;
        assert!(rejected(&format!("/{}?q={}", "a".repeat(half), "b".repeat(half))));

        let fits = format!("/{}?q={}", "a".repeat(half - 4), "b".repeat(half - 4));
        assert!(fits.chars().count() <= MAX_ENDPOINT_LENGTH);
        assert!(validate_endpoint(&fits).is_ok());
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(rejected("/builds/../../etc/passwd"));
        assert!(rejected(".."));
    }

    #[test]
    fn test_rejects_each_forbidden_path_char() {
        for c in PATH_FORBIDDEN {
            assert!(rejected(&format!("/builds/id{c}1")), "char {c:?}");
        }
    }

    #[test]
    fn test_query_allows_what_path_forbids() {
        assert!(validate_endpoint("/agents?locator=compatible:(buildType:(id:Bt))&a=b").is_ok());
        assert!(rejected("/agents/compatible:(buildType:(id:Bt))"));
    }

    #[test]
    fn test_rejects_each_forbidden_query_char() {
        for c in QUERY_FORBIDDEN {
            assert!(rejected(&format!("/builds?locator=a{c}b")), "char {c:?}");
        }
    }

    #[test]
    fn test_rejects_dangerous_schemes_case_insensitive() {
        assert!(rejected("/javascript:alert"));
        assert!(rejected("/builds?x=JavaScript:alert"));
        assert!(rejected("/builds?x=DATA:text"));
        assert!(rejected("/file:/etc/passwd"));
        assert!(rejected("/builds?locator=branch:javascript:alert"));
        assert!(rejected("/builds?locator=project:(name: data:text)"));
        assert!(rejected("/builds?a=1&file:x=2"));
    }

    #[test]
    fn test_scheme_words_inside_text_are_allowed() {
        assert!(validate_endpoint("/buildTypes?locator=project:(name:Big Data: Warehouse)").is_ok());
        assert!(validate_endpoint("/builds?locator=branch:feature/metadata:v2").is_ok());
        assert!(validate_endpoint("/projects/id:BigData").is_ok());
    }

    #[test]
    fn test_only_first_question_mark_splits() {
        assert!(validate_endpoint("/builds?a=1?b=2").is_ok());
    }
}
