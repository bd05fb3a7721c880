//
//  teamcity-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! TeamCity access tokens are sent as bearer tokens. This module wraps the token so
//! that it can be attached to requests without ever showing up in `Debug` output,
//! logs or error messages.
//!
//! ## Example
//!
//! ```rust
//! use teamcity_client::auth::AuthCredential;
//!
//! let credential = AuthCredential::bearer("eyJ0eXAi...");
//! assert_eq!(format!("{credential:?}"), "AuthCredential::Bearer(***)");
//! ```

use std::fmt;

use reqwest::RequestBuilder;

/// Credentials used to authenticate against TeamCity.
///
/// # Variants
///
/// - `Bearer`: A TeamCity access token, sent as `Authorization: Bearer <token>`.
///
/// # Notes
///
/// - `Debug` never prints the token.
/// - reqwest marks the resulting header as sensitive.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// Access token authentication.
    Bearer {
        /// The access token string.
        token: String,
    },
}

impl AuthCredential {
    /// Creates a bearer credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Returns the raw secret, for redaction purposes only.
    pub fn secret(&self) -> &str {
        match self {
            Self::Bearer { token } => token,
        }
    }

    /// Applies the authentication credential to an HTTP request.
    ///
    /// # Parameters
    ///
    /// - `request`: The [`RequestBuilder`] to add the `Authorization` header to.
    ///
    /// # Returns
    ///
    /// Returns the modified [`RequestBuilder`] with authentication applied.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer { token } => request.bearer_auth(token),
        }
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { .. } => f.write_str("AuthCredential::Bearer(***)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_token() {
        let credential = AuthCredential::bearer("top-secret");
        assert!(!format!("{credential:?}").contains("top-secret"));
        assert_eq!(credential.secret(), "top-secret");
    }

    #[test]
    fn test_apply_sets_bearer_header() {
        let credential = AuthCredential::bearer("abc");
        let request = credential
            .apply_to_request(reqwest::Client::new().get("http://localhost/"))
            .build()
            .unwrap();
        let header = request.headers().get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer abc");
        assert!(header.is_sensitive());
    }
}
