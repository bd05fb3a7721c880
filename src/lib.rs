//
//  teamcity-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # TeamCity Client Library
//!
//! A hardened client for the TeamCity REST API, plus the `tc` command-line tool
//! built on it.
//!
//! ## Overview
//!
//! The client is meant to sit behind callers that forward untrusted input, such as
//! a natural-language front end. Every request is bounded and validated before it
//! leaves the process, and every error is reduced to a token-free [`SafeError`]
//! before it is handed back.
//!
//! ## Features
//!
//! - **Request Security**: Parameter sanitization and endpoint validation before any I/O
//! - **Locators**: Builder for TeamCity's `key:value` filter syntax
//! - **Build Lifecycle**: Trigger, and cancel with queued/running/finished semantics
//! - **Logs**: Download endpoint with REST fallback, tail or full
//! - **Artifacts**: Inline text, metadata only for binary or large files
//! - **Hierarchy**: Bounded project tree walk
//!
//! ## Module Structure
//!
//! - [`api`]: Transport and resource operations
//! - [`security`]: Sanitizer and endpoint validator
//! - [`auth`]: Bearer credential
//! - [`config`]: Configuration file and environment
//! - [`tool`]: Untyped JSON operation boundary
//! - [`cli`]: Command-line interface definitions using clap
//! - [`output`]: Output formatting (Table, JSON)
//! - [`util`]: Utility functions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use teamcity_client::api::{BuildQuery, TeamCityClient};
//! use teamcity_client::config::ClientConfig;
//!
//! # async fn example() -> Result<(), teamcity_client::api::common::ApiError> {
//! let client = TeamCityClient::new(&ClientConfig::from_env()?)?;
//! let failed = client
//!     .list_builds(&BuildQuery { status: Some("FAILURE".into()), ..Default::default() })
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// TeamCity REST API transport and resource operations.
pub mod api;

/// Bearer token credential.
pub mod auth;

/// Configuration file management.
///
/// Manages the configuration stored in platform-specific locations:
/// - Linux: `~/.config/tc/config.toml`
/// - macOS: `~/Library/Application Support/tc/config.toml`
/// - Windows: `%APPDATA%\tc\config.toml`
///
/// `TEAMCITY_URL` and `TEAMCITY_TOKEN` override the file.
pub mod config;

/// Output formatting for different modes.
pub mod output;

/// Request sanitization and endpoint validation.
pub mod security;

/// JSON operation boundary for runtime-selected operations.
pub mod tool;

/// Utility functions and helpers.
pub mod util;

pub use api::common::{ApiError, ErrorCode, SafeError};
pub use api::TeamCityClient;
pub use cli::Cli;
pub use config::Config;

/// Application name constant.
///
/// The name of the CLI binary, used for display purposes and configuration paths.
pub const APP_NAME: &str = "tc";

/// Application version constant.
///
/// # Example
///
/// ```rust
/// use teamcity_client::VERSION;
///
/// println!("tc version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication and configuration issues
/// - `8-15`: Resource-related issues
/// - `32+`: External service issues
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// The server rejected the access token.
    pub const AUTH_ERROR: i32 = 4;

    /// Missing or invalid server URL or token; no operation was attempted.
    pub const CONFIG_ERROR: i32 = 5;

    /// The requested resource does not exist.
    pub const NOT_FOUND: i32 = 8;

    /// TeamCity failed, timed out or could not be reached.
    pub const EXTERNAL_ERROR: i32 = 32;

    use crate::api::common::ErrorCode;

    /// Maps an error code to the process exit code.
    pub fn for_error_code(code: ErrorCode) -> i32 {
        match code {
            ErrorCode::ValidationError => USAGE,
            ErrorCode::AuthenticationFailed => AUTH_ERROR,
            ErrorCode::ConfigurationError => CONFIG_ERROR,
            ErrorCode::ResourceNotFound => NOT_FOUND,
            ErrorCode::ExternalServiceError => EXTERNAL_ERROR,
            ErrorCode::InternalError => ERROR,
        }
    }
}
