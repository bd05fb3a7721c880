//
//  teamcity-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads the TeamCity server URL, the access token and a handful of defaults.
//!
//! ## Sources
//!
//! Values are resolved in this order, later sources winning:
//!
//! 1. Built-in defaults
//! 2. The TOML configuration file
//! 3. Environment variables (`TEAMCITY_URL`, `TEAMCITY_TOKEN`)
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/tc/config.toml`
//! - **macOS**: `~/Library/Application Support/tc/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\tc\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [server]
//! url = "https://ci.example.com"
//! token = "eyJ0eXAi..."
//!
//! [defaults]
//! log_tail_lines = 100
//! tree_max_depth = 10
//! tree_max_nodes = 200
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use teamcity_client::config::Config;
//!
//! let config = Config::load()?.with_env_overrides();
//! let client_config = config.client_config()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Submodules
//!
//! - [`file`]: Low-level configuration file I/O operations
//! - [`hosts`]: Server URL validation and normalization

mod file;
mod hosts;

pub use file::*;
pub use hosts::*;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::common::ApiError;
use crate::auth::AuthCredential;

/// Environment variable holding the server URL.
pub const ENV_SERVER_URL: &str = "TEAMCITY_URL";

/// Environment variable holding the access token.
pub const ENV_TOKEN: &str = "TEAMCITY_TOKEN";

/// Environment variable pointing at an alternative configuration file.
pub const ENV_CONFIG_PATH: &str = "TC_CONFIG";

/// Persistent configuration for the `tc` CLI and library callers.
///
/// # Fields
///
/// * `server` - Server URL and access token
/// * `defaults` - Operation defaults (log tail size, hierarchy bounds)
///
/// # Examples
///
/// ```rust
/// use teamcity_client::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.defaults.log_tail_lines, 100);
/// assert!(config.server.url.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Operation defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Server connection settings.
///
/// `Debug` hides the token.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// TeamCity server URL, with or without the `/app/rest` suffix.
    #[serde(default)]
    pub url: Option<String>,

    /// TeamCity access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Operation defaults.
///
/// | Field | Default |
/// |-------|---------|
/// | `log_tail_lines` | `100` |
/// | `tree_max_depth` | `10` |
/// | `tree_max_nodes` | `200` |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Number of lines returned by a tail log fetch when none is given.
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: usize,

    /// Maximum depth of a project hierarchy walk.
    #[serde(default = "default_tree_max_depth")]
    pub tree_max_depth: usize,

    /// Maximum number of projects fetched by a hierarchy walk.
    #[serde(default = "default_tree_max_nodes")]
    pub tree_max_nodes: usize,
}

fn default_log_tail_lines() -> usize {
    100
}

fn default_tree_max_depth() -> usize {
    10
}

fn default_tree_max_nodes() -> usize {
    200
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            log_tail_lines: default_log_tail_lines(),
            tree_max_depth: default_tree_max_depth(),
            tree_max_nodes: default_tree_max_nodes(),
        }
    }
}

impl Config {
    /// Loads the configuration from the default location.
    ///
    /// A missing file yields [`Config::default`].
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if config_exists(path) {
            let content = read_config_file(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_config_file(path, &content)
    }

    /// Returns the configuration file path, honoring `TC_CONFIG`.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("", "", "tc")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Applies `TEAMCITY_URL` / `TEAMCITY_TOKEN` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup (used for testing).
    ///
    /// Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER_URL).filter(|v| !v.trim().is_empty()) {
            self.server.url = Some(url);
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.server.token = Some(token);
        }
        self
    }

    /// Validates the connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when the URL or token is missing or invalid.
    pub fn client_config(&self) -> Result<ClientConfig, ApiError> {
        ClientConfig::new(
            self.server.url.as_deref().unwrap_or_default(),
            self.server.token.as_deref().unwrap_or_default(),
        )
    }

    /// Reads a setting by its dotted key.
    ///
    /// The token is reported only as set or unset.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "server.url" => self.server.url.clone(),
            "server.token" => self.server.token.as_ref().map(|_| "(set)".to_string()),
            "defaults.log_tail_lines" => Some(self.defaults.log_tail_lines.to_string()),
            "defaults.tree_max_depth" => Some(self.defaults.tree_max_depth.to_string()),
            "defaults.tree_max_nodes" => Some(self.defaults.tree_max_nodes.to_string()),
            _ => None,
        }
    }

    /// Updates a setting by its dotted key.
    ///
    /// Returns `false` for unknown keys or unparsable numbers.
    pub fn set(&mut self, key: &str, value: String) -> bool {
        match key {
            "server.url" => {
                self.server.url = Some(value);
                true
            }
            "server.token" => {
                self.server.token = Some(value);
                true
            }
            "defaults.log_tail_lines" => parse_into(&value, &mut self.defaults.log_tail_lines),
            "defaults.tree_max_depth" => parse_into(&value, &mut self.defaults.tree_max_depth),
            "defaults.tree_max_nodes" => parse_into(&value, &mut self.defaults.tree_max_nodes),
            _ => false,
        }
    }
}

fn parse_into(value: &str, slot: &mut usize) -> bool {
    match value.trim().parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

/// Validated connection settings, ready to build a client.
///
/// A `ClientConfig` only exists if the URL parsed with an http/https scheme and
/// the token is non-empty; there is no "not ready" client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    server_url: Url,
    credential: AuthCredential,
}

impl ClientConfig {
    /// Validates a server URL and token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the URL is invalid or the token is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use teamcity_client::config::ClientConfig;
    ///
    /// assert!(ClientConfig::new("https://ci.example.com", "token").is_ok());
    /// assert!(ClientConfig::new("https://ci.example.com", "  ").is_err());
    /// assert!(ClientConfig::new("ftp://ci.example.com", "token").is_err());
    /// ```
    pub fn new(server_url: &str, token: &str) -> Result<Self, ApiError> {
        let server_url = parse_server_url(server_url)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::Configuration(
                "TeamCity access token is not set".to_string(),
            ));
        }

        Ok(Self {
            server_url,
            credential: AuthCredential::bearer(token),
        })
    }

    /// Builds a configuration from `TEAMCITY_URL` and `TEAMCITY_TOKEN` only.
    pub fn from_env() -> Result<Self, ApiError> {
        Config::default().with_env_overrides().client_config()
    }

    /// The configured server URL.
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// The REST API base, normalized.
    pub fn api_url(&self) -> String {
        normalize_base_url(self.server_url.as_str())
    }

    /// The access token credential.
    pub fn credential(&self) -> &AuthCredential {
        &self.credential
    }
}
