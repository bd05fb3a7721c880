//
//  teamcity-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod agent;
mod artifact;
mod build;
mod call;
mod change;
mod completion;
mod config;
mod mute;
mod project;

pub use agent::AgentCommand;
pub use artifact::ArtifactCommand;
pub use build::BuildCommand;
pub use call::CallCommand;
pub use change::ChangeCommand;
pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use mute::MuteCommand;
pub use project::ProjectCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::common::{ApiError, ErrorCode, SafeError};
use crate::api::TeamCityClient;
use crate::config::{Config, ENV_SERVER_URL, ENV_TOKEN};
use crate::output::{OutputFormat, OutputWriter};

/// TeamCity CLI - Work with TeamCity from the command line
#[derive(Parser, Debug)]
#[command(
    name = "tc",
    version,
    about = "Work with TeamCity from the command line",
    long_about = "tc is a CLI for the TeamCity REST API.\n\n\
                  It brings builds, logs, artifacts, agents and the project hierarchy to your terminal.",
    propagate_version = true,
    after_help = "Use 'tc <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// TeamCity server URL
    #[arg(long, short = 's', global = true, env = ENV_SERVER_URL)]
    pub server: Option<String>,

    /// TeamCity access token
    #[arg(long, global = true, env = ENV_TOKEN, hide = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long, global = true, env = "TC_NO_PROMPT")]
    pub no_prompt: bool,
}

impl GlobalOptions {
    pub(crate) fn writer(&self) -> OutputWriter {
        OutputWriter::new(OutputFormat::from_json_flag(self.json))
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect, trigger and cancel builds
    #[command(visible_alias = "b")]
    Build(BuildCommand),

    /// Browse build artifacts
    Artifact(ArtifactCommand),

    /// List build agents
    Agent(AgentCommand),

    /// List VCS changes
    Change(ChangeCommand),

    /// Browse projects and build configurations
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// Inspect muted tests and test results
    Mute(MuteCommand),

    /// Run a JSON operation request
    Call(CallCommand),

    /// Manage CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}

/// A configured client plus the settings it was built from.
pub(crate) struct Session {
    pub client: TeamCityClient,
    pub config: Config,
}

impl Session {
    /// Resolves the configuration (file, then environment, then flags) and builds a
    /// client.
    ///
    /// Configuration problems surface as a [`SafeError`] with the
    /// `CONFIGURATION_ERROR` code.
    pub fn connect(global: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load()
            .map_err(|_| {
                // The parser's message quotes the offending line, which may hold the token.
                anyhow::Error::new(SafeError::new(
                    "connect",
                    ErrorCode::ConfigurationError,
                    "Configuration file could not be read; fix it or point TC_CONFIG elsewhere",
                    None,
                ))
            })?
            .with_env_overrides();
        if let Some(server) = global.server.as_deref().filter(|s| !s.trim().is_empty()) {
            config.server.url = Some(server.to_string());
        }
        if let Some(token) = global.token.as_deref().filter(|t| !t.trim().is_empty()) {
            config.server.token = Some(token.to_string());
        }

        let client = config
            .client_config()
            .and_then(|client_config| TeamCityClient::new(&client_config))
            .map_err(|e| {
                anyhow::Error::new(SafeError::from_api_error(
                    "connect",
                    &e,
                    config.server.token.as_deref(),
                ))
            })?;

        Ok(Self { client, config })
    }

    /// Converts an API failure into the sanitized error the CLI reports.
    pub fn fail(&self, operation: &str, err: ApiError) -> anyhow::Error {
        anyhow::Error::new(self.client.safe_error(operation, &err))
    }
}

/// Asks for confirmation unless `--yes` or `--no-prompt` was given.
pub(crate) fn confirm(prompt: &str, yes: bool, global: &GlobalOptions) -> Result<bool> {
    if yes || global.no_prompt {
        return Ok(true);
    }

    use dialoguer::Confirm;
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(confirmed)
}
