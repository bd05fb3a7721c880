//
//  teamcity-client
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Reads and writes the `[server]` and `[defaults]` tables of the configuration
//! file. The token is never printed; `get` and `list` only report whether it is
//! set.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{parse_server_url, Config};

use super::GlobalOptions;

/// Valid configuration keys
const VALID_KEYS: &[&str] = &[
    "server.url",
    "server.token",
    "defaults.log_tail_lines",
    "defaults.tree_max_depth",
    "defaults.tree_max_nodes",
];

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value; prompted for (hidden) when setting the token
    pub value: Option<String>,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global).await,
            ConfigSubcommand::Set(args) => self.set(args, global).await,
            ConfigSubcommand::List => self.list(global).await,
            ConfigSubcommand::Path => self.path(global).await,
        }
    }

    /// Get a configuration value
    async fn get(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        check_key(&args.key)?;
        let config = Config::load()?;
        let value = config.get(&args.key);

        if global.json {
            let result = serde_json::json!({
                "key": args.key,
                "value": value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if let Some(v) = value {
            println!("{}", v);
        }

        Ok(())
    }

    /// Set a configuration value
    async fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        check_key(&args.key)?;
        let secret = args.key == "server.token";

        let value = match &args.value {
            Some(value) => value.clone(),
            None if secret && !global.no_prompt => dialoguer::Password::new()
                .with_prompt("TeamCity access token")
                .interact()?,
            None => bail!("A value is required for '{}'", args.key),
        };

        if args.key == "server.url" {
            parse_server_url(&value)?;
        }

        let mut config = Config::load()?;
        if !config.set(&args.key, value.clone()) {
            bail!("Invalid value for '{}': expected a number", args.key);
        }
        config.save()?;

        let shown = if secret { "(set)".to_string() } else { value };
        if global.json {
            let result = serde_json::json!({
                "success": true,
                "key": args.key,
                "value": shown,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!(
                "{} Set {} = {}",
                style("✓").green(),
                style(&args.key).cyan(),
                shown
            );
        }

        Ok(())
    }

    /// List all configuration values
    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;

        if global.json {
            let values: serde_json::Map<String, serde_json::Value> = VALID_KEYS
                .iter()
                .map(|key| (key.to_string(), serde_json::json!(config.get(key))))
                .collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
            return Ok(());
        }

        println!();
        println!("{}", style("Configuration").bold());
        println!("{}", "-".repeat(50));
        for key in VALID_KEYS {
            let value = config
                .get(key)
                .unwrap_or_else(|| style("(not set)").dim().to_string());
            println!("  {:<26} {}", style(key).cyan(), value);
        }
        println!();

        Ok(())
    }

    /// Show configuration file path
    async fn path(&self, global: &GlobalOptions) -> Result<()> {
        let path = Config::config_path()?;

        if global.json {
            let result = serde_json::json!({
                "path": path,
                "exists": path.exists(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", path.display());
        }

        Ok(())
    }
}

fn check_key(key: &str) -> Result<()> {
    if !VALID_KEYS.contains(&key) {
        bail!(
            "Unknown configuration key '{}'. Valid keys: {}",
            key,
            VALID_KEYS.join(", ")
        );
    }
    Ok(())
}
