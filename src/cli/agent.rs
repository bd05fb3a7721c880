//
//  teamcity-client
//  cli/agent.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build agent commands

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::api::{Agent, AgentQuery};
use crate::output::{format_bool, TableRow};

use super::{GlobalOptions, Session};

/// List build agents
#[derive(Args, Debug)]
pub struct AgentCommand {
    #[command(subcommand)]
    pub command: AgentSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AgentSubcommand {
    /// List agents
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// List agents that can run a build configuration
    Compatible(CompatibleArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only connected (true) or disconnected (false) agents
    #[arg(long)]
    pub connected: Option<bool>,

    /// Only enabled (true) or disabled (false) agents
    #[arg(long)]
    pub enabled: Option<bool>,

    /// Only authorized (true) or unauthorized (false) agents
    #[arg(long)]
    pub authorized: Option<bool>,

    /// Filter by agent pool name
    #[arg(long)]
    pub pool: Option<String>,

    /// Maximum number to show
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CompatibleArgs {
    /// Build configuration ID
    pub build_type: String,
}

impl TableRow for Agent {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "POOL", "CONNECTED", "ENABLED", "AUTHORIZED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.pool
                .as_ref()
                .and_then(|p| p.name.clone())
                .unwrap_or_else(|| "-".to_string()),
            format_bool(self.connected, color),
            format_bool(self.enabled, color),
            format_bool(self.authorized, color),
        ]
    }
}

impl AgentCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AgentSubcommand::List(args) => self.list(args, global).await,
            AgentSubcommand::Compatible(args) => self.compatible(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let query = AgentQuery {
            connected: args.connected,
            enabled: args.enabled,
            authorized: args.authorized,
            pool: args.pool.clone(),
            count: args.limit,
        };

        let agents = session
            .client
            .list_agents(&query)
            .await
            .map_err(|e| session.fail("list_agents", e))?;

        global.writer().write_list(&agents)
    }

    async fn compatible(&self, args: &CompatibleArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let agents = session
            .client
            .compatible_agents(&args.build_type)
            .await
            .map_err(|e| session.fail("compatible_agents", e))?;

        global.writer().write_list(&agents)
    }
}
