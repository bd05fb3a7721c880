//
//  teamcity-client
//  cli/mute.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Muted test and test result commands

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::api::{Mute, MuteQuery, TestOccurrence, TestOccurrenceQuery};
use crate::output::{format_bool, format_status, TableRow};
use crate::util::{format_duration, truncate};

use super::{GlobalOptions, Session};

/// Inspect muted tests and test results
#[derive(Args, Debug)]
pub struct MuteCommand {
    #[command(subcommand)]
    pub command: MuteSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MuteSubcommand {
    /// List muted tests
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// List the test results of a build
    Tests(TestsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Raw TeamCity locator
    #[arg(long)]
    pub locator: Option<String>,

    /// Filter by project ID
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Maximum number to show (capped at 1000)
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Fetch up to the maximum of 1000
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct TestsArgs {
    /// Build ID
    pub build_id: u64,

    /// Filter by status (SUCCESS, FAILURE, UNKNOWN)
    #[arg(long)]
    pub status: Option<String>,

    /// Maximum number to show
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,
}

impl TableRow for Mute {
    fn headers() -> &'static [&'static str] {
        &["ID", "TESTS", "SCOPE", "BY", "UNMUTE"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        let mute_scope = self.scope.as_ref();
        let scope = mute_scope
            .and_then(|s| s.project.as_ref())
            .and_then(|p| p.name.clone())
            .or_else(|| {
                mute_scope
                    .and_then(|s| s.build_types.as_ref())
                    .map(|b| format!("{} configuration(s)", b.build_type.len()))
            })
            .unwrap_or_else(|| "-".to_string());

        vec![
            self.id.to_string(),
            truncate(&self.test_names().join(", "), 60),
            scope,
            self.assignment
                .as_ref()
                .and_then(|a| a.user.as_ref())
                .and_then(|u| u.username.clone())
                .unwrap_or_else(|| "-".to_string()),
            self.resolution
                .as_ref()
                .and_then(|r| r.kind.clone())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableRow for TestOccurrence {
    fn headers() -> &'static [&'static str] {
        &["STATUS", "NAME", "DURATION", "MUTED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            format_status(self.status.as_deref().unwrap_or("-"), color),
            truncate(&self.name, 80),
            self.duration
                .map(|ms| format_duration(std::time::Duration::from_millis(ms)))
                .unwrap_or_else(|| "-".to_string()),
            format_bool(self.muted, color),
        ]
    }
}

impl MuteCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            MuteSubcommand::List(args) => self.list(args, global).await,
            MuteSubcommand::Tests(args) => self.tests(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let query = MuteQuery {
            locator: args.locator.clone(),
            project: args.project.clone(),
            count: args.limit,
            all: args.all,
        };

        let mutes = session
            .client
            .list_muted_tests(&query)
            .await
            .map_err(|e| session.fail("list_muted_tests", e))?;

        global.writer().write_list(&mutes)
    }

    async fn tests(&self, args: &TestsArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let query = TestOccurrenceQuery {
            build_id: args.build_id,
            status: args.status.clone(),
            count: args.limit,
        };

        let tests = session
            .client
            .list_test_occurrences(&query)
            .await
            .map_err(|e| session.fail("list_test_occurrences", e))?;

        global.writer().write_list(&tests)
    }
}
