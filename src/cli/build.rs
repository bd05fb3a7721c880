//
//  teamcity-client
//  cli/build.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build commands
//!
//! ## Examples
//!
//! ```bash
//! # Failed builds of one configuration
//! tc build list --build-type Web_Deploy --status FAILURE
//!
//! # Trigger the first configuration of a project on a branch
//! tc build trigger --project "Mobile App" --branch release/2.4
//!
//! # Cancel a build, whatever phase it is in
//! tc build cancel 4211
//!
//! # Last 50 lines of a build log
//! tc build log 4211 --lines 50
//! ```

use std::time::Duration;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::logs::LogSource;
use crate::api::{BatchCancelReport, Build, BuildLog, BuildQuery, LogMode, TriggerBuildRequest};
use crate::output::{format_status, print_field, print_header, TableOutput, TableRow};
use crate::util::{build_duration, format_duration, format_relative_time, truncate};

use super::{confirm, GlobalOptions, Session};

/// Inspect, trigger and cancel builds
#[derive(Args, Debug)]
pub struct BuildCommand {
    #[command(subcommand)]
    pub command: BuildSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BuildSubcommand {
    /// Show one build
    View(ViewArgs),

    /// List builds
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// List queued builds
    Queue(QueueArgs),

    /// Add a build to the queue
    Trigger(TriggerArgs),

    /// Cancel a queued or running build
    Cancel(CancelArgs),

    /// Cancel every queued build of a build configuration
    #[command(name = "cancel-queued")]
    CancelQueued(CancelQueuedArgs),

    /// Show a build log
    Log(LogArgs),
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Build ID
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Raw TeamCity locator; structured filters are ignored when set
    #[arg(long)]
    pub locator: Option<String>,

    /// Filter by project ID
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Filter by build configuration ID
    #[arg(long, short = 'b')]
    pub build_type: Option<String>,

    /// Filter by status (SUCCESS, FAILURE, ERROR, UNKNOWN)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by state (queued, running, finished, any)
    #[arg(long)]
    pub state: Option<String>,

    /// Filter by branch name
    #[arg(long)]
    pub branch: Option<String>,

    /// Filter by agent name
    #[arg(long)]
    pub agent: Option<String>,

    /// Filter by triggering user
    #[arg(long)]
    pub user: Option<String>,

    /// Builds started after this date (yyyyMMddTHHmmss+ZZZZ)
    #[arg(long)]
    pub since: Option<String>,

    /// Builds started before this date (yyyyMMddTHHmmss+ZZZZ)
    #[arg(long)]
    pub until: Option<String>,

    /// Filter by tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Number of builds to skip
    #[arg(long)]
    pub start: Option<u32>,

    /// Maximum number to show
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,
}

#[derive(Args, Debug)]
pub struct QueueArgs {
    /// Filter by build configuration ID
    #[arg(long, short = 'b')]
    pub build_type: Option<String>,
}

#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// Build configuration ID
    #[arg(long, short = 'b', required_unless_present = "project")]
    pub build_type: Option<String>,

    /// Project name; the first build configuration of the project is used
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Branch to build
    #[arg(long)]
    pub branch: Option<String>,

    /// Comment attached to the build
    #[arg(long, short = 'm')]
    pub comment: Option<String>,

    /// Run as a personal build
    #[arg(long)]
    pub personal: bool,
}

#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Build ID
    pub id: u64,

    /// Cancellation comment
    #[arg(long, short = 'm')]
    pub comment: Option<String>,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct CancelQueuedArgs {
    /// Build configuration ID
    pub build_type: String,

    /// Cancellation comment
    #[arg(long, short = 'm')]
    pub comment: Option<String>,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Build ID
    pub id: u64,

    /// Number of trailing lines to show
    #[arg(long, short = 'n', conflicts_with = "full")]
    pub lines: Option<usize>,

    /// Show the whole log
    #[arg(long)]
    pub full: bool,
}

impl TableRow for Build {
    fn headers() -> &'static [&'static str] {
        &["ID", "NUMBER", "CONFIGURATION", "BRANCH", "STATE", "STATUS", "STARTED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.number.clone().unwrap_or_else(|| "-".to_string()),
            truncate(self.build_type_id.as_deref().unwrap_or("-"), 30),
            truncate(self.branch_name.as_deref().unwrap_or("-"), 25),
            format_status(&self.state.to_string(), color),
            format_status(self.status.as_deref().unwrap_or("-"), color),
            self.start_date
                .as_deref()
                .map(format_relative_time)
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableOutput for Build {
    fn print_table(&self, color: bool) {
        let title = match &self.number {
            Some(number) => format!("Build #{} ({})", number, self.id),
            None => format!("Build {}", self.id),
        };
        print_header(&title);

        if let Some(build_type) = &self.build_type {
            let name = build_type.name.as_deref().unwrap_or(&build_type.id);
            match &build_type.project_name {
                Some(project) => print_field("Configuration", &format!("{project} / {name}"), color),
                None => print_field("Configuration", name, color),
            }
        } else if let Some(id) = &self.build_type_id {
            print_field("Configuration", id, color);
        }
        print_field("State", &format_status(&self.state.to_string(), color), color);
        if let Some(status) = &self.status {
            print_field("Status", &format_status(status, color), color);
        }
        if let Some(text) = &self.status_text {
            print_field("Status text", text, color);
        }
        if let Some(branch) = &self.branch_name {
            print_field("Branch", branch, color);
        }
        if let Some(triggered) = &self.triggered {
            let by = triggered
                .user
                .as_ref()
                .and_then(|u| u.username.as_deref().or(u.name.as_deref()))
                .or(triggered.kind.as_deref())
                .unwrap_or("-");
            print_field("Triggered by", by, color);
        }
        if let Some(queued) = &self.queued_date {
            print_field("Queued", &format_relative_time(queued), color);
        }
        if let Some(start) = &self.start_date {
            print_field("Started", &format_relative_time(start), color);
            if let Some(duration) = build_duration(start, self.finish_date.as_deref()) {
                print_field("Duration", &format_duration(duration), color);
            }
        }
        if let Some(url) = &self.web_url {
            print_field("URL", url, color);
        }

        if let Some(problems) = self.problem_occurrences.as_ref().filter(|p| p.count > 0) {
            println!();
            println!("{} ({})", style("Problems").bold(), problems.count);
            for problem in &problems.problem_occurrence {
                let details = problem
                    .details
                    .as_deref()
                    .or(problem.identity.as_deref())
                    .unwrap_or("-");
                println!("  - {}", truncate(details, 100));
            }
        }
    }
}

impl BuildCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            BuildSubcommand::View(args) => self.view(args, global).await,
            BuildSubcommand::List(args) => self.list(args, global).await,
            BuildSubcommand::Queue(args) => self.queue(args, global).await,
            BuildSubcommand::Trigger(args) => self.trigger(args, global).await,
            BuildSubcommand::Cancel(args) => self.cancel(args, global).await,
            BuildSubcommand::CancelQueued(args) => self.cancel_queued(args, global).await,
            BuildSubcommand::Log(args) => self.log(args, global).await,
        }
    }

    async fn view(&self, args: &ViewArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let build = session
            .client
            .get_build(args.id)
            .await
            .map_err(|e| session.fail("get_build", e))?;

        global.writer().write(&build)
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let query = BuildQuery {
            locator: args.locator.clone(),
            project: args.project.clone(),
            build_type: args.build_type.clone(),
            status: args.status.clone(),
            state: args.state.clone(),
            branch: args.branch.clone(),
            agent: args.agent.clone(),
            user: args.user.clone(),
            since_date: args.since.clone(),
            until_date: args.until.clone(),
            tags: args.tags.clone(),
            start: args.start,
            count: args.limit,
        };

        let builds = session
            .client
            .list_builds(&query)
            .await
            .map_err(|e| session.fail("list_builds", e))?;

        global.writer().write_list(&builds)
    }

    async fn queue(&self, args: &QueueArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let builds = session
            .client
            .list_queued_builds(args.build_type.as_deref())
            .await
            .map_err(|e| session.fail("list_queued_builds", e))?;

        global.writer().write_list(&builds)
    }

    async fn trigger(&self, args: &TriggerArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let request = TriggerBuildRequest {
            build_type_id: args.build_type.clone(),
            project_name: args.project.clone(),
            branch: args.branch.clone(),
            comment: args.comment.clone(),
            personal: args.personal,
        };

        let build = session
            .client
            .trigger_build(&request)
            .await
            .map_err(|e| session.fail("trigger_build", e))?;

        let writer = global.writer();
        if writer.is_json() {
            return writer.write(&build);
        }

        writer.write_success(&format!(
            "Queued build {} for {}",
            build.id,
            build.build_type_id.as_deref().unwrap_or("-")
        ));
        if let Some(url) = &build.web_url {
            println!("{}", style(url).dim());
        }
        Ok(())
    }

    async fn cancel(&self, args: &CancelArgs, global: &GlobalOptions) -> Result<()> {
        if !confirm(&format!("Cancel build {}?", args.id), args.confirm, global)? {
            println!("Cancelled.");
            return Ok(());
        }

        let session = Session::connect(global)?;
        let outcome = session
            .client
            .cancel_build(args.id, args.comment.as_deref())
            .await
            .map_err(|e| session.fail("cancel_build", e))?;

        let writer = global.writer();
        if writer.is_json() {
            return crate::output::write_json(&outcome);
        }
        writer.write_success(&outcome.describe());
        Ok(())
    }

    async fn cancel_queued(&self, args: &CancelQueuedArgs, global: &GlobalOptions) -> Result<()> {
        let prompt = format!("Cancel every queued build of {}?", args.build_type);
        if !confirm(&prompt, args.confirm, global)? {
            println!("Cancelled.");
            return Ok(());
        }

        let session = Session::connect(global)?;
        let writer = global.writer();

        let spinner = ProgressBar::new_spinner();
        if !writer.is_json() {
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("Cancelling queued builds of {}...", args.build_type));
            spinner.enable_steady_tick(Duration::from_millis(100));
        }

        let result = session
            .client
            .cancel_queued_builds(&args.build_type, args.comment.as_deref())
            .await;
        spinner.finish_and_clear();
        let report = result.map_err(|e| session.fail("cancel_queued_builds", e))?;

        if writer.is_json() {
            return crate::output::write_json(&report);
        }
        print_batch_report(&report, writer.color_enabled());
        Ok(())
    }

    async fn log(&self, args: &LogArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let mode = if args.full {
            LogMode::Full
        } else {
            LogMode::Tail {
                lines: args.lines.unwrap_or(session.config.defaults.log_tail_lines),
            }
        };

        let log = session
            .client
            .fetch_build_log(args.id, mode)
            .await
            .map_err(|e| session.fail("fetch_build_log", e))?;

        if global.json {
            return crate::output::write_json(&log);
        }

        match log {
            BuildLog::Available(excerpt) => {
                if excerpt.has_more {
                    let source = match excerpt.source {
                        LogSource::Download => "download",
                        LogSource::RestApi => "REST API",
                    };
                    eprintln!(
                        "{}",
                        style(format!(
                            "Showing lines {}-{} of {} (via {})",
                            excerpt.start_line + 1,
                            excerpt.total_lines,
                            excerpt.total_lines,
                            source,
                        ))
                        .dim()
                    );
                }
                print!("{}", excerpt.content);
                if !excerpt.content.ends_with('\n') {
                    println!();
                }
            }
            BuildLog::NotAvailable { build_id } => {
                global
                    .writer()
                    .write_warning(&format!("No log is available for build {build_id}"));
            }
        }
        Ok(())
    }
}

fn print_batch_report(report: &BatchCancelReport, color: bool) {
    if report.attempted() == 0 {
        println!("No queued builds found.");
        return;
    }

    for outcome in &report.cancelled {
        println!("  {} {}", style("✓").green(), outcome.describe());
    }
    for failed in &report.failed {
        println!(
            "  {} Build {}: {} [{}]",
            style("✗").red(),
            failed.build_id,
            failed.error.message,
            failed.error.code
        );
    }

    println!();
    let summary = format!(
        "{} cancelled, {} failed",
        report.cancelled.len(),
        report.failed.len()
    );
    if color && !report.failed.is_empty() {
        println!("{}", style(summary).yellow());
    } else {
        println!("{}", summary);
    }
}
