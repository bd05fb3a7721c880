//
//  teamcity-client
//  cli/artifact.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build artifact commands
//!
//! Text artifacts up to 10 MB are printed; everything else is reported by its
//! metadata and can be saved to disk with `download` (up to 50 MB).
//!
//! ## Examples
//!
//! ```bash
//! # Top-level artifacts of a build
//! tc artifact list 4211
//!
//! # Contents of a directory
//! tc artifact list 4211 --path reports
//!
//! # Print a text artifact
//! tc artifact show 4211 reports/summary.txt
//!
//! # Save a binary artifact
//! tc artifact download 4211 dist/app.zip -o app.zip
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::{Artifact, ArtifactContent};
use crate::output::{print_field, print_header, TableOutput, TableRow};
use crate::util::{format_relative_time, format_size, truncate};

use super::{GlobalOptions, Session};

/// Browse build artifacts
#[derive(Args, Debug)]
pub struct ArtifactCommand {
    #[command(subcommand)]
    pub command: ArtifactSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ArtifactSubcommand {
    /// List artifacts
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show artifact metadata
    Info(PathArgs),

    /// Print a text artifact
    #[command(visible_alias = "cat")]
    Show(PathArgs),

    /// Save an artifact to disk
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Build ID
    pub build_id: u64,

    /// Directory inside the build's artifacts
    #[arg(long, short = 'p')]
    pub path: Option<String>,
}

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Build ID
    pub build_id: u64,

    /// Artifact path, relative to the build's artifact root
    pub path: String,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Build ID
    pub build_id: u64,

    /// Artifact path, relative to the build's artifact root
    pub path: String,

    /// Output file; defaults to the artifact's file name
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl TableRow for Artifact {
    fn headers() -> &'static [&'static str] {
        &["NAME", "TYPE", "SIZE", "MODIFIED"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            truncate(&self.name, 50),
            if self.is_directory() { "dir" } else { "file" }.to_string(),
            self.size.map(format_size).unwrap_or_else(|| "-".to_string()),
            self.modification_time
                .as_deref()
                .map(format_relative_time)
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableOutput for Artifact {
    fn print_table(&self, color: bool) {
        print_header(self.full_name.as_deref().unwrap_or(&self.name));
        print_field(
            "Type",
            if self.is_directory() { "directory" } else { "file" },
            color,
        );
        if !self.is_directory() {
            print_field("Content type", self.content_type().essence_str(), color);
        }
        if let Some(size) = self.size {
            print_field("Size", &format_size(size), color);
        }
        if let Some(modified) = &self.modification_time {
            print_field("Modified", &format_relative_time(modified), color);
        }
    }
}

impl ArtifactCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ArtifactSubcommand::List(args) => self.list(args, global).await,
            ArtifactSubcommand::Info(args) => self.info(args, global).await,
            ArtifactSubcommand::Show(args) => self.show(args, global).await,
            ArtifactSubcommand::Download(args) => self.download(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let artifacts = session
            .client
            .list_artifacts(args.build_id, args.path.as_deref())
            .await
            .map_err(|e| session.fail("list_artifacts", e))?;

        let writer = global.writer();
        writer.write_list(&artifacts)?;
        if !writer.is_json() && !artifacts.is_empty() {
            println!();
            println!("Showing {} artifact(s)", artifacts.len());
        }
        Ok(())
    }

    async fn info(&self, args: &PathArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let artifact = session
            .client
            .artifact_metadata(args.build_id, &args.path)
            .await
            .map_err(|e| session.fail("get_artifact_metadata", e))?;

        global.writer().write(&artifact)
    }

    async fn show(&self, args: &PathArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let content = session
            .client
            .artifact_content(args.build_id, &args.path)
            .await
            .map_err(|e| session.fail("get_artifact_content", e))?;

        let writer = global.writer();
        if writer.is_json() {
            return crate::output::write_json(&content);
        }

        match content {
            ArtifactContent::Inline { content, .. } => {
                print!("{}", content);
                if !content.ends_with('\n') {
                    println!();
                }
            }
            ArtifactContent::MetadataOnly { artifact, note, path, .. } => {
                artifact.print_table(writer.color_enabled());
                println!();
                println!("{}", style(note).yellow());
                if !artifact.is_directory() {
                    println!(
                        "{}",
                        style(format!("tc artifact download {} {}", args.build_id, path)).dim()
                    );
                }
            }
        }
        Ok(())
    }

    async fn download(&self, args: &DownloadArgs, global: &GlobalOptions) -> Result<()> {
        let target = match &args.output {
            Some(path) => path.clone(),
            None => PathBuf::from(file_name(&args.path)),
        };

        let session = Session::connect(global)?;
        let bytes = session
            .client
            .download_artifact(args.build_id, &args.path)
            .await
            .map_err(|e| session.fail("download_artifact", e))?;

        std::fs::write(&target, &bytes)
            .with_context(|| format!("Failed to write {}", target.display()))?;

        if global.json {
            let result = serde_json::json!({
                "path": target,
                "size": bytes.len(),
            });
            return crate::output::write_json(&result);
        }
        println!(
            "{} Saved {} ({})",
            style("✓").green(),
            target.display(),
            format_size(bytes.len() as u64)
        );
        Ok(())
    }
}

/// The last path component, or `artifact` for an empty path.
fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("artifact")
}
