//
//  teamcity-client
//  cli/change.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! VCS change commands
//!
//! ## Examples
//!
//! ```bash
//! # Changes that went into a build, with files
//! tc change list --build 4211 --files
//!
//! # Recent changes by one user
//! tc change list --user jdoe --limit 20
//! ```

use anyhow::Result;
use clap::Args;
use console::style;

use crate::api::{Change, ChangeQuery};
use crate::output::TableRow;
use crate::util::{format_relative_time, truncate};

use super::{GlobalOptions, Session};

/// List VCS changes
#[derive(Args, Debug)]
pub struct ChangeCommand {
    /// Raw TeamCity locator; other filters are ignored when set
    #[arg(long)]
    pub locator: Option<String>,

    /// Changes included in a build
    #[arg(long)]
    pub build: Option<u64>,

    /// Filter by build configuration ID
    #[arg(long, short = 'b')]
    pub build_type: Option<String>,

    /// Filter by project ID
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Filter by VCS username
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Maximum number to show
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Include changed files
    #[arg(long)]
    pub files: bool,
}

impl TableRow for Change {
    fn headers() -> &'static [&'static str] {
        &["ID", "REVISION", "USER", "DATE", "COMMENT"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        let comment = self
            .comment
            .as_deref()
            .and_then(|c| c.lines().next())
            .unwrap_or("-");
        vec![
            self.id.to_string(),
            self.version
                .as_deref()
                .map(|v| truncate(v, 12))
                .unwrap_or_else(|| "-".to_string()),
            self.username.clone().unwrap_or_else(|| "-".to_string()),
            self.date
                .as_deref()
                .map(format_relative_time)
                .unwrap_or_else(|| "-".to_string()),
            truncate(comment, 60),
        ]
    }
}

impl ChangeCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let query = ChangeQuery {
            locator: self.locator.clone(),
            build_id: self.build,
            build_type: self.build_type.clone(),
            project: self.project.clone(),
            username: self.user.clone(),
            count: self.limit,
            include_files: self.files,
        };

        let changes = session
            .client
            .list_changes(&query)
            .await
            .map_err(|e| session.fail("list_changes", e))?;

        let writer = global.writer();
        if writer.is_json() || !self.files {
            return writer.write_list(&changes);
        }

        // With files, a flat table would lose the grouping.
        for change in &changes {
            let revision = change.version.as_deref().unwrap_or("-");
            println!(
                "{} {} {}",
                style(truncate(revision, 12)).yellow(),
                change.username.as_deref().unwrap_or("-"),
                style(change.comment.as_deref().and_then(|c| c.lines().next()).unwrap_or(""))
                    .dim()
            );
            for file in change.files.iter().flat_map(|f| &f.file) {
                println!(
                    "    {:<8} {}",
                    file.change_type.as_deref().unwrap_or("-"),
                    file.file
                );
            }
        }
        Ok(())
    }
}
