//
//  teamcity-client
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project commands
//!
//! Projects form a tree rooted at `_Root`. `tc project tree` walks it with depth
//! and node limits, so a huge server never turns into thousands of requests.
//!
//! ## Examples
//!
//! ```bash
//! # Direct children of a project
//! tc project list --parent Mobile
//!
//! # Whole hierarchy, three levels deep
//! tc project tree --depth 3
//!
//! # Build configurations under a project
//! tc project build-types Mobile
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;

use crate::api::{BuildType, Project, ProjectTree, TreeBounds};
use crate::output::{format_bool, print_field, print_header, TableOutput, TableRow};
use crate::util::truncate;

use super::{GlobalOptions, Session};

/// Browse projects and build configurations
#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// List projects
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View project details
    View(ViewArgs),

    /// Show the project hierarchy
    Tree(TreeArgs),

    /// List build configurations
    #[command(name = "build-types", visible_alias = "bt")]
    BuildTypes(BuildTypesArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only direct children of this project
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project ID
    pub id: String,
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Root project ID (default: _Root)
    pub root: Option<String>,

    /// Maximum depth (capped at 25)
    #[arg(long, short = 'd')]
    pub depth: Option<usize>,

    /// Maximum number of projects fetched (capped at 1000)
    #[arg(long, short = 'n')]
    pub max_nodes: Option<usize>,
}

#[derive(Args, Debug)]
pub struct BuildTypesArgs {
    /// Project ID; includes subprojects
    pub project: Option<String>,
}

impl TableRow for Project {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "PARENT", "ARCHIVED"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate(self.name.as_deref().unwrap_or("-"), 40),
            self.parent_project_id.clone().unwrap_or_else(|| "-".to_string()),
            format_bool(self.archived, color),
        ]
    }
}

impl TableOutput for Project {
    fn print_table(&self, color: bool) {
        print_header(self.name.as_deref().unwrap_or(&self.id));
        print_field("ID", &self.id, color);
        if let Some(parent) = &self.parent_project_id {
            print_field("Parent", parent, color);
        }
        if let Some(description) = &self.description {
            print_field("Description", description, color);
        }
        print_field("Archived", &format_bool(self.archived, color), color);
        let children = self.child_ids();
        if !children.is_empty() {
            print_field("Subprojects", &children.join(", "), color);
        }
        if let Some(url) = &self.web_url {
            print_field("URL", url, color);
        }
    }
}

impl TableRow for BuildType {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "PROJECT"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.id.clone(),
            truncate(self.name.as_deref().unwrap_or("-"), 40),
            self.project_name
                .clone()
                .or_else(|| self.project_id.clone())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl ProjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ProjectSubcommand::List(args) => self.list(args, global).await,
            ProjectSubcommand::View(args) => self.view(args, global).await,
            ProjectSubcommand::Tree(args) => self.tree(args, global).await,
            ProjectSubcommand::BuildTypes(args) => self.build_types(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let projects = session
            .client
            .list_projects(args.parent.as_deref())
            .await
            .map_err(|e| session.fail("list_projects", e))?;

        global.writer().write_list(&projects)
    }

    async fn view(&self, args: &ViewArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let project = session
            .client
            .get_project(&args.id)
            .await
            .map_err(|e| session.fail("get_project", e))?;

        global.writer().write(&project)
    }

    async fn tree(&self, args: &TreeArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let defaults = &session.config.defaults;
        let bounds = TreeBounds::clamped(
            Some(args.depth.unwrap_or(defaults.tree_max_depth)),
            Some(args.max_nodes.unwrap_or(defaults.tree_max_nodes)),
        );

        let tree = session
            .client
            .project_tree(args.root.as_deref(), bounds)
            .await
            .map_err(|e| session.fail("project_tree", e))?;

        if global.json {
            return crate::output::write_json(&tree);
        }

        print_tree(&tree, "", true, true);
        println!();
        println!("{} project(s)", tree.total_projects());
        if tree.is_partial() {
            global.writer().write_warning(
                "Some branches were cut off; raise --depth or --max-nodes to see more",
            );
        }
        Ok(())
    }

    async fn build_types(&self, args: &BuildTypesArgs, global: &GlobalOptions) -> Result<()> {
        let session = Session::connect(global)?;
        let build_types = session
            .client
            .list_build_types(args.project.as_deref())
            .await
            .map_err(|e| session.fail("list_build_types", e))?;

        global.writer().write_list(&build_types)
    }
}

fn print_tree(node: &ProjectTree, prefix: &str, last: bool, root: bool) {
    let name = node.project.name.as_deref().unwrap_or(&node.project.id);
    let marker = if node.truncated { " …" } else { "" };
    let label = format!("{} {}{}", name, style(format!("({})", node.project.id)).dim(), marker);

    if root {
        println!("{}", label);
    } else {
        let branch = if last { "└── " } else { "├── " };
        println!("{}{}{}", prefix, branch, label);
    }

    let child_prefix = if root {
        String::new()
    } else if last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        print_tree(child, &child_prefix, i + 1 == count, false);
    }
}
