//
//  teamcity-client
//  api/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Projects API
//!
//! Projects, build configurations and the bounded project hierarchy walk.
//!
//! ## Hierarchy Walk
//!
//! [`TeamCityClient::project_tree`] fetches a project, then each of its children,
//! depth first and one request at a time. Children are never loaded eagerly by the
//! other operations.
//!
//! The walk is bounded by [`TreeBounds`]. When a bound is hit the affected node is
//! marked `truncated` and the partial tree is returned; the walk never continues past
//! a bound.
//!
//! ```rust,no_run
//! use teamcity_client::api::{TeamCityClient, TreeBounds};
//!
//! # async fn example(client: TeamCityClient) -> Result<(), teamcity_client::api::common::ApiError> {
//! let tree = client.project_tree(None, TreeBounds::default()).await?;
//! println!("{} projects under {}", tree.total_projects(), tree.project.id);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::TeamCityClient;
use super::common::ApiError;
use super::checked_id;
use super::locator::Locator;

/// Identifier of the implicit top-level project.
pub const ROOT_PROJECT_ID: &str = "_Root";

/// Default maximum depth of a hierarchy walk.
pub const DEFAULT_TREE_DEPTH: usize = 10;

/// Default maximum number of projects fetched by a hierarchy walk.
pub const DEFAULT_TREE_NODES: usize = 200;

/// Hard ceiling on caller-supplied depth.
pub const MAX_TREE_DEPTH: usize = 25;

/// Hard ceiling on caller-supplied node count.
pub const MAX_TREE_NODES: usize = 1000;

const PROJECT_FIELDS: &str =
    "id,name,description,parentProjectId,archived,webUrl,projects(project(id,name))";

const PROJECT_LIST_FIELDS: &str = "project(id,name,description,parentProjectId,archived,webUrl)";

const BUILD_TYPE_FIELDS: &str = "buildType(id,name,projectId,projectName,webUrl)";

/// A TeamCity project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_project_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub web_url: Option<String>,
    /// Child references as reported by the server.
    #[serde(default, skip_serializing)]
    pub projects: Option<ProjectRefs>,
}

impl Project {
    /// Identifiers of the direct children, in server order.
    pub fn child_ids(&self) -> Vec<String> {
        self.projects
            .as_ref()
            .map(|refs| refs.project.iter().map(|p| p.id.clone()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRefs {
    #[serde(default)]
    pub project: Vec<ProjectRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildType {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    #[serde(default)]
    project: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct BuildTypeList {
    #[serde(rename = "buildType", default)]
    build_type: Vec<BuildType>,
}

/// Limits for [`TeamCityClient::project_tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeBounds {
    /// Deepest level fetched; the root is level 0.
    pub max_depth: usize,
    /// Total number of projects fetched, root included.
    pub max_nodes: usize,
}

impl Default for TreeBounds {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_TREE_DEPTH,
            max_nodes: DEFAULT_TREE_NODES,
        }
    }
}

impl TreeBounds {
    /// Builds bounds from optional caller values, clamped to the hard ceilings.
    ///
    /// ```rust
    /// use teamcity_client::api::TreeBounds;
    ///
    /// let bounds = TreeBounds::clamped(Some(100), None);
    /// assert_eq!(bounds.max_depth, 25);
    /// assert_eq!(bounds.max_nodes, 200);
    /// ```
    pub fn clamped(max_depth: Option<usize>, max_nodes: Option<usize>) -> Self {
        Self {
            max_depth: max_depth.unwrap_or(DEFAULT_TREE_DEPTH).min(MAX_TREE_DEPTH),
            max_nodes: max_nodes.unwrap_or(DEFAULT_TREE_NODES).clamp(1, MAX_TREE_NODES),
        }
    }
}

/// A project with its fetched descendants.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectTree {
    #[serde(flatten)]
    pub project: Project,
    pub children: Vec<ProjectTree>,
    /// Set when a bound stopped the walk below this node.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl ProjectTree {
    fn leaf(project: Project) -> Self {
        Self {
            project,
            children: Vec::new(),
            truncated: false,
        }
    }

    /// This project plus every fetched descendant.
    pub fn total_projects(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ProjectTree::total_projects)
            .sum::<usize>()
    }

    /// Returns `true` if any node in the tree was truncated.
    pub fn is_partial(&self) -> bool {
        self.truncated || self.children.iter().any(ProjectTree::is_partial)
    }
}

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<ProjectTree, ApiError>> + Send + 'a>>;

struct Walk {
    bounds: TreeBounds,
    fetched: usize,
    seen: HashSet<String>,
}

impl TeamCityClient {
    /// Fetches one project, including references to its direct children.
    pub async fn get_project(&self, project_id: &str) -> Result<Project, ApiError> {
        let project_id = checked_id("project", project_id)?;
        self.get(
            &format!("/projects/id:{project_id}"),
            &[("fields", Value::from(PROJECT_FIELDS))],
        )
        .await
    }

    /// Lists projects, optionally only the direct children of `parent_id`.
    pub async fn list_projects(&self, parent_id: Option<&str>) -> Result<Vec<Project>, ApiError> {
        let locator = Locator::new()
            .group_opt("parentProject", "id", parent_id)
            .build();

        let mut query = vec![("fields", Value::from(PROJECT_LIST_FIELDS))];
        if !locator.is_empty() {
            query.push(("locator", Value::from(locator)));
        }

        let list: ProjectList = self.get("/projects", &query).await?;
        Ok(list.project)
    }

    /// Lists build configurations, optionally those under a project (recursively).
    pub async fn list_build_types(
        &self,
        project_id: Option<&str>,
    ) -> Result<Vec<BuildType>, ApiError> {
        let locator = Locator::new()
            .group_opt("affectedProject", "id", project_id)
            .build();

        let mut query = vec![("fields", Value::from(BUILD_TYPE_FIELDS))];
        if !locator.is_empty() {
            query.push(("locator", Value::from(locator)));
        }

        let list: BuildTypeList = self.get("/buildTypes", &query).await?;
        Ok(list.build_type)
    }

    /// Walks the project hierarchy from `root_id` (default `_Root`).
    ///
    /// # Errors
    ///
    /// - [`ApiError::ProjectNotFound`] if the root does not exist
    /// - Any non-404 failure while fetching a child
    ///
    /// A child that disappears during the walk (404) is skipped with a warning.
    pub async fn project_tree(
        &self,
        root_id: Option<&str>,
        bounds: TreeBounds,
    ) -> Result<ProjectTree, ApiError> {
        let root_id = root_id.unwrap_or(ROOT_PROJECT_ID);

        let root = match self.get_project(root_id).await {
            Ok(project) => project,
            Err(e) if e.is_not_found() => return Err(ApiError::ProjectNotFound(root_id.to_string())),
            Err(e) => return Err(e),
        };

        let mut walk = Walk {
            bounds,
            fetched: 1,
            seen: HashSet::from([root.id.clone()]),
        };
        let tree = self.expand(root, 0, &mut walk).await?;

        tracing::debug!(
            "Fetched {} projects under {} (partial: {})",
            tree.total_projects(),
            root_id,
            tree.is_partial()
        );
        Ok(tree)
    }

    fn expand<'a>(&'a self, project: Project, depth: usize, walk: &'a mut Walk) -> WalkFuture<'a> {
        Box::pin(async move {
            let child_ids = project.child_ids();
            let mut node = ProjectTree::leaf(project);

            if child_ids.is_empty() {
                return Ok(node);
            }
            if depth >= walk.bounds.max_depth {
                tracing::warn!("Depth limit reached at {}", node.project.id);
                node.truncated = true;
                return Ok(node);
            }

            for child_id in child_ids {
                if !walk.seen.insert(child_id.clone()) {
                    tracing::warn!("Project {} already visited, skipping", child_id);
                    continue;
                }
                if walk.fetched >= walk.bounds.max_nodes {
                    tracing::warn!("Node limit reached at {}", node.project.id);
                    node.truncated = true;
                    break;
                }

                let child = match self.get_project(&child_id).await {
                    Ok(child) => child,
                    Err(e) if e.is_not_found() => {
                        tracing::warn!("Project {} disappeared during the walk", child_id);
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                walk.fetched += 1;

                let subtree = self.expand(child, depth + 1, walk).await?;
                node.children.push(subtree);
            }

            Ok(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: None,
            description: None,
            parent_project_id: None,
            archived: false,
            web_url: None,
            projects: None,
        }
    }

    #[test]
    fn test_child_ids_in_server_order() {
        let json = r#"{"id":"Web","projects":{"project":[{"id":"Web_Api"},{"id":"Web_Ui"}]}}"#;
        let parsed: Project = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.child_ids(), vec!["Web_Api", "Web_Ui"]);
        assert!(project("Leaf").child_ids().is_empty());
    }

    #[test]
    fn test_total_projects_counts_recursively() {
        let mut root = ProjectTree::leaf(project("_Root"));
        let mut a = ProjectTree::leaf(project("A"));
        a.children.push(ProjectTree::leaf(project("A1")));
        a.children.push(ProjectTree::leaf(project("A2")));
        root.children.push(a);
        root.children.push(ProjectTree::leaf(project("B")));
        assert_eq!(root.total_projects(), 5);
        assert!(!root.is_partial());
    }

    #[test]
    fn test_leaf_serializes_empty_children() {
        let json = serde_json::to_value(ProjectTree::leaf(project("Leaf"))).unwrap();
        assert_eq!(json["id"], "Leaf");
        assert_eq!(json["children"], serde_json::json!([]));
        assert!(json.get("truncated").is_none());
        assert!(json.get("projects").is_none());
    }

    #[test]
    fn test_bounds_are_clamped() {
        assert_eq!(TreeBounds::clamped(None, None), TreeBounds::default());
        let bounds = TreeBounds::clamped(Some(3), Some(0));
        assert_eq!(bounds.max_depth, 3);
        assert_eq!(bounds.max_nodes, 1);
        assert_eq!(TreeBounds::clamped(None, Some(50_000)).max_nodes, MAX_TREE_NODES);
    }
}
