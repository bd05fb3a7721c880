//
//  teamcity-client
//  api/agents.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build agents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::TeamCityClient;
use super::common::ApiError;
use super::locator::{escape_value, Locator};
use super::checked_id;

const AGENT_FIELDS: &str = "count,agent(id,name,connected,enabled,authorized,pool(id,name))";

/// A build agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub authorized: bool,
    #[serde(default)]
    pub pool: Option<AgentPool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPool {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AgentList {
    #[serde(default)]
    agent: Vec<Agent>,
}

/// Filters for [`TeamCityClient::list_agents`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentQuery {
    pub connected: Option<bool>,
    pub enabled: Option<bool>,
    pub authorized: Option<bool>,
    pub pool: Option<String>,
    pub count: Option<u32>,
}

impl AgentQuery {
    /// Renders the filters as a locator.
    ///
    /// ```rust
    /// use teamcity_client::api::AgentQuery;
    ///
    /// let query = AgentQuery { connected: Some(true), pool: Some("Linux".into()), ..Default::default() };
    /// assert_eq!(query.to_locator(), "connected:true,pool:(name:Linux)");
    /// ```
    pub fn to_locator(&self) -> String {
        Locator::new()
            .with_opt("connected", self.connected)
            .with_opt("enabled", self.enabled)
            .with_opt("authorized", self.authorized)
            .group_opt("pool", "name", self.pool.as_deref())
            .with_opt("count", self.count)
            .build()
    }
}

impl TeamCityClient {
    /// Lists agents matching the query.
    pub async fn list_agents(&self, query: &AgentQuery) -> Result<Vec<Agent>, ApiError> {
        let locator = query.to_locator();
        self.fetch_agents(locator).await
    }

    /// Lists the agents compatible with a build configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BuildTypeNotFound`] if the build configuration does not exist.
    pub async fn compatible_agents(&self, build_type_id: &str) -> Result<Vec<Agent>, ApiError> {
        let build_type_id = checked_id("build type", build_type_id)?;
        let locator = format!("compatible:(buildType:(id:{}))", escape_value(build_type_id));

        match self.fetch_agents(locator).await {
            Err(e) if e.is_not_found() => Err(ApiError::BuildTypeNotFound(build_type_id.to_string())),
            other => other,
        }
    }

    async fn fetch_agents(&self, locator: String) -> Result<Vec<Agent>, ApiError> {
        let mut query = vec![("fields", Value::from(AGENT_FIELDS))];
        if !locator.is_empty() {
            query.push(("locator", Value::from(locator)));
        }
        let list: AgentList = self.get("/agents", &query).await?;
        Ok(list.agent)
    }
}
