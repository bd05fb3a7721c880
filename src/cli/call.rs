//
//  teamcity-client
//  cli/call.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Raw operation requests
//!
//! Runs one `{"operation": ..., "params": {...}}` request through the same
//! sanitizing boundary used by programmatic callers, and prints the response
//! envelope as JSON.
//!
//! ## Examples
//!
//! ```bash
//! tc call '{"operation": "get_build", "params": {"buildId": 4211}}'
//!
//! echo '{"operation": "project_tree", "params": {"maxDepth": 2}}' | tc call -
//! ```

use std::io::Read;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::tool::execute_tool;

use super::{GlobalOptions, Session};

/// Run a JSON operation request
#[derive(Args, Debug)]
pub struct CallCommand {
    /// Request JSON, or `-` to read it from stdin
    pub request: String,

    /// Print the response on one line
    #[arg(long)]
    pub compact: bool,
}

impl CallCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let raw = self.read_request()?;
        let request: Value = serde_json::from_str(&raw).context("Request is not valid JSON")?;

        let session = Session::connect(global)?;
        let response = execute_tool(&session.client, &request).await;

        if self.compact {
            crate::output::write_json_compact(&response)?;
        } else {
            crate::output::write_json(&response)?;
        }

        match response.error {
            Some(error) => Err(anyhow::Error::new(error)),
            None => Ok(()),
        }
    }

    fn read_request(&self) -> Result<String> {
        if self.request != "-" {
            return Ok(self.request.clone());
        }

        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        Ok(buf)
    }
}
