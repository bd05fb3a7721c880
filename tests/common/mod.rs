//
//  teamcity-client
//  tests/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

#![allow(dead_code)]

use mockito::{Matcher, ServerGuard};
use serde_json::{json, Value};

use teamcity_client::api::TeamCityClient;

pub const TOKEN: &str = "tc-test-token-8f3a91";

/// Matches a REST path with or without a query string.
pub fn rest(path: &str) -> Matcher {
    Matcher::Regex(format!("^/app/rest{}(\\?.*)?$", regex::escape(path)))
}

/// Matches a path relative to the server root.
pub fn root(path: &str) -> Matcher {
    Matcher::Regex(format!("^{}(\\?.*)?$", regex::escape(path)))
}

pub fn client(server: &ServerGuard) -> TeamCityClient {
    TeamCityClient::with_base_url(&server.url(), TOKEN).expect("valid test client")
}

pub fn build_json(id: u64, state: &str) -> Value {
    json!({
        "id": id,
        "buildTypeId": "Web_Deploy",
        "number": format!("{}", id % 1000),
        "state": state,
        "status": if state == "finished" { Some("SUCCESS") } else { None },
        "webUrl": format!("https://ci.example.com/viewLog.html?buildId={id}"),
    })
}

pub fn project_json(id: &str, children: &[&str]) -> Value {
    let refs: Vec<Value> = children.iter().map(|c| json!({"id": c, "name": c})).collect();
    json!({
        "id": id,
        "name": id,
        "projects": {"count": refs.len(), "project": refs},
    })
}
