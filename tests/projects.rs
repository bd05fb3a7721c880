//
//  teamcity-client
//  tests/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

mod common;

use mockito::{Matcher, Mock, Server, ServerGuard};

use common::{client, project_json, rest};
use teamcity_client::api::common::ApiError;
use teamcity_client::api::TreeBounds;

/// `_Root` -> (A -> (A1, A2), B)
async fn mock_hierarchy(server: &mut ServerGuard) -> Vec<Mock> {
    let layout: [(&str, &[&str]); 5] = [
        ("_Root", &["A", "B"]),
        ("A", &["A1", "A2"]),
        ("A1", &[]),
        ("A2", &[]),
        ("B", &[]),
    ];

    let mut mocks = Vec::new();
    for (id, children) in layout {
        let mock = server
            .mock("GET", rest(&format!("/projects/id:{id}")))
            .with_body(project_json(id, children).to_string())
            .create_async()
            .await;
        mocks.push(mock);
    }
    mocks
}

fn ids(tree: &teamcity_client::api::ProjectTree) -> Vec<String> {
    let mut out = vec![tree.project.id.clone()];
    for child in &tree.children {
        out.extend(ids(child));
    }
    out
}

#[tokio::test]
async fn test_full_tree_within_bounds() {
    let mut server = Server::new_async().await;
    let _hierarchy = mock_hierarchy(&mut server).await;

    let tree = client(&server)
        .project_tree(None, TreeBounds::default())
        .await
        .unwrap();

    assert_eq!(tree.total_projects(), 5);
    assert!(!tree.is_partial());
    assert_eq!(ids(&tree), vec!["_Root", "A", "A1", "A2", "B"]);
}

#[tokio::test]
async fn test_depth_bound_marks_truncated() {
    let mut server = Server::new_async().await;
    let _hierarchy = mock_hierarchy(&mut server).await;

    let bounds = TreeBounds {
        max_depth: 1,
        max_nodes: 100,
    };
    let tree = client(&server).project_tree(None, bounds).await.unwrap();

    assert_eq!(ids(&tree), vec!["_Root", "A", "B"]);
    assert!(tree.is_partial());
    assert!(tree.children[0].truncated);
    assert!(!tree.children[1].truncated);
}

#[tokio::test]
async fn test_node_bound_stops_the_walk() {
    let mut server = Server::new_async().await;
    let _hierarchy = mock_hierarchy(&mut server).await;
    let b = server
        .mock("GET", rest("/projects/id:B"))
        .expect(0)
        .create_async()
        .await;

    let bounds = TreeBounds {
        max_depth: 10,
        max_nodes: 3,
    };
    let tree = client(&server).project_tree(None, bounds).await.unwrap();

    assert_eq!(tree.total_projects(), 3);
    assert_eq!(ids(&tree), vec!["_Root", "A", "A1"]);
    assert!(tree.truncated);
    assert!(tree.children[0].truncated);
    b.assert_async().await;
}

#[tokio::test]
async fn test_missing_root_is_project_not_found() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", rest("/projects/id:Ghost"))
        .with_status(404)
        .create_async()
        .await;

    let err = client(&server)
        .project_tree(Some("Ghost"), TreeBounds::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ProjectNotFound(ref id) if id == "Ghost"));
}

#[tokio::test]
async fn test_vanished_child_is_skipped() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", rest("/projects/id:Web"))
        .with_body(project_json("Web", &["Web_Api", "Web_Old"]).to_string())
        .create_async()
        .await;
    let _m2 = server
        .mock("GET", rest("/projects/id:Web_Api"))
        .with_body(project_json("Web_Api", &[]).to_string())
        .create_async()
        .await;
    let _m3 = server
        .mock("GET", rest("/projects/id:Web_Old"))
        .with_status(404)
        .create_async()
        .await;

    let tree = client(&server)
        .project_tree(Some("Web"), TreeBounds::default())
        .await
        .unwrap();

    assert_eq!(ids(&tree), vec!["Web", "Web_Api"]);
}

#[tokio::test]
async fn test_cycle_is_not_followed() {
    let mut server = Server::new_async().await;
    let parent = server
        .mock("GET", rest("/projects/id:Loop"))
        .with_body(project_json("Loop", &["Loop_Child"]).to_string())
        .expect(1)
        .create_async()
        .await;
    let _m1 = server
        .mock("GET", rest("/projects/id:Loop_Child"))
        .with_body(project_json("Loop_Child", &["Loop"]).to_string())
        .expect(1)
        .create_async()
        .await;

    let tree = client(&server)
        .project_tree(Some("Loop"), TreeBounds::default())
        .await
        .unwrap();

    assert_eq!(tree.total_projects(), 2);
    parent.assert_async().await;
}

#[tokio::test]
async fn test_list_build_types_of_project() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", rest("/buildTypes"))
        .match_query(Matcher::UrlEncoded(
            "locator".into(),
            "affectedProject:(id:Mobile)".into(),
        ))
        .with_body(
            r#"{"count":1,"buildType":[{"id":"Mobile_Build","name":"Build","projectId":"Mobile"}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let build_types = client(&server)
        .list_build_types(Some("Mobile"))
        .await
        .unwrap();

    assert_eq!(build_types.len(), 1);
    assert_eq!(build_types[0].project_id.as_deref(), Some("Mobile"));
    list.assert_async().await;
}

#[tokio::test]
async fn test_invalid_project_id_sends_nothing() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client(&server).get_project("A/../B").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    any.assert_async().await;
}
