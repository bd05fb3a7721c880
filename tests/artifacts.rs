//
//  teamcity-client
//  tests/artifacts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

mod common;

use std::io::Write;

use mockito::{Matcher, Server};
use serde_json::json;

use common::{client, rest};
use teamcity_client::api::client::MAX_BINARY_BYTES;
use teamcity_client::api::common::ApiError;
use teamcity_client::api::ArtifactContent;

#[tokio::test]
async fn test_text_artifact_is_inlined() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", rest("/builds/id:50/artifacts/metadata/reports/summary.txt"))
        .with_body(
            json!({
                "name": "summary.txt",
                "fullName": "reports/summary.txt",
                "size": 27,
                "content": {"href": "/app/rest/builds/id:50/artifacts/content/reports/summary.txt"}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let content = server
        .mock("GET", rest("/builds/id:50/artifacts/content/reports/summary.txt"))
        .with_body("Tests: 412 passed, 0 failed")
        .expect(1)
        .create_async()
        .await;

    let result = client(&server)
        .artifact_content(50, "/reports/summary.txt")
        .await
        .unwrap();

    match result {
        ArtifactContent::Inline {
            path,
            content_type,
            size,
            content,
        } => {
            assert_eq!(path, "reports/summary.txt");
            assert_eq!(content_type, "text/plain");
            assert_eq!(size, 27);
            assert_eq!(content, "Tests: 412 passed, 0 failed");
        }
        other => panic!("expected inline content, got {other:?}"),
    }
    content.assert_async().await;
}

#[tokio::test]
async fn test_binary_artifact_returns_metadata_only() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", rest("/builds/id:51/artifacts/metadata/dist/app.zip"))
        .with_body(json!({"name": "app.zip", "size": 2048}).to_string())
        .create_async()
        .await;
    let content = server
        .mock("GET", rest("/builds/id:51/artifacts/content/dist/app.zip"))
        .expect(0)
        .create_async()
        .await;

    let result = client(&server).artifact_content(51, "dist/app.zip").await.unwrap();

    let ArtifactContent::MetadataOnly { artifact, note, .. } = result else {
        panic!("expected metadata only");
    };
    assert_eq!(artifact.size, Some(2048));
    assert!(note.contains("Binary"));
    content.assert_async().await;
}

#[tokio::test]
async fn test_oversized_text_artifact_returns_metadata_only() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", rest("/builds/id:52/artifacts/metadata/build.log"))
        .with_body(json!({"name": "build.log", "size": 20 * 1024 * 1024}).to_string())
        .create_async()
        .await;
    let content = server
        .mock("GET", rest("/builds/id:52/artifacts/content/build.log"))
        .expect(0)
        .create_async()
        .await;

    let result = client(&server).artifact_content(52, "build.log").await.unwrap();

    let ArtifactContent::MetadataOnly { content_type, note, .. } = result else {
        panic!("expected metadata only");
    };
    assert_eq!(content_type, "text/plain");
    assert!(note.contains("exceeds"));
    content.assert_async().await;
}

#[tokio::test]
async fn test_directory_returns_metadata_only() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", rest("/builds/id:53/artifacts/metadata/reports"))
        .with_body(
            json!({
                "name": "reports",
                "children": {"href": "/app/rest/builds/id:53/artifacts/children/reports"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = client(&server).artifact_content(53, "reports").await.unwrap();

    let ArtifactContent::MetadataOnly { artifact, .. } = result else {
        panic!("expected metadata only");
    };
    assert!(artifact.is_directory());
}

#[tokio::test]
async fn test_list_artifacts_under_path() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", rest("/builds/id:54/artifacts/children/reports"))
        .with_body(
            json!({
                "count": 2,
                "file": [
                    {"name": "junit.xml", "size": 5120},
                    {"name": "coverage", "children": {"href": "/x"}}
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let artifacts = client(&server)
        .list_artifacts(54, Some("reports/"))
        .await
        .unwrap();

    assert_eq!(artifacts.len(), 2);
    assert!(!artifacts[0].is_directory());
    assert!(artifacts[1].is_directory());
    list.assert_async().await;
}

#[tokio::test]
async fn test_forbidden_path_sends_nothing() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let api = client(&server);
    for path in ["a?b", "a#b", "a%2e", "..\\x", ""] {
        let err = api.artifact_content(55, path).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)), "{path:?}");
    }
    let err = api.list_artifacts(55, Some("../../etc")).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    any.assert_async().await;
}

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let mut server = Server::new_async().await;
    let bytes: Vec<u8> = vec![0x50, 0x4b, 0x03, 0x04, 0x00, 0xff];
    let download = server
        .mock("GET", rest("/builds/id:56/artifacts/content/dist/app.zip"))
        .match_header("accept", "application/octet-stream")
        .with_body(bytes.clone())
        .expect(1)
        .create_async()
        .await;

    let downloaded = client(&server).download_artifact(56, "dist/app.zip").await.unwrap();

    assert_eq!(downloaded, bytes);
    download.assert_async().await;
}

#[tokio::test]
async fn test_download_stops_at_binary_ceiling() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", rest("/builds/id:57/artifacts/content/dist/huge.bin"))
        .with_chunked_body(|w| {
            let chunk = vec![0u8; 1024 * 1024];
            for _ in 0..=(MAX_BINARY_BYTES / (1024 * 1024)) {
                w.write_all(&chunk)?;
            }
            Ok(())
        })
        .create_async()
        .await;

    let err = client(&server)
        .download_artifact(57, "dist/huge.bin")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::TooLarge { limit } if limit == MAX_BINARY_BYTES));
}
