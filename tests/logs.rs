//
//  teamcity-client
//  tests/logs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

mod common;

use mockito::{Matcher, Server};

use common::{client, rest, root};
use teamcity_client::api::common::ApiError;
use teamcity_client::api::logs::LogSource;
use teamcity_client::api::{BuildLog, LogMode};

fn numbered_log(lines: usize) -> String {
    (1..=lines)
        .map(|n| format!("[12:00:{:02}] step {n}", n % 60))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_tail_from_download_endpoint() {
    let mut server = Server::new_async().await;
    let download = server
        .mock("GET", root("/downloadBuildLog.html"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("buildId".into(), "42".into()),
            Matcher::UrlEncoded("plain".into(), "true".into()),
        ]))
        .with_header("content-type", "text/plain")
        .with_body(numbered_log(25))
        .expect(1)
        .create_async()
        .await;
    let fallback = server
        .mock("GET", rest("/builds/id:42/log"))
        .expect(0)
        .create_async()
        .await;

    let log = client(&server)
        .fetch_build_log(42, LogMode::Tail { lines: 10 })
        .await
        .unwrap();

    let BuildLog::Available(excerpt) = log else {
        panic!("expected a log, got {log:?}");
    };
    assert_eq!(excerpt.source, LogSource::Download);
    assert_eq!(excerpt.start_line, 15);
    assert_eq!(excerpt.total_lines, 25);
    assert!(excerpt.has_more);
    assert_eq!(excerpt.content.lines().count(), 10);
    assert!(excerpt.content.ends_with("step 25"));
    download.assert_async().await;
    fallback.assert_async().await;
}

#[tokio::test]
async fn test_falls_back_to_rest_log() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", root("/downloadBuildLog.html"))
        .with_status(404)
        .create_async()
        .await;
    let fallback = server
        .mock("GET", rest("/builds/id:43/log"))
        .with_body(numbered_log(4))
        .expect(1)
        .create_async()
        .await;

    let log = client(&server)
        .fetch_build_log(43, LogMode::Full)
        .await
        .unwrap();

    let BuildLog::Available(excerpt) = log else {
        panic!("expected a log, got {log:?}");
    };
    assert_eq!(excerpt.source, LogSource::RestApi);
    assert_eq!(excerpt.total_lines, 4);
    assert!(!excerpt.has_more);
    fallback.assert_async().await;
}

#[tokio::test]
async fn test_missing_everywhere_is_not_available() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", root("/downloadBuildLog.html"))
        .with_status(404)
        .create_async()
        .await;
    let _m2 = server
        .mock("GET", rest("/builds/id:44/log"))
        .with_status(404)
        .create_async()
        .await;

    let log = client(&server)
        .fetch_build_log(44, LogMode::default())
        .await
        .unwrap();

    assert_eq!(log, BuildLog::NotAvailable { build_id: 44 });
}

#[tokio::test]
async fn test_fallback_error_wins_after_server_failure() {
    let mut server = Server::new_async().await;
    let _m1 = server
        .mock("GET", root("/downloadBuildLog.html"))
        .with_status(500)
        .create_async()
        .await;
    let _m2 = server
        .mock("GET", rest("/builds/id:45/log"))
        .with_status(404)
        .create_async()
        .await;

    let err = client(&server)
        .fetch_build_log(45, LogMode::default())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn test_oversized_log_is_rejected() {
    let mut server = Server::new_async().await;
    let body = "x".repeat(10 * 1024 * 1024 + 1);
    let _m1 = server
        .mock("GET", root("/downloadBuildLog.html"))
        .with_body(body.clone())
        .create_async()
        .await;
    let _m2 = server
        .mock("GET", rest("/builds/id:46/log"))
        .with_body(body)
        .create_async()
        .await;

    let err = client(&server)
        .fetch_build_log(46, LogMode::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::TooLarge { .. }));
}
