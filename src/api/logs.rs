//
//  teamcity-client
//  api/logs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build log retrieval.
//!
//! The plain log download lives outside the REST API, at
//! `<server>/downloadBuildLog.html?buildId=<id>&plain=true`. When it fails for any
//! reason the REST endpoint `/app/rest/builds/id:<id>/log` is tried. If both report
//! not-found the build simply has no log, which is a result and not an error.

use serde::Serialize;
use serde_json::Value;

use super::client::{ApiRoot, TeamCityClient};
use super::common::ApiError;

/// Lines returned by a tail fetch when the caller does not say.
pub const DEFAULT_TAIL_LINES: usize = 100;

/// How much of the log to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// The last `lines` lines.
    Tail { lines: usize },
    /// The entire log.
    Full,
}

impl Default for LogMode {
    fn default() -> Self {
        Self::Tail {
            lines: DEFAULT_TAIL_LINES,
        }
    }
}

/// Which endpoint produced the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    Download,
    RestApi,
}

/// A slice of a build log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogExcerpt {
    pub build_id: u64,
    pub source: LogSource,
    pub content: String,
    /// 0-based index of the first returned line.
    pub start_line: usize,
    pub total_lines: usize,
    /// `true` when earlier lines were left out.
    pub has_more: bool,
}

/// Result of [`TeamCityClient::fetch_build_log`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildLog {
    Available(LogExcerpt),
    NotAvailable { build_id: u64 },
}

enum LogAttempt {
    Primary,
    Fallback { primary: ApiError },
    NotAvailable,
}

/// Cuts `content` down according to `mode`.
///
/// Returns `(content, start_line, total_lines, has_more)`.
///
/// ```rust
/// use teamcity_client::api::{slice_log, LogMode};
///
/// let log = (1..=25).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
/// let (tail, start, total, more) = slice_log(&log, LogMode::Tail { lines: 10 });
/// assert_eq!((start, total, more), (15, 25, true));
/// assert!(tail.starts_with("line 16"));
/// ```
pub fn slice_log(content: &str, mode: LogMode) -> (String, usize, usize, bool) {
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();

    match mode {
        LogMode::Full => (content.to_string(), 0, total, false),
        LogMode::Tail { lines: n } => {
            let start = total.saturating_sub(n);
            (lines[start..].join("\n"), start, total, start > 0)
        }
    }
}

impl TeamCityClient {
    /// Fetches a build log, trying the download endpoint first.
    ///
    /// # Errors
    ///
    /// Returns the fallback's error when it fails with anything other than a
    /// not-found after a not-found primary attempt.
    pub async fn fetch_build_log(&self, build_id: u64, mode: LogMode) -> Result<BuildLog, ApiError> {
        let mut attempt = LogAttempt::Primary;
        loop {
            attempt = match attempt {
                LogAttempt::Primary => {
                    let query = [
                        ("buildId", Value::from(build_id)),
                        ("plain", Value::from(true)),
                    ];
                    match self
                        .get_text_at(ApiRoot::Server, "/downloadBuildLog.html", &query)
                        .await
                    {
                        Ok(text) => return Ok(excerpt(build_id, LogSource::Download, &text, mode)),
                        Err(primary) => {
                            tracing::warn!("Log download for build {} failed, using REST fallback", build_id);
                            LogAttempt::Fallback { primary }
                        }
                    }
                }
                LogAttempt::Fallback { primary } => {
                    match self.get_text(&format!("/builds/id:{build_id}/log"), &[]).await {
                        Ok(text) => return Ok(excerpt(build_id, LogSource::RestApi, &text, mode)),
                        Err(e) if e.is_not_found() && primary.is_not_found() => {
                            LogAttempt::NotAvailable
                        }
                        Err(e) => return Err(e),
                    }
                }
                LogAttempt::NotAvailable => {
                    tracing::info!("No log available for build {}", build_id);
                    return Ok(BuildLog::NotAvailable { build_id });
                }
            };
        }
    }
}

fn excerpt(build_id: u64, source: LogSource, text: &str, mode: LogMode) -> BuildLog {
    let (content, start_line, total_lines, has_more) = slice_log(text, mode);
    BuildLog::Available(LogExcerpt {
        build_id,
        source,
        content,
        start_line,
        total_lines,
        has_more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("step {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_tail_of_long_log() {
        let (content, start, total, more) = slice_log(&numbered(25), LogMode::Tail { lines: 10 });
        assert_eq!(content.lines().count(), 10);
        assert_eq!(content.lines().next(), Some("step 16"));
        assert_eq!(content.lines().last(), Some("step 25"));
        assert_eq!((start, total, more), (15, 25, true));
    }

    #[test]
    fn test_tail_longer_than_log() {
        let (content, start, total, more) = slice_log(&numbered(4), LogMode::Tail { lines: 10 });
        assert_eq!(content, numbered(4));
        assert_eq!((start, total, more), (0, 4, false));
    }

    #[test]
    fn test_full_mode_keeps_everything() {
        let log = format!("{}\n", numbered(7));
        let (content, start, total, more) = slice_log(&log, LogMode::Full);
        assert_eq!(content, log);
        assert_eq!((start, total, more), (0, 7, false));
    }

    #[test]
    fn test_empty_log() {
        assert_eq!(slice_log("", LogMode::default()), (String::new(), 0, 0, false));
    }

    #[test]
    fn test_not_available_serialization() {
        let json = serde_json::to_value(BuildLog::NotAvailable { build_id: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not_available", "build_id": 3}));
    }
}
