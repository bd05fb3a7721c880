//
//  teamcity-client
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Display helpers used by the CLI.
//!
//! ## Categories
//!
//! - **Time Utilities**: [`parse_teamcity_date`], [`format_duration`],
//!   [`build_duration`], [`format_relative_time`]
//! - **String Utilities**: [`truncate`]
//! - **Size Utilities**: [`format_size`]
//!
//! ## Example
//!
//! ```rust
//! use teamcity_client::util::{format_size, parse_teamcity_date};
//!
//! assert_eq!(format_size(1536), "1.5 KB");
//! assert!(parse_teamcity_date("20260112T093000+0000").is_some());
//! ```

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};

/// TeamCity's compact timestamp format, e.g. `20260112T093000+0000`.
pub const TEAMCITY_DATE_FORMAT: &str = "%Y%m%dT%H%M%S%z";

/// Parses a TeamCity timestamp.
pub fn parse_teamcity_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, TEAMCITY_DATE_FORMAT).ok()
}

/// Time between two TeamCity timestamps.
///
/// When `finish` is absent the build is still running and the duration is measured
/// up to now.
pub fn build_duration(start: &str, finish: Option<&str>) -> Option<Duration> {
    let start = parse_teamcity_date(start)?;
    let end = match finish {
        Some(finish) => parse_teamcity_date(finish)?.with_timezone(&Utc),
        None => Utc::now(),
    };
    (end - start.with_timezone(&Utc)).to_std().ok()
}

/// Formats a duration as a compact string (`45s`, `3m 20s`, `2h 5m`, `1d 4h`).
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Formats how long ago a TeamCity timestamp was.
pub fn format_relative_time(value: &str) -> String {
    let Some(then) = parse_teamcity_date(value) else {
        return value.to_string();
    };

    let diff = Utc::now().signed_duration_since(then.with_timezone(&Utc));
    let secs = diff.num_seconds();
    if secs < 0 {
        return "in the future".to_string();
    }

    let secs = secs as u64;
    let (amount, unit) = if secs < 60 {
        return "just now".to_string();
    } else if secs < 3600 {
        (secs / 60, "minute")
    } else if secs < 86400 {
        (secs / 3600, "hour")
    } else {
        (secs / 86400, "day")
    };

    format!("{} {}{} ago", amount, unit, if amount == 1 { "" } else { "s" })
}

/// Truncates to `max_len` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Formats a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_teamcity_date() {
        let dt = parse_teamcity_date("20260112T093000+0200").unwrap();
        assert_eq!(dt.with_timezone(&Utc).to_rfc3339(), "2026-01-12T07:30:00+00:00");
        assert!(parse_teamcity_date("2026-01-12").is_none());
    }

    #[test]
    fn test_build_duration() {
        let d = build_duration("20260112T093000+0000", Some("20260112T094512+0000")).unwrap();
        assert_eq!(format_duration(d), "15m 12s");
        assert!(build_duration("bad", None).is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.0 MB");
    }
}
