//! Timestamp parsing and relative time formatting.
//!
//! The forum API sends naive UTC timestamps with microsecond precision
//! (`2025-10-05T06:39:13.123456`). Parsing never fails loudly: an unreadable
//! timestamp becomes `None` and renders with a neutral fallback label.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Number of seconds in one minute.
const SECONDS_PER_MINUTE: i64 = 60;

/// Number of seconds in one hour.
const SECONDS_PER_HOUR: i64 = 3600;

/// Number of seconds in one day.
const SECONDS_PER_DAY: i64 = 86400;

/// Comments older than this many days show a calendar date instead.
const COMMENT_RELATIVE_DAYS: i64 = 7;

/// Naive timestamp layout used by the forum API.
const SERVER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses a server timestamp into UTC.
///
/// Accepts RFC 3339 timestamps with an explicit offset as well as the naive
/// `YYYY-MM-DDTHH:MM:SS.ffffff` form, which is interpreted as UTC.
///
/// # Examples
///
/// ```
/// use fesnuk::domain::time::parse_timestamp;
///
/// assert!(parse_timestamp("2025-10-05T06:39:13.123456").is_some());
/// assert!(parse_timestamp("2025-10-05T06:39:13Z").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, SERVER_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats the age of a post the way the feed shows it.
///
/// - Less than 1 hour: "Xm ago" (e.g., "5m ago")
/// - Less than 1 day: "Xh ago" (e.g., "3h ago")
/// - 1 day or more: "Xd ago" (e.g., "7d ago")
/// - Unknown timestamp: "now"
#[must_use]
pub fn post_time_ago(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "now".to_string();
    };
    let diff = (now - created_at).num_seconds().max(0);

    if diff < SECONDS_PER_HOUR {
        let mins = diff / SECONDS_PER_MINUTE;
        format!("{mins}m ago")
    } else if diff < SECONDS_PER_DAY {
        let hours = diff / SECONDS_PER_HOUR;
        format!("{hours}h ago")
    } else {
        let days = diff / SECONDS_PER_DAY;
        format!("{days}d ago")
    }
}

/// Formats the age of a comment in the compact thread style.
///
/// "Just now", "Xm", "Xh", "Xd" for the first week, then the calendar date
/// ("Oct 05"). Unknown timestamps render as "Unknown".
#[must_use]
pub fn comment_time_ago(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "Unknown".to_string();
    };
    let diff = (now - created_at).num_seconds().max(0);

    if diff < SECONDS_PER_MINUTE {
        "Just now".to_string()
    } else if diff < SECONDS_PER_HOUR {
        format!("{}m", diff / SECONDS_PER_MINUTE)
    } else if diff < SECONDS_PER_DAY {
        format!("{}h", diff / SECONDS_PER_HOUR)
    } else if diff < SECONDS_PER_DAY * COMMENT_RELATIVE_DAYS {
        format!("{}d", diff / SECONDS_PER_DAY)
    } else {
        created_at.format("%b %d").to_string()
    }
}
