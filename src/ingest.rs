//! Chat log ingestion.
//!
//! The log interleaves two kinds of nonblank lines. A line starting with
//! `[` is a message: `[HH:MM:SS] <user>rest-of-line`, where the `<user>`
//! tag is optional and the time is an offset into the current day. Any
//! other line is a date line establishing that day. Blank lines are
//! skipped. Malformed lines are fatal - a log that does not parse is not
//! partially ingested.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::{Error, Result};
use crate::types::ChatMessage;

/// User recorded for messages without a `<user>` tag.
pub const SERVER_USER: &str = "server";

static MESSAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    // the space after the user tag is part of the tag, not the body
    Regex::new(r"^\[(\d{2}):(\d{2}):(\d{2})\] (?:<(\w+)> ?)?(.*)$").expect("valid message regex")
});

/// Parse a whole chat log into messages, in log order.
pub fn parse_log(text: &str) -> Result<Vec<ChatMessage>> {
    let mut messages = Vec::new();
    // Messages before any date line count seconds from the epoch.
    let mut day_base: i64 = 0;

    for (n, line) in text.lines().enumerate() {
        let number = n + 1;
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('[') {
            let caps = MESSAGE_LINE.captures(line).ok_or_else(|| Error::Parse {
                line: number,
                reason: "malformed message line".to_string(),
            })?;
            let hours: i64 = caps[1].parse().expect("digit capture");
            let minutes: i64 = caps[2].parse().expect("digit capture");
            let seconds: i64 = caps[3].parse().expect("digit capture");
            let user = caps
                .get(4)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| SERVER_USER.to_string());
            messages.push(ChatMessage {
                timestamp: day_base + hours * 3600 + minutes * 60 + seconds,
                user,
                body: caps[5].to_string(),
            });
        } else {
            day_base = parse_day_base(line).ok_or_else(|| Error::Parse {
                line: number,
                reason: format!("unrecognized date line: {:?}", line),
            })?;
        }
    }
    Ok(messages)
}

/// Seconds at midnight of the day a date line names.
///
/// Accepts a bare date, a space-separated date-time, or RFC 3339; the
/// time-of-day part, if any, is discarded - message lines carry their own.
fn parse_day_base(line: &str) -> Option<i64> {
    let s = line.trim();
    let date = if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        d
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        dt.date()
    } else if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.date_naive()
    } else {
        return None;
    };
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}
