//! Reusable formatting utilities for CLI output
//!
//! Shared by `cache status` and `status` for sizes and cache timestamps.

use chrono::{DateTime, Local, LocalResult, TimeZone};

/// Format a Unix timestamp (seconds) as local date/time.
///
/// Returns "N/A" for missing or out-of-range values.
///
/// # Example output
/// `01/15/2025 14:30 -08:00`
pub fn format_timestamp_local(secs: Option<i64>) -> String {
    let Some(secs) = secs.filter(|s| *s > 0) else {
        return "N/A".to_string();
    };

    match Local.timestamp_opt(secs, 0) {
        LocalResult::Single(local) => format_datetime(&local),
        _ => "N/A".to_string(),
    }
}

/// Date, time and UTC offset in any timezone
pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%m/%d/%Y %H:%M %:z").to_string()
}

/// Human-readable byte size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

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
