//! Snapshot naming
//!
//! A snapshot is named after the wall-clock second it was taken:
//! `2024-01-02 03:04:05` becomes `ResolveProjBackup_2024-01-02T03-04-05.zip`.
//! The token has no spaces or colons and sorts lexically in creation order.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Prefix of every snapshot file name
pub const SNAPSHOT_PREFIX: &str = "ResolveProjBackup_";

/// Extension of snapshot archives (without the dot)
pub const SNAPSHOT_EXTENSION: &str = "zip";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TOKEN_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`, dropping sub-second precision
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(DISPLAY_FORMAT).to_string()
}

/// Make a timestamp safe for file names: whitespace becomes `T`, `:` becomes `-`
pub fn sanitize_timestamp(timestamp: &str) -> String {
    timestamp
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("T")
        .replace(':', "-")
}

/// Base name (no extension) of the snapshot taken at `at`
pub fn snapshot_base_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}", SNAPSHOT_PREFIX, sanitize_timestamp(&format_timestamp(at)))
}

/// File name of the snapshot taken at `at`
pub fn snapshot_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}.{}", snapshot_base_name(at), SNAPSHOT_EXTENSION)
}

/// Recover the creation time from a snapshot file name
///
/// Returns `None` for names this tool did not produce.
pub fn parse_snapshot_token(file_name: &str) -> Option<NaiveDateTime> {
    let token = file_name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_EXTENSION)?
        .strip_suffix('.')?;

    NaiveDateTime::parse_from_str(token, TOKEN_FORMAT).ok()
}

/// Same as [`parse_snapshot_token`], interpreted in local time
pub fn parse_snapshot_time(file_name: &str) -> Option<DateTime<Local>> {
    let naive = parse_snapshot_token(file_name)?;
    Local.from_local_datetime(&naive).earliest()
}
