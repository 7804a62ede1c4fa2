//! Timestamp and calendar helpers

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC time as an ISO 8601 string with millisecond precision
pub fn now_iso() -> String {
    now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a 24-hour `HH:MM` session time
pub fn parse_session_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Format a 24-hour `HH:MM` time for display, e.g. `13:00` -> `1:00 PM`
///
/// Returns `None` when the input is not a valid `HH:MM` time.
pub fn format_time_12h(value: &str) -> Option<String> {
    parse_session_time(value).map(|t| t.format("%-I:%M %p").to_string())
}

/// True for a calendar date in `YYYY-MM-DD` form
pub fn is_calendar_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// True for an ISO 8601 date or date-time
pub fn is_iso_date(value: &str) -> bool {
    is_calendar_date(value) || DateTime::parse_from_rfc3339(value).is_ok()
}
