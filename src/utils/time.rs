//! Time utilities: epoch millis, measurement timestamp parsing and display.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current time as a measurement timestamp (UTC, millisecond precision).
pub fn now_dt() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a user-supplied measurement timestamp and normalise it to UTC.
///
/// Accepts RFC 3339 (`2025-06-01T08:30:00+02:00`) or a local wall-clock
/// time without offset (`2025-06-01T08:30` / `2025-06-01 08:30`).
pub fn parse_dt(input: &str) -> AppResult<String> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            let local = Local
                .from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| AppError::InvalidDate(input.to_string()))?;
            return Ok(local
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true));
        }
    }

    Err(AppError::InvalidDate(input.to_string()))
}

/// Render epoch millis in the local timezone for display.
pub fn format_millis(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => ms.to_string(),
    }
}

/// Render a stored measurement timestamp in the local timezone.
pub fn format_dt(dt: &str) -> String {
    DateTime::parse_from_rfc3339(dt)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| dt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_with_offset_is_normalised_to_utc() {
        let out = parse_dt("2025-06-01T10:30:00+02:00").unwrap();
        assert_eq!(out, "2025-06-01T08:30:00.000Z");
    }

    #[test]
    fn local_wall_clock_is_accepted() {
        assert!(parse_dt("2025-06-01T08:30").is_ok());
        assert!(parse_dt("2025-06-01 08:30").is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(parse_dt("yesterday"), Err(AppError::InvalidDate(_))));
    }

    #[test]
    fn now_dt_round_trips() {
        let now = now_dt();
        assert_eq!(parse_dt(&now).unwrap(), now);
    }
}
