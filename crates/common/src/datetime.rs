//! DateTime helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

/// The current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a datetime string into UTC.
///
/// Accepts RFC 3339 ("2026-02-01T12:30:45Z", with or without offset) and
/// the bare "YYYY-MM-DD HH:MM:SS" form, which is assumed to be UTC.
pub fn parse_datetime(datetime_str: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(datetime_str)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        })
        .or_else(|_| {
            NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%dT%H:%M:%S")
                .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        })
        .map_err(|e| format!("Failed to parse datetime '{datetime_str}': {e}"))
}

/// Format a datetime as RFC 3339.
pub fn format_datetime(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_datetime("2026-02-01T12:30:45Z").unwrap();
        assert_eq!(format_datetime(&dt), "2026-02-01T12:30:45+00:00");
    }

    #[test]
    fn test_parse_naive_assumes_utc() {
        assert!(parse_datetime("2026-02-01 12:30:45").is_ok());
        assert!(parse_datetime("2026-02-01T12:30:45").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_datetime("not a date").is_err());
    }
}
