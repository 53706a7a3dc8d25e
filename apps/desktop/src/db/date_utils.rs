//! Timestamp helpers.
//!
//! New rows store RFC 3339 strings in UTC. Older databases and CSV exports
//! carry local `YYYY-MM-DD HH:MM:SS` or bare dates, which are read as
//! local time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a stored timestamp. Blank or unrecognized input yields `None`.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp for storage.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Local calendar date of a timestamp, as `YYYY-MM-DD`.
pub fn format_local_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Today's local date.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let dt = parse_timestamp("2024-03-01T12:30:00+00:00").unwrap();
        assert_eq!(format_timestamp(&dt), "2024-03-01T12:30:00+00:00");
    }

    #[test]
    fn parses_legacy_formats() {
        assert!(parse_timestamp("2024-03-01 08:15:00").is_some());
        assert!(parse_timestamp("2024-03-01").is_some());
        assert_eq!(
            parse_timestamp("2024-03-01").map(|dt| format_local_date(&dt)),
            Some("2024-03-01".to_string())
        );
    }

    #[test]
    fn blank_and_garbage_are_none() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("  ").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
