//! vidlog Core Type Definitions
//!
//! Defines fundamental types and formats used throughout the project.

use chrono::{NaiveDate, NaiveDateTime};

// =============================================================================
// ID Types
// =============================================================================

/// Video entry unique identifier (16 lower-case hex chars)
pub type VideoId = String;

// =============================================================================
// Date Formats
// =============================================================================

/// Wall-clock format of `log_date` when parsing (`2025-01-01 1:00 PM`).
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Format used when rendering a log date (no zero padding on the hour).
pub const LOG_DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %-I:%M %p";

/// ISO calendar date (`release_date`, day-group labels).
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Month bucket key (`01/25`).
pub const MONTH_KEY_FORMAT: &str = "%m/%y";

/// Parses a `log_date` string. Returns `None` for anything that is not in
/// [`LOG_DATE_FORMAT`].
pub fn parse_log_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(trimmed, LOG_DATE_FORMAT).ok()
}

/// Formats a timestamp in the `log_date` wall-clock format.
pub fn format_log_date(value: &NaiveDateTime) -> String {
    value.format(LOG_DATE_DISPLAY_FORMAT).to_string()
}

/// Calendar day of a `log_date`, if it parses.
pub fn log_day(value: &str) -> Option<NaiveDate> {
    parse_log_date(value).map(|dt| dt.date())
}

// =============================================================================
// Rating
// =============================================================================

/// Highest rating a video can carry.
pub const MAX_RATING: f64 = 5.0;

/// A rating of zero means "unrated".
pub const UNRATED: f64 = 0.0;

/// Converts a rating to its number of half steps (0..=10).
///
/// Returns `None` when the value is not finite, out of range, or not a multiple
/// of 0.5.
pub fn rating_half_steps(rating: f64) -> Option<u8> {
    if !rating.is_finite() || !(UNRATED..=MAX_RATING).contains(&rating) {
        return None;
    }
    let doubled = rating * 2.0;
    if (doubled - doubled.round()).abs() > 1e-9 {
        return None;
    }
    Some(doubled.round() as u8)
}

/// Whether `rating` is one of 0, 0.5, 1.0, ..., 5.0.
pub fn is_valid_rating(rating: f64) -> bool {
    rating_half_steps(rating).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_log_date_accepts_unpadded_hour() {
        let dt = parse_log_date("2025-01-01 1:00 PM").unwrap();
        assert_eq!(dt.hour(), 13);
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let dt = parse_log_date("2025-03-09 11:45 AM").unwrap();
        assert_eq!(dt.hour(), 11);
        assert_eq!(dt.minute(), 45);
    }

    #[test]
    fn test_parse_log_date_rejects_other_formats() {
        assert!(parse_log_date("").is_none());
        assert!(parse_log_date("yesterday").is_none());
        assert!(parse_log_date("2025-01-01").is_none());
        assert!(parse_log_date("2025-01-01T13:00:00Z").is_none());
    }

    #[test]
    fn test_format_log_date_round_trips() {
        let dt = parse_log_date("2024-12-31 9:05 PM").unwrap();
        assert_eq!(format_log_date(&dt), "2024-12-31 9:05 PM");
    }

    #[test]
    fn test_rating_half_steps() {
        assert_eq!(rating_half_steps(0.0), Some(0));
        assert_eq!(rating_half_steps(0.5), Some(1));
        assert_eq!(rating_half_steps(3.5), Some(7));
        assert_eq!(rating_half_steps(5.0), Some(10));

        assert_eq!(rating_half_steps(5.5), None);
        assert_eq!(rating_half_steps(-0.5), None);
        assert_eq!(rating_half_steps(2.25), None);
        assert_eq!(rating_half_steps(f64::NAN), None);
        assert_eq!(rating_half_steps(f64::INFINITY), None);
    }
}
