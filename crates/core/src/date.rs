//! Calendar-day keys and timestamp parsing

use crate::error::ParseError;
use chrono::{Days, NaiveDate};
use std::fmt;

/// Calendar-day identity of an item
///
/// Two timestamps on the same physical day yield equal keys regardless of
/// time of day or weekday text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a key from year/month/day, if valid
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The day before this one
    pub fn previous(&self) -> Option<Self> {
        self.0.checked_sub_days(Days::new(1)).map(Self)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Turns the host's timestamp text into a day key
pub trait TimestampParser: Send + Sync {
    /// Parse the calendar day out of `raw`
    fn parse_day(&self, raw: &str) -> Result<DateKey, ParseError>;
}

/// Parser for the long English form the list host renders
///
/// Accepted:
/// - `Friday, November 21, 2025 at 3:45 PM` (weekday is ignored)
/// - `November 21, 2025`
/// - `2025-11-21` and anything ISO 8601 starting with a date
#[derive(Debug, Clone, Copy, Default)]
pub struct LongDateParser;

impl TimestampParser for LongDateParser {
    fn parse_day(&self, raw: &str) -> Result<DateKey, ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }

        parse_long_form(trimmed)
            .or_else(|| parse_iso_form(trimmed))
            .ok_or_else(|| ParseError::Unrecognized(trimmed.to_string()))
    }
}

fn parse_long_form(raw: &str) -> Option<DateKey> {
    let mut segments = raw.split(',').map(str::trim);

    let mut month_day = segments.next()?;
    if !month_day.chars().any(|c| c.is_ascii_digit()) {
        // Leading weekday
        month_day = segments.next()?;
    }

    let year = segments.next()?.split_whitespace().next()?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    NaiveDate::parse_from_str(&format!("{month_day} {year}"), "%B %d %Y")
        .ok()
        .map(DateKey)
}

fn parse_iso_form(raw: &str) -> Option<DateKey> {
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .ok()
        .map(DateKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_host_long_form() {
        let parser = LongDateParser;
        assert_eq!(
            parser.parse_day("Friday, November 21, 2025 at 3:45 PM"),
            Ok(day(2025, 11, 21))
        );
        assert_eq!(
            parser.parse_day("Monday, March 3, 2025"),
            Ok(day(2025, 3, 3))
        );
    }

    #[test]
    fn test_weekday_text_is_ignored() {
        // 2025-11-21 is a Friday; a wrong weekday still yields the same key
        let parser = LongDateParser;
        assert_eq!(
            parser.parse_day("Tuesday, November 21, 2025"),
            parser.parse_day("Friday, November 21, 2025 at 9:00 AM"),
        );
    }

    #[test]
    fn test_parse_without_weekday_and_iso() {
        let parser = LongDateParser;
        assert_eq!(parser.parse_day("November 21, 2025"), Ok(day(2025, 11, 21)));
        assert_eq!(parser.parse_day("2025-11-21"), Ok(day(2025, 11, 21)));
        assert_eq!(
            parser.parse_day("2025-11-21T08:15:00Z"),
            Ok(day(2025, 11, 21))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let parser = LongDateParser;
        assert_eq!(parser.parse_day("   "), Err(ParseError::Empty));
        assert!(matches!(
            parser.parse_day("yesterday-ish"),
            Err(ParseError::Unrecognized(_))
        ));
        assert!(parser.parse_day("Friday, Smarch 40, 2025").is_err());
        assert!(parser.parse_day("November 21, 25").is_err());
    }

    #[test]
    fn test_display_and_previous() {
        let key = day(2025, 3, 1);
        assert_eq!(key.to_string(), "2025-03-01");
        assert_eq!(key.previous(), Some(day(2025, 2, 28)));
    }
}
