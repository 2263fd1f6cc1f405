//! Marker label formatting

use crate::date::DateKey;
use chrono::{Local, NaiveDate};

/// Source of "today" for label formatting
///
/// Read once per pass so every label in a pass agrees.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Format the label shown on a day marker
///
/// `Today`, `Yesterday`, otherwise `November 21, 2025`.
pub fn format_label(day: DateKey, today: NaiveDate) -> String {
    if day.date() == today {
        return "Today".to_string();
    }
    if DateKey::from_date(today).previous() == Some(day) {
        return "Yesterday".to_string();
    }
    day.date().format("%B %-d, %Y").to_string()
}
