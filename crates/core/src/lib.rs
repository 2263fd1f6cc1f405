//! Core date grouping for Dayline
//!
//! This crate provides the pure half of marker reconciliation:
//! - Item records as reported by the list host
//! - Calendar-day keys parsed from raw timestamps
//! - Day grouping over an ordered item sequence
//! - Label formatting relative to "today"
//! - Desired marker planning

pub mod date;
pub mod error;
pub mod grouper;
pub mod item;
pub mod label;
pub mod planner;

// Re-exports
pub use date::{DateKey, LongDateParser, TimestampParser};
pub use error::{LayoutError, ParseError};
pub use grouper::{group_by_day, Boundary, DayGroups};
pub use item::Item;
pub use label::{format_label, Clock, FixedClock, LocalClock};
pub use planner::{Delimiter, DelimiterPlanner, DesiredSet, KeyStrategy, Placement, PlannerOptions};
