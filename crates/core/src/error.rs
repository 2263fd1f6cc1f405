//! Per-item error types
//!
//! Neither error aborts a pass: the offending item or boundary is skipped.

use thiserror::Error;

/// Raw timestamp could not be turned into a calendar day
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Timestamp attribute was present but blank
    #[error("timestamp is empty")]
    Empty,
    /// Timestamp text did not match any accepted form
    #[error("unrecognized timestamp `{0}`")]
    Unrecognized(String),
}

/// Item position cannot anchor a marker
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Host did not report a position
    #[error("item {ordinal} has no position")]
    Missing { ordinal: usize },
    /// Host reported NaN or an infinite offset
    #[error("item {ordinal} has non-finite position {position}")]
    NonFinite { ordinal: usize, position: f64 },
}
