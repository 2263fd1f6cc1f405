//! Item records supplied by the list host

use crate::error::LayoutError;
use serde::{Deserialize, Serialize};

/// One row of the host list, read fresh on every pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// On-screen order (ascending)
    pub ordinal: usize,
    /// Absolute top offset in px, if the host reported one
    pub position: Option<f64>,
    /// Timestamp text exactly as the host renders it
    pub raw_timestamp: Option<String>,
}

impl Item {
    /// Create a new item
    pub fn new(ordinal: usize, position: Option<f64>, raw_timestamp: Option<&str>) -> Self {
        Self {
            ordinal,
            position,
            raw_timestamp: raw_timestamp.map(str::to_owned),
        }
    }

    /// Position usable as a marker anchor
    pub fn anchor(&self) -> Result<f64, LayoutError> {
        match self.position {
            None => Err(LayoutError::Missing {
                ordinal: self.ordinal,
            }),
            Some(position) if !position.is_finite() => Err(LayoutError::NonFinite {
                ordinal: self.ordinal,
                position,
            }),
            Some(position) => Ok(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_accepts_fractional() {
        let item = Item::new(0, Some(40.5), None);
        assert_eq!(item.anchor(), Ok(40.5));
    }

    #[test]
    fn test_anchor_rejects_missing_and_nan() {
        assert_eq!(
            Item::new(3, None, None).anchor(),
            Err(LayoutError::Missing { ordinal: 3 })
        );
        assert!(matches!(
            Item::new(4, Some(f64::NAN), None).anchor(),
            Err(LayoutError::NonFinite { ordinal: 4, .. })
        ));
        assert!(Item::new(5, Some(f64::INFINITY), None).anchor().is_err());
    }
}
