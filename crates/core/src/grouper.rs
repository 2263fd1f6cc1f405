//! Day grouping over an ordered item sequence

use crate::date::{DateKey, TimestampParser};
use crate::item::Item;
use tracing::debug;

/// First item of a new calendar day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary<'a> {
    pub item: &'a Item,
    pub day: DateKey,
}

/// Result of grouping one item sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayGroups<'a> {
    /// Boundary items, in sequence order
    pub boundaries: Vec<Boundary<'a>>,
    /// Items with a missing or unparsable timestamp
    pub unparsed: usize,
}

/// Find the items that start a new calendar day
///
/// Item `i` is a boundary iff it is the first item with a valid day, or its
/// day differs from the nearest preceding item with a valid day. Items whose
/// timestamp is absent or unparsable are skipped without resetting that
/// comparison.
pub fn group_by_day<'a>(items: &'a [Item], parser: &dyn TimestampParser) -> DayGroups<'a> {
    let mut groups = DayGroups::default();
    let mut previous: Option<DateKey> = None;

    for item in items {
        let Some(raw) = item.raw_timestamp.as_deref() else {
            groups.unparsed += 1;
            continue;
        };

        let day = match parser.parse_day(raw) {
            Ok(day) => day,
            Err(e) => {
                debug!(ordinal = item.ordinal, error = %e, "skipping item without a usable date");
                groups.unparsed += 1;
                continue;
            }
        };

        if previous != Some(day) {
            groups.boundaries.push(Boundary { item, day });
        }
        previous = Some(day);
    }

    groups
}
