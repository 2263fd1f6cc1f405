//! Desired marker planning
//!
//! Turns an item sequence into the set of markers that should be on screen,
//! keyed so the reconciler can diff it against what is rendered.

use crate::date::{DateKey, LongDateParser, TimestampParser};
use crate::grouper::group_by_day;
use crate::item::Item;
use crate::label::format_label;
use ahash::AHashMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default overlap so a marker sits on the boundary item's top border
pub const OVERLAP_PX: f64 = 3.0;

/// How marker keys are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// `day-<YYYY-MM-DD>#<n>`: position and label become mutable fields
    #[default]
    StableIdentity,
    /// `pos-<position>-<label>`: any field change produces a new key
    PositionLabel,
}

/// Planner tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerOptions {
    /// Pixels the marker is lifted above its boundary item
    pub overlap_px: f64,
    /// Key derivation
    pub key_strategy: KeyStrategy,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            overlap_px: OVERLAP_PX,
            key_strategy: KeyStrategy::default(),
        }
    }
}

/// Where and what a marker shows
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub position: f64,
    pub label: String,
}

/// One desired marker
#[derive(Debug, Clone, PartialEq)]
pub struct Delimiter {
    pub key: String,
    pub position: f64,
    pub label: String,
}

impl Delimiter {
    pub fn placement(&self) -> Placement {
        Placement {
            position: self.position,
            label: self.label.clone(),
        }
    }
}

/// Desired markers keyed for diffing, in on-screen order
#[derive(Debug, Clone, Default)]
pub struct DesiredSet {
    delimiters: Vec<Delimiter>,
    index: AHashMap<String, usize>,
    /// Boundaries dropped for a missing or non-finite position
    pub skipped: usize,
    /// Items dropped for a missing or unparsable timestamp
    pub unparsed: usize,
}

impl DesiredSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a delimiter; an identical key keeps the first entry
    pub fn insert(&mut self, delimiter: Delimiter) -> bool {
        if self.index.contains_key(&delimiter.key) {
            return false;
        }
        self.index.insert(delimiter.key.clone(), self.delimiters.len());
        self.delimiters.push(delimiter);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Delimiter> {
        self.index.get(key).map(|&i| &self.delimiters[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.delimiters.iter().map(|d| d.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Delimiter> {
        self.delimiters.iter()
    }

    pub fn len(&self) -> usize {
        self.delimiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delimiters.is_empty()
    }
}

impl FromIterator<Delimiter> for DesiredSet {
    fn from_iter<I: IntoIterator<Item = Delimiter>>(iter: I) -> Self {
        let mut set = Self::new();
        for delimiter in iter {
            set.insert(delimiter);
        }
        set
    }
}

/// Computes the desired marker set for an item sequence
#[derive(Clone)]
pub struct DelimiterPlanner {
    options: PlannerOptions,
    parser: Arc<dyn TimestampParser>,
}

impl DelimiterPlanner {
    /// Create a planner using the host's long date form
    pub fn new(options: PlannerOptions) -> Self {
        Self::with_parser(options, Arc::new(LongDateParser))
    }

    /// Create a planner with a custom timestamp parser
    pub fn with_parser(options: PlannerOptions, parser: Arc<dyn TimestampParser>) -> Self {
        Self { options, parser }
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    /// Plan the markers for `items` as of `today`
    pub fn plan(&self, items: &[Item], today: NaiveDate) -> DesiredSet {
        let groups = group_by_day(items, self.parser.as_ref());
        let mut desired = DesiredSet::new();
        desired.unparsed = groups.unparsed;

        let mut occurrences: AHashMap<DateKey, usize> = AHashMap::new();

        for boundary in &groups.boundaries {
            // Skipped boundaries still consume their occurrence number
            let occurrence = occurrences.entry(boundary.day).or_insert(0);
            let nth = *occurrence;
            *occurrence += 1;

            let anchor = match boundary.item.anchor() {
                Ok(anchor) => anchor,
                Err(e) => {
                    warn!(error = %e, "skipping boundary without a usable position");
                    desired.skipped += 1;
                    continue;
                }
            };

            let position = anchor - self.options.overlap_px;
            let label = format_label(boundary.day, today);

            let key = match self.options.key_strategy {
                KeyStrategy::StableIdentity => format!("day-{}#{}", boundary.day, nth),
                KeyStrategy::PositionLabel => format!("pos-{position}-{label}"),
            };

            debug!(key = %key, position, label = %label, "marker needed");
            desired.insert(Delimiter {
                key,
                position,
                label,
            });
        }

        debug!(
            items = items.len(),
            markers = desired.len(),
            skipped = desired.skipped,
            unparsed = desired.unparsed,
            "planned markers"
        );
        desired
    }
}

impl Default for DelimiterPlanner {
    fn default() -> Self {
        Self::new(PlannerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D1: &str = "Friday, November 21, 2025 at 3:45 PM";
    const D2: &str = "Thursday, November 20, 2025 at 11:02 AM";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 21).unwrap()
    }

    fn position_keyed() -> DelimiterPlanner {
        DelimiterPlanner::new(PlannerOptions {
            key_strategy: KeyStrategy::PositionLabel,
            ..PlannerOptions::default()
        })
    }

    fn scenario() -> Vec<Item> {
        vec![
            Item::new(0, Some(0.0), Some(D1)),
            Item::new(1, Some(40.0), Some(D1)),
            Item::new(2, Some(80.0), Some(D2)),
        ]
    }

    #[test]
    fn test_two_day_scenario() {
        let desired = DelimiterPlanner::default().plan(&scenario(), today());

        let markers: Vec<_> = desired.iter().map(|d| (d.position, d.label.as_str())).collect();
        assert_eq!(markers, vec![(-3.0, "Today"), (77.0, "Yesterday")]);
        assert_eq!(
            desired.keys().collect::<Vec<_>>(),
            vec!["day-2025-11-21#0", "day-2025-11-20#0"]
        );
    }

    #[test]
    fn test_position_label_keys() {
        let desired = position_keyed().plan(&scenario(), today());
        assert!(desired.contains_key("pos--3-Today"));
        assert!(desired.contains_key("pos-77-Yesterday"));
        assert_eq!(desired.len(), 2);
    }

    #[test]
    fn test_replanning_is_stable() {
        let planner = DelimiterPlanner::default();
        let first: Vec<String> = planner
            .plan(&scenario(), today())
            .keys()
            .map(str::to_owned)
            .collect();
        let second: Vec<String> = planner
            .plan(&scenario(), today())
            .keys()
            .map(str::to_owned)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stable_keys_survive_position_drift() {
        let planner = DelimiterPlanner::default();
        let before = planner.plan(&scenario(), today());

        let shifted: Vec<Item> = scenario()
            .into_iter()
            .map(|mut item| {
                item.position = item.position.map(|p| p + 120.0);
                item
            })
            .collect();
        let after = planner.plan(&shifted, today());

        assert_eq!(
            before.keys().collect::<Vec<_>>(),
            after.keys().collect::<Vec<_>>()
        );
        assert_eq!(after.get("day-2025-11-20#0").unwrap().position, 197.0);
    }

    #[test]
    fn test_non_finite_boundary_is_skipped() {
        let items = vec![
            Item::new(0, Some(f64::NAN), Some(D1)),
            Item::new(1, Some(40.0), Some(D1)),
            Item::new(2, None, Some(D2)),
        ];
        let desired = DelimiterPlanner::default().plan(&items, today());

        // Item 1 continues item 0's day, so it never becomes a boundary
        assert!(desired.is_empty());
        assert_eq!(desired.skipped, 2);
    }

    #[test]
    fn test_repeated_day_gets_distinct_stable_keys() {
        let items = vec![
            Item::new(0, Some(0.0), Some(D1)),
            Item::new(1, Some(40.0), Some(D2)),
            Item::new(2, Some(80.0), Some(D1)),
        ];
        let desired = DelimiterPlanner::default().plan(&items, today());
        assert!(desired.contains_key("day-2025-11-21#0"));
        assert!(desired.contains_key("day-2025-11-21#1"));
        assert_eq!(desired.len(), 3);
    }

    #[test]
    fn test_skipped_boundary_keeps_its_occurrence_slot() {
        let items = vec![
            Item::new(0, Some(0.0), Some(D1)),
            Item::new(1, Some(40.0), Some(D2)),
            Item::new(2, Some(f64::NAN), Some(D1)),
            Item::new(3, Some(120.0), Some(D2)),
            Item::new(4, Some(160.0), Some(D1)),
        ];
        let desired = DelimiterPlanner::default().plan(&items, today());

        assert_eq!(desired.skipped, 1);
        assert_eq!(
            desired.keys().collect::<Vec<_>>(),
            vec![
                "day-2025-11-21#0",
                "day-2025-11-20#0",
                "day-2025-11-20#1",
                "day-2025-11-21#2",
            ]
        );
    }

    #[test]
    fn test_identical_position_label_collides() {
        let mut set = DesiredSet::new();
        let delimiter = Delimiter {
            key: "pos-0-Today".to_string(),
            position: 0.0,
            label: "Today".to_string(),
        };
        assert!(set.insert(delimiter.clone()));
        assert!(!set.insert(delimiter));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_custom_overlap() {
        let planner = DelimiterPlanner::new(PlannerOptions {
            overlap_px: 0.0,
            ..PlannerOptions::default()
        });
        let desired = planner.plan(&scenario(), today());
        assert_eq!(desired.iter().next().unwrap().position, 0.0);
    }
}
