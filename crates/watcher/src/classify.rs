//! Change classification for list mutation batches
//!
//! Decides whether a batch of row insertions/removals looks like a folder
//! switch (registry should be cleared eagerly), a scroll load, or a single
//! user action.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row insertions/removals observed in one notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    pub added: usize,
    pub removed: usize,
}

impl ChangeBatch {
    pub fn new(added: usize, removed: usize) -> Self {
        Self { added, removed }
    }

    /// Batch touched no list rows
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }

    /// Combine two batches into one
    pub fn merge(self, other: ChangeBatch) -> Self {
        Self {
            added: self.added + other.added,
            removed: self.removed + other.removed,
        }
    }
}

/// Interpretation of a change batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Displayed collection was wholesale replaced
    FolderSwitch,
    /// More rows were loaded while scrolling
    ScrollLoad,
    /// A row or two changed (archive, delete, new mail)
    IndividualAction,
    /// Anything else
    Unknown,
}

impl ChangeKind {
    /// Whether the registry should be cleared before the next pass
    pub fn requires_reset(self) -> bool {
        matches!(self, ChangeKind::FolderSwitch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::FolderSwitch => "folder_switch",
            ChangeKind::ScrollLoad => "scroll_load",
            ChangeKind::IndividualAction => "individual_action",
            ChangeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Removals above this count may signal a folder switch
    pub removal_burst: usize,
    /// ...when fewer than this many rows remain
    pub sparse_total: usize,
    /// Scroll loads remove fewer rows than this
    pub scroll_removed_limit: usize,
    /// Individual actions add and remove fewer rows than this
    pub small_change: usize,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            removal_burst: 10,
            sparse_total: 5,
            scroll_removed_limit: 5,
            small_change: 3,
        }
    }
}

/// Folder-switch heuristic over change batches
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeClassifier {
    thresholds: ClassifierThresholds,
}

impl ChangeClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Classify `batch` given the list now holds `total` rows
    ///
    /// First matching rule wins.
    pub fn classify(&self, batch: ChangeBatch, total: usize) -> ChangeKind {
        let t = &self.thresholds;
        if batch.removed > t.removal_burst && total < t.sparse_total {
            ChangeKind::FolderSwitch
        } else if batch.added > 0 && batch.removed < t.scroll_removed_limit {
            ChangeKind::ScrollLoad
        } else if batch.added < t.small_change && batch.removed < t.small_change {
            ChangeKind::IndividualAction
        } else {
            ChangeKind::Unknown
        }
    }
}
