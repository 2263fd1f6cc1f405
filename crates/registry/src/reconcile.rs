//! Desired-vs-rendered marker reconciliation
//!
//! A pass diffs the planner's desired set against the registry and applies
//! the minimal sequence of collaborator calls: removals first (bounding the
//! peak element count), then in-place updates, then additions.

use crate::registry::{MarkerRecord, MarkerRegistry};
use crate::render::{RenderError, Renderer};
use dayline_core::{Delimiter, DesiredSet};
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;
use tracing::{debug, warn};

/// Pass-level reconciliation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The rendering surface cannot take markers right now
    #[error("rendering collaborator is unavailable")]
    CollaboratorUnavailable,
}

/// Actions needed to turn the registry into the desired set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Keys rendered but no longer desired
    pub remove: Vec<String>,
    /// Keys in both whose position or label moved
    pub update: Vec<Delimiter>,
    /// Keys desired but not rendered
    pub add: Vec<Delimiter>,
    /// Keys in both with identical fields
    pub keep: usize,
}

impl ReconcilePlan {
    /// Whether applying the plan would touch the surface
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.update.is_empty() && self.add.is_empty()
    }

    /// Number of collaborator calls the plan requires
    pub fn mutations(&self) -> usize {
        self.remove.len() + self.update.len() + self.add.len()
    }
}

/// Outcome of one apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub removed: usize,
    pub updated: usize,
    pub kept: usize,
    pub added: usize,
    /// Collaborator calls that failed and were skipped
    pub failed: usize,
    /// Registry was cleared because its bookkeeping was inconsistent
    pub rebuilt: bool,
}

impl ReconcileReport {
    /// Successful external mutations
    pub fn mutations(&self) -> usize {
        self.removed + self.updated + self.added
    }
}

/// Compute the actions that reconcile `current` with `desired`
pub fn diff<H>(desired: &DesiredSet, current: &MarkerRegistry<H>) -> ReconcilePlan
where
    H: Clone + Eq + Hash + Debug,
{
    let mut plan = ReconcilePlan::default();

    for (key, record) in current.iter() {
        match desired.get(key) {
            None => plan.remove.push(key.to_string()),
            Some(wanted) if wanted.position != record.position || wanted.label != record.label => {
                plan.update.push(wanted.clone());
            }
            Some(_) => plan.keep += 1,
        }
    }

    plan.add = desired
        .iter()
        .filter(|d| !current.contains_key(&d.key))
        .cloned()
        .collect();

    // Registry iteration order is arbitrary
    plan.remove.sort_unstable();

    plan
}

/// Applies desired marker sets to a registry through a renderer
pub struct Reconciler;

impl Reconciler {
    /// Make `registry` hold exactly the keys of `desired`
    ///
    /// Afterwards every desired key is registered with matching position and
    /// label, unless the collaborator rejected an individual call (counted in
    /// [`ReconcileReport::failed`]).
    pub fn apply<R: Renderer>(
        desired: &DesiredSet,
        registry: &mut MarkerRegistry<R::Handle>,
        renderer: &mut R,
    ) -> Result<ReconcileReport, ReconcileError> {
        if !renderer.is_available() {
            warn!("marker container not found, skipping reconciliation");
            return Err(ReconcileError::CollaboratorUnavailable);
        }

        let mut report = ReconcileReport::default();

        if let Err(violation) = registry.check_invariants() {
            warn!(error = %violation, "registry out of sync with surface, rebuilding");
            Self::clear(registry, renderer);
            report.rebuilt = true;
        }

        let plan = diff(desired, registry);
        debug!(
            desired = desired.len(),
            current = registry.len(),
            remove = plan.remove.len(),
            update = plan.update.len(),
            keep = plan.keep,
            add = plan.add.len(),
            "reconciling markers"
        );
        report.kept = plan.keep;

        for key in plan.remove {
            let Some(record) = registry.remove(&key) else {
                continue;
            };
            match renderer.destroy_marker(record.handle.clone()) {
                Ok(()) => {
                    debug!(key = %key, "removed marker");
                    report.removed += 1;
                }
                Err(RenderError::UnknownHandle(handle)) => {
                    debug!(key = %key, handle = %handle, "marker already gone");
                    report.removed += 1;
                }
                Err(e) => {
                    // Still on the surface; keep tracking it so the next pass retries
                    warn!(key = %key, error = %e, "failed to remove marker");
                    registry.insert(key, record);
                    report.failed += 1;
                }
            }
        }

        let mut recreate = Vec::new();
        for wanted in plan.update {
            let Some(record) = registry.get_mut(&wanted.key) else {
                continue;
            };
            match renderer.update_marker(&record.handle, wanted.position, &wanted.label) {
                Ok(()) => {
                    record.position = wanted.position;
                    record.label = wanted.label.clone();
                    debug!(key = %wanted.key, position = wanted.position, "updated marker");
                    report.updated += 1;
                }
                Err(RenderError::UnknownHandle(handle)) => {
                    warn!(
                        key = %wanted.key,
                        handle = %handle,
                        "marker vanished from surface, recreating"
                    );
                    registry.remove(&wanted.key);
                    recreate.push(wanted);
                }
                Err(e) => {
                    warn!(key = %wanted.key, error = %e, "failed to update marker");
                    report.failed += 1;
                }
            }
        }

        for wanted in plan.add.into_iter().chain(recreate) {
            match renderer.create_marker(wanted.position, &wanted.label) {
                Ok(handle) => {
                    debug!(key = %wanted.key, position = wanted.position, "added marker");
                    registry.insert(
                        wanted.key,
                        MarkerRecord {
                            position: wanted.position,
                            label: wanted.label,
                            handle,
                        },
                    );
                    report.added += 1;
                }
                Err(e) => {
                    warn!(key = %wanted.key, error = %e, "failed to add marker");
                    report.failed += 1;
                }
            }
        }

        debug!(size = registry.len(), "reconciliation complete");
        Ok(report)
    }

    /// Destroy every rendered marker and empty the registry
    ///
    /// Records whose marker could not be destroyed stay registered. Returns
    /// the number of records dropped.
    pub fn clear<R: Renderer>(registry: &mut MarkerRegistry<R::Handle>, renderer: &mut R) -> usize {
        let mut cleared = 0;
        for (key, record) in registry.drain() {
            match renderer.destroy_marker(record.handle.clone()) {
                Ok(()) => cleared += 1,
                Err(RenderError::UnknownHandle(_)) => {
                    debug!(key = %key, "marker already gone while clearing");
                    cleared += 1;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to clear marker, keeping it registered");
                    registry.insert(key, record);
                }
            }
        }
        cleared
    }
}
