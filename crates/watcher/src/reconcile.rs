//! One reconciliation pass
//!
//! Reads the list source, plans the desired markers and applies them to the
//! registry through the renderer. Owns the registry for the lifetime of the
//! page view.

use crate::debounce::PassRunner;
use crate::source::{ListSource, SourceError};
use dayline_core::{Clock, DelimiterPlanner, LocalClock};
use dayline_registry::{MarkerRegistry, ReconcileError, ReconcileReport, Reconciler, Renderer};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Pass-level failure; the pass is abandoned and retried on the next change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    #[error("list source unavailable: {0}")]
    ListUnavailable(#[from] SourceError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// State and collaborators of the reconciliation pipeline
pub struct DelimiterPass<S, R: Renderer> {
    source: S,
    renderer: R,
    registry: MarkerRegistry<R::Handle>,
    planner: DelimiterPlanner,
    clock: Arc<dyn Clock>,
}

impl<S: ListSource, R: Renderer> DelimiterPass<S, R> {
    /// Create a pass using the local wall clock
    pub fn new(source: S, renderer: R, planner: DelimiterPlanner) -> Self {
        Self::with_clock(source, renderer, planner, Arc::new(LocalClock))
    }

    pub fn with_clock(
        source: S,
        renderer: R,
        planner: DelimiterPlanner,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            renderer,
            registry: MarkerRegistry::new(),
            planner,
            clock,
        }
    }

    /// Run a full compute-desired, diff, apply cycle
    pub fn run(&mut self) -> Result<ReconcileReport, PassError> {
        let items = self.source.snapshot()?;
        debug!(rows = items.len(), "running reconciliation pass");

        // "Today" is read once so every label in the pass agrees
        let today = self.clock.today();
        let desired = self.planner.plan(&items, today);

        let report = Reconciler::apply(&desired, &mut self.registry, &mut self.renderer)?;
        debug!(
            removed = report.removed,
            updated = report.updated,
            kept = report.kept,
            added = report.added,
            failed = report.failed,
            "pass complete"
        );
        Ok(report)
    }

    /// Destroy every rendered marker and clear the registry
    pub fn reset(&mut self) -> usize {
        let cleared = Reconciler::clear(&mut self.registry, &mut self.renderer);
        info!(cleared, "cleared marker registry");
        cleared
    }

    pub fn item_count(&self) -> usize {
        self.source.item_count()
    }

    pub fn registry(&self) -> &MarkerRegistry<R::Handle> {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, R> PassRunner for DelimiterPass<S, R>
where
    S: ListSource,
    R: Renderer + Send + 'static,
    R::Handle: Send,
{
    fn run_pass(&mut self) -> anyhow::Result<()> {
        match self.run() {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "abandoning reconciliation pass");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SharedList;
    use chrono::NaiveDate;
    use dayline_core::{FixedClock, Item};
    use dayline_registry::MemoryRenderer;

    fn pass(list: &SharedList) -> DelimiterPass<SharedList, MemoryRenderer> {
        let today = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
        DelimiterPass::with_clock(
            list.clone(),
            MemoryRenderer::new(),
            DelimiterPlanner::default(),
            Arc::new(FixedClock(today)),
        )
    }

    fn scenario() -> Vec<Item> {
        vec![
            Item::new(0, Some(0.0), Some("Friday, November 21, 2025 at 3:45 PM")),
            Item::new(1, Some(40.0), Some("Friday, November 21, 2025 at 1:10 PM")),
            Item::new(2, Some(80.0), Some("Thursday, November 20, 2025 at 11:02 AM")),
        ]
    }

    #[test]
    fn test_pass_renders_markers() {
        let list = SharedList::new();
        list.replace(scenario());
        let mut pass = pass(&list);

        let report = pass.run().unwrap();

        assert_eq!(report.added, 2);
        assert_eq!(pass.renderer().labels(), vec!["Today", "Yesterday"]);
        assert_eq!(pass.registry().len(), 2);
    }

    #[test]
    fn test_second_identical_pass_is_quiet() {
        let list = SharedList::new();
        list.replace(scenario());
        let mut pass = pass(&list);
        pass.run().unwrap();
        pass.renderer_mut().reset_calls();

        let report = pass.run().unwrap();

        assert_eq!(report.mutations(), 0);
        assert_eq!(pass.renderer().calls().total(), 0);
    }

    #[test]
    fn test_missing_list_aborts_pass() {
        let list = SharedList::detached();
        let mut pass = pass(&list);
        assert_eq!(
            pass.run().unwrap_err(),
            PassError::ListUnavailable(SourceError::Unavailable)
        );
        assert!(pass.run_pass().is_err());
    }

    #[test]
    fn test_missing_container_keeps_registry() {
        let list = SharedList::new();
        list.replace(scenario());
        let mut pass = pass(&list);
        pass.run().unwrap();

        pass.renderer_mut().set_available(false);
        list.replace(Vec::new());

        assert_eq!(
            pass.run().unwrap_err(),
            PassError::Reconcile(ReconcileError::CollaboratorUnavailable)
        );
        assert_eq!(pass.registry().len(), 2);
    }

    #[test]
    fn test_reset_clears_surface() {
        let list = SharedList::new();
        list.replace(scenario());
        let mut pass = pass(&list);
        pass.run().unwrap();

        assert_eq!(pass.reset(), 2);
        assert!(pass.registry().is_empty());
        assert!(pass.renderer().is_empty());
    }
}
