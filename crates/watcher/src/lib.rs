//! Date marker maintenance for virtualized lists
//!
//! This crate wires the pure planner and the reconciler to a live list:
//! - Change batch classification (folder switch / scroll / single action)
//! - Debounced, single-flight pass scheduling
//! - Startup gating on the list becoming ready
//! - Configuration and logging bootstrap

pub mod classify;
pub mod config;
pub mod debounce;
pub mod logging;
pub mod reconcile;
pub mod source;
pub mod startup;

pub use classify::{ChangeBatch, ChangeClassifier, ChangeKind, ClassifierThresholds};
pub use config::{ConfigError, LoggingConfig, SchedulerConfig, StartupConfig, WatcherConfig};
pub use debounce::{
    Immediate, LayoutGate, NextFrame, PassRunner, SchedulerState, SchedulerStats, UpdateScheduler,
};
pub use logging::init_tracing;
pub use reconcile::{DelimiterPass, PassError};
pub use source::{ListSource, SharedList, SourceError};
pub use startup::{wait_until_ready, StartupError};

use dayline_core::{Clock, DelimiterPlanner, LocalClock};
use dayline_registry::Renderer;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Keeps date markers in sync with a list as it changes
///
/// Cloning yields another handle to the same watcher.
pub struct DelimiterWatcher<S, R: Renderer> {
    pass: Arc<Mutex<DelimiterPass<S, R>>>,
    scheduler: UpdateScheduler<DelimiterPass<S, R>>,
    classifier: ChangeClassifier,
    startup: StartupConfig,
}

impl<S, R: Renderer> Clone for DelimiterWatcher<S, R> {
    fn clone(&self) -> Self {
        Self {
            pass: Arc::clone(&self.pass),
            scheduler: self.scheduler.clone(),
            classifier: self.classifier,
            startup: self.startup,
        }
    }
}

impl<S, R> DelimiterWatcher<S, R>
where
    S: ListSource,
    R: Renderer + Send + 'static,
    R::Handle: Send,
{
    /// Create a watcher using the wall clock and frame-based layout gate
    pub fn new(config: &WatcherConfig, source: S, renderer: R) -> Self {
        let layout = Arc::new(NextFrame::new(config.scheduler.frame()));
        Self::with_collaborators(config, source, renderer, Arc::new(LocalClock), layout)
    }

    /// Create a watcher with an explicit clock and layout gate
    pub fn with_collaborators(
        config: &WatcherConfig,
        source: S,
        renderer: R,
        clock: Arc<dyn Clock>,
        layout: Arc<dyn LayoutGate>,
    ) -> Self {
        let planner = DelimiterPlanner::new(config.planner);
        let pass = Arc::new(Mutex::new(DelimiterPass::with_clock(
            source, renderer, planner, clock,
        )));
        let scheduler =
            UpdateScheduler::new(Arc::clone(&pass), layout, config.scheduler.debounce());

        Self {
            pass,
            scheduler,
            classifier: ChangeClassifier::new(config.classifier),
            startup: config.startup,
        }
    }

    /// Handle one batch of row insertions/removals
    ///
    /// Returns `None` for batches that touched no rows. A folder switch
    /// clears the registry before the pass is scheduled; a pass already in
    /// flight is not cancelled.
    pub fn on_items_changed(&self, batch: ChangeBatch) -> Option<ChangeKind> {
        if batch.is_empty() {
            return None;
        }

        let total = self.pass.lock().item_count();
        let kind = self.classifier.classify(batch, total);
        info!(
            added = batch.added,
            removed = batch.removed,
            total,
            kind = %kind,
            "change detected"
        );

        if kind.requires_reset() {
            self.pass.lock().reset();
        }

        self.scheduler.request();
        Some(kind)
    }

    /// Schedule a pass without a change batch
    pub fn request_update(&self) {
        self.scheduler.request();
    }

    /// Wait for the list, run an initial pass, then follow `changes`
    ///
    /// Returns once the change feed closes, or with an error if the list
    /// never appeared.
    pub async fn start(&self, changes: mpsc::Receiver<ChangeBatch>) -> Result<(), StartupError> {
        let pass = Arc::clone(&self.pass);
        wait_until_ready(
            move || pass.lock().item_count() > 0,
            self.startup.poll_interval(),
            self.startup.timeout(),
        )
        .await?;

        self.scheduler.request();
        self.run(changes).await;
        Ok(())
    }

    /// Classify and schedule batches until the feed closes
    ///
    /// Batches already queued when one is received are merged into it, so a
    /// burst is classified as a whole.
    pub async fn run(&self, mut changes: mpsc::Receiver<ChangeBatch>) {
        while let Some(mut batch) = changes.recv().await {
            let mut merged = 1;
            while let Ok(next) = changes.try_recv() {
                batch = batch.merge(next);
                merged += 1;
            }
            if merged > 1 {
                debug!(merged, "coalesced queued change batches");
            }
            self.on_items_changed(batch);
        }
        debug!("change feed closed");
    }

    pub fn scheduler(&self) -> &UpdateScheduler<DelimiterPass<S, R>> {
        &self.scheduler
    }

    /// Inspect the pass state (registry, renderer, source)
    pub fn inspect<T>(&self, f: impl FnOnce(&DelimiterPass<S, R>) -> T) -> T {
        f(&self.pass.lock())
    }
}
