//! Debounced, single-flight reconciliation scheduling
//!
//! Bursts of change notifications collapse into one pass:
//! - `request()` (re)arms a short debounce timer, cancelling the previous one
//! - when the timer fires while a pass is running, it re-arms instead
//! - otherwise the pass waits for a stable layout and then runs
//!
//! At most one pass runs at a time and the running flag is released on every
//! exit path, including a panicking pass.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One unit of work the scheduler runs
pub trait PassRunner: Send + 'static {
    fn run_pass(&mut self) -> anyhow::Result<()>;
}

/// Yields until positions read from the host are stable
#[async_trait]
pub trait LayoutGate: Send + Sync {
    async fn wait_for_stable_layout(&self);
}

/// Waits out one rendering frame
#[derive(Debug, Clone, Copy)]
pub struct NextFrame {
    frame: Duration,
}

impl NextFrame {
    pub fn new(frame: Duration) -> Self {
        Self { frame }
    }
}

impl Default for NextFrame {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

#[async_trait]
impl LayoutGate for NextFrame {
    async fn wait_for_stable_layout(&self) {
        tokio::time::sleep(self.frame).await;
    }
}

/// Layout is always stable; yields once to the runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

#[async_trait]
impl LayoutGate for Immediate {
    async fn wait_for_stable_layout(&self) {
        tokio::task::yield_now().await;
    }
}

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing armed, nothing running
    Idle,
    /// Debounce timer armed
    Pending,
    /// A pass holds the lock
    Running,
}

/// Scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// `request()` calls
    pub requests: u64,
    /// Passes started
    pub passes: u64,
    /// Passes that returned an error or panicked
    pub failures: u64,
    /// Timer firings deferred because a pass was running
    pub reschedules: u64,
}

#[derive(Default)]
struct TimerSlot {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

struct Shared<P> {
    pass: Arc<Mutex<P>>,
    layout: Arc<dyn LayoutGate>,
    debounce: Duration,
    timer: Mutex<TimerSlot>,
    running: AtomicBool,
    stats: Mutex<SchedulerStats>,
    idle: Notify,
}

/// Debounce timer plus execution lock around a [`PassRunner`]
///
/// Cloning yields another handle to the same scheduler. Requests must be made
/// from within a Tokio runtime.
pub struct UpdateScheduler<P> {
    shared: Arc<Shared<P>>,
}

impl<P> Clone for UpdateScheduler<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P: PassRunner> UpdateScheduler<P> {
    pub fn new(pass: Arc<Mutex<P>>, layout: Arc<dyn LayoutGate>, debounce: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                pass,
                layout,
                debounce,
                timer: Mutex::new(TimerSlot::default()),
                running: AtomicBool::new(false),
                stats: Mutex::new(SchedulerStats::default()),
                idle: Notify::new(),
            }),
        }
    }

    /// Ask for a reconciliation pass
    ///
    /// Cancels any armed timer and arms a new one; repeated calls within one
    /// debounce interval produce a single pass.
    pub fn request(&self) {
        self.shared.stats.lock().requests += 1;
        let mut slot = self.shared.timer.lock();
        arm(&self.shared, &mut slot);
    }

    /// Disarm a pending timer; a running pass is left alone
    pub fn cancel(&self) {
        let mut slot = self.shared.timer.lock();
        if let Some(handle) = slot.handle.take() {
            handle.abort();
            slot.generation += 1;
        }
        if !self.shared.running.load(Ordering::SeqCst) {
            self.shared.idle.notify_waiters();
        }
    }

    pub fn state(&self) -> SchedulerState {
        let slot = self.shared.timer.lock();
        if self.shared.running.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else if slot.handle.is_some() {
            SchedulerState::Pending
        } else {
            SchedulerState::Idle
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        *self.shared.stats.lock()
    }

    /// Resolve once nothing is armed or running
    pub async fn settled(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if self.state() == SchedulerState::Idle {
                return;
            }
            notified.await;
        }
    }
}

fn arm<P: PassRunner>(shared: &Arc<Shared<P>>, slot: &mut TimerSlot) {
    if let Some(previous) = slot.handle.take() {
        previous.abort();
    }
    slot.generation += 1;
    slot.handle = Some(tokio::spawn(run_timer(Arc::clone(shared), slot.generation)));
}

enum Begin {
    Superseded,
    Busy,
    Run,
}

fn try_begin<P>(shared: &Shared<P>, generation: u64) -> Begin {
    let mut slot = shared.timer.lock();
    if slot.generation != generation {
        return Begin::Superseded;
    }
    if shared.running.load(Ordering::SeqCst) {
        return Begin::Busy;
    }
    // Detach from the slot so a later request cannot abort this pass
    slot.handle = None;
    shared.running.store(true, Ordering::SeqCst);
    Begin::Run
}

async fn run_timer<P: PassRunner>(shared: Arc<Shared<P>>, generation: u64) {
    loop {
        tokio::time::sleep(shared.debounce).await;
        match try_begin(&shared, generation) {
            Begin::Superseded => return,
            Begin::Busy => {
                debug!("update already in progress, rescheduling");
                shared.stats.lock().reschedules += 1;
            }
            Begin::Run => break,
        }
    }

    let _guard = RunningGuard { shared: &shared };
    shared.stats.lock().passes += 1;

    shared.layout.wait_for_stable_layout().await;

    let result = shared.pass.lock().run_pass();
    if let Err(e) = result {
        warn!(error = %e, "reconciliation pass failed");
        shared.stats.lock().failures += 1;
    }
}

struct RunningGuard<'a, P> {
    shared: &'a Shared<P>,
}

impl<P> Drop for RunningGuard<'_, P> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!("reconciliation pass panicked, releasing lock");
            self.shared.stats.lock().failures += 1;
        }
        let slot = self.shared.timer.lock();
        self.shared.running.store(false, Ordering::SeqCst);
        if slot.handle.is_none() {
            self.shared.idle.notify_waiters();
        }
    }
}
