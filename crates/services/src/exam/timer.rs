//! One-second tick sources for the exam countdown.
//!
//! A source only produces ticks; the owner of the `ExamStore` feeds them back
//! through `ExamStore::handle_tick`, so ticks and user actions are applied one
//! at a time by a single owner.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// One tick from the timer started with `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

impl Tick {
    #[must_use]
    pub fn new(generation: u64) -> Self {
        Self { generation }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Cancels a running tick source. Cancelling twice, or dropping after
/// cancelling, does nothing.
pub struct TickGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickGuard {
    #[must_use]
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for TickGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickGuard")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Starts periodic ticks for the exam timer.
pub trait TickSource: Send + Sync {
    /// Begin emitting ticks tagged with `generation` until the guard is cancelled.
    fn start(&self, generation: u64) -> TickGuard;
}

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Tick source backed by a tokio interval task per timer.
#[derive(Clone)]
pub struct TokioTicks {
    handle: Handle,
    tx: mpsc::UnboundedSender<Tick>,
}

impl TokioTicks {
    #[must_use]
    pub fn new(handle: Handle, tx: mpsc::UnboundedSender<Tick>) -> Self {
        Self { handle, tx }
    }

    /// Create a source and the receiver its ticks arrive on.
    #[must_use]
    pub fn channel(handle: Handle) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(handle, tx), rx)
    }
}

impl TickSource for TokioTicks {
    fn start(&self, generation: u64) -> TickGuard {
        let tx = self.tx.clone();
        let task = self.handle.spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Tick::new(generation)).is_err() {
                    break;
                }
            }
        });
        TickGuard::new(move || task.abort())
    }
}

impl fmt::Debug for TokioTicks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioTicks").finish_non_exhaustive()
    }
}

/// Tick source that never ticks on its own; tests drive the store directly
/// and inspect how often the timer was started and cancelled.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    started: Arc<AtomicUsize>,
    cancelled: Arc<AtomicUsize>,
    last_generation: Arc<AtomicU64>,
}

impl ManualTicks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of timers started and not yet cancelled.
    #[must_use]
    pub fn running(&self) -> usize {
        self.started().saturating_sub(self.cancelled())
    }

    /// A tick from the most recently started timer.
    #[must_use]
    pub fn tick(&self) -> Tick {
        Tick::new(self.last_generation.load(Ordering::SeqCst))
    }
}

impl TickSource for ManualTicks {
    fn start(&self, generation: u64) -> TickGuard {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.last_generation.store(generation, Ordering::SeqCst);
        let cancelled = Arc::clone(&self.cancelled);
        TickGuard::new(move || {
            cancelled.fetch_add(1, Ordering::SeqCst);
        })
    }
}
