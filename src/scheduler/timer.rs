//! Repeating timers for the scheduler.
//!
//! A timer never touches scheduler state. It only sends [`Tick`] messages
//! carrying the generation it was scheduled under; the service loop feeds them
//! back into [`ModeScheduler::tick`](super::ModeScheduler::tick), which drops
//! ticks from a superseded generation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

/// Message sent by a timer once per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Generation the timer was scheduled under.
    pub generation: u64,
}

/// Something that can run a repeating timer.
pub trait TaskScheduler: Send {
    /// Schedules a repeating timer. The first tick fires one `period` from now.
    fn schedule_repeating(&mut self, period: Duration, generation: u64) -> TaskHandle;
}

/// Cancels a scheduled timer exactly once, either explicitly or on drop.
pub struct TaskHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TaskHandle {
    /// Wraps a cancellation callback.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancels the timer.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Production timer: a spawned tokio task per schedule.
pub struct TokioTaskScheduler {
    ticks: UnboundedSender<Tick>,
}

impl TokioTaskScheduler {
    /// Creates a scheduler whose timers send ticks to `ticks`.
    pub fn new(ticks: UnboundedSender<Tick>) -> Self {
        Self { ticks }
    }
}

impl TaskScheduler for TokioTaskScheduler {
    fn schedule_repeating(&mut self, period: Duration, generation: u64) -> TaskHandle {
        let ticks = self.ticks.clone();
        let start = Instant::now() + period;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                trace!("Timer tick (generation {})", generation);
                if ticks.send(Tick { generation }).is_err() {
                    break;
                }
            }
        });

        let abort = task.abort_handle();
        TaskHandle::new(move || abort.abort())
    }
}

/// A schedule recorded by [`ManualTaskScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    /// Requested period.
    pub period: Duration,
    /// Generation passed at schedule time.
    pub generation: u64,
    /// Whether the handle has been cancelled.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct ManualState {
    tasks: Vec<ScheduledTask>,
    cancellations: usize,
}

/// Timer that never fires on its own.
///
/// It records every schedule and cancellation so tests can assert on them and
/// drive ticks by hand. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct ManualTaskScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTaskScheduler {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every schedule so far, oldest first.
    pub fn scheduled(&self) -> Vec<ScheduledTask> {
        self.state
            .lock()
            .map(|s| s.tasks.clone())
            .unwrap_or_default()
    }

    /// Schedules that have not been cancelled.
    pub fn active(&self) -> Vec<ScheduledTask> {
        self.scheduled()
            .into_iter()
            .filter(|t| !t.cancelled)
            .collect()
    }

    /// Total number of cancellations.
    pub fn cancellations(&self) -> usize {
        self.state.lock().map(|s| s.cancellations).unwrap_or(0)
    }
}

impl TaskScheduler for ManualTaskScheduler {
    fn schedule_repeating(&mut self, period: Duration, generation: u64) -> TaskHandle {
        let slot = match self.state.lock() {
            Ok(mut state) => {
                state.tasks.push(ScheduledTask {
                    period,
                    generation,
                    cancelled: false,
                });
                state.tasks.len() - 1
            }
            Err(_) => return TaskHandle::new(|| {}),
        };

        let state = Arc::clone(&self.state);
        TaskHandle::new(move || {
            if let Ok(mut state) = state.lock() {
                state.cancellations += 1;
                if let Some(task) = state.tasks.get_mut(slot) {
                    task.cancelled = true;
                }
            }
        })
    }
}
