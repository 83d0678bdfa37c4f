//! Delayed-callback scheduling.
//!
//! Engines that expire things over time (the notification queue) never touch
//! a timer API directly. They take a [`Scheduler`] and ask it to run a task
//! once after a delay. [`ManualScheduler`] drives a virtual clock for tests;
//! [`TokioScheduler`] sleeps on a tokio runtime.

mod manual;
mod runtime;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

/// Work run once when a timer fires.
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__timer_{}", self.0)
    }
}

/// Runs tasks once after a delay.
///
/// Implementations must never run a task while the caller of
/// [`schedule_once`](Scheduler::schedule_once) or [`cancel`](Scheduler::cancel)
/// is still inside the call, and a cancelled task must never run.
pub trait Scheduler: Send + Sync {
    /// Run `task` once, `delay` from now.
    fn schedule_once(&self, delay: Duration, task: ScheduledTask) -> TimerToken;

    /// Cancel a pending task. Unknown or already fired tokens are ignored.
    fn cancel(&self, token: TimerToken);

    /// Time elapsed on this scheduler's clock.
    fn now(&self) -> Duration;
}
