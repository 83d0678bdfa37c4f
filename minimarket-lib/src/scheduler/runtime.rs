//! Tokio-backed scheduler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::AbortHandle;
use tokio::time::Instant;

use super::{ScheduledTask, Scheduler, TimerToken};

/// Runs each task on its own sleeping tokio task.
///
/// Cancelling aborts the sleeping task, so a cancelled task never runs.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
    started: Instant,
    tasks: Arc<Mutex<HashMap<TimerToken, AbortHandle>>>,
}

impl TokioScheduler {
    /// Spawn timers on the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        // Instant::now needs the runtime's clock when time is paused.
        let started = {
            let _guard = handle.enter();
            Instant::now()
        };
        Self {
            handle,
            started,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Spawn timers on the runtime the caller is running in.
    pub fn from_current() -> Result<Self, TryCurrentError> {
        Ok(Self::new(Handle::try_current()?))
    }

    /// Number of tasks waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: ScheduledTask) -> TimerToken {
        let token = TimerToken::next();
        let tasks = self.tasks.clone();

        // Hold the map lock across the spawn so the task cannot finish and
        // remove itself before its abort handle is registered.
        let Ok(mut pending) = self.tasks.lock() else {
            log::warn!("Timer registry poisoned, dropping {}", token);
            return token;
        };
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let still_pending = tasks
                .lock()
                .map(|mut t| t.remove(&token).is_some())
                .unwrap_or(false);
            if still_pending {
                task();
            }
        });
        pending.insert(token, join.abort_handle());
        token
    }

    fn cancel(&self, token: TimerToken) {
        let handle = self.tasks.lock().ok().and_then(|mut t| t.remove(&token));
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn now(&self) -> Duration {
        let _guard = self.handle.enter();
        Instant::now().saturating_duration_since(self.started)
    }
}
