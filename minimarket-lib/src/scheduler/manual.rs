//! Virtual-clock scheduler.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{ScheduledTask, Scheduler, TimerToken};

#[derive(Default)]
struct Clock {
    now: Duration,
    /// Pending tasks ordered by deadline, then by scheduling order.
    pending: BTreeMap<(Duration, TimerToken), ScheduledTask>,
}

/// A scheduler whose clock only moves when told to.
///
/// Cloning gives another handle to the same clock.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use minimarket_lib::scheduler::{ManualScheduler, Scheduler};
///
/// let scheduler = ManualScheduler::new();
/// let fired = Arc::new(AtomicBool::new(false));
/// let flag = fired.clone();
/// scheduler.schedule_once(Duration::from_millis(100), Box::new(move || {
///     flag.store(true, Ordering::SeqCst);
/// }));
///
/// scheduler.advance(Duration::from_millis(99));
/// assert!(!fired.load(Ordering::SeqCst));
/// scheduler.advance(Duration::from_millis(1));
/// assert!(fired.load(Ordering::SeqCst));
/// ```
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<Clock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, running every task that comes due in
    /// deadline order. Tasks scheduled by running tasks are honoured if
    /// they fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = match self.clock.lock() {
            Ok(clock) => clock.now + by,
            Err(_) => return,
        };

        loop {
            // Pop under the lock, run without it.
            let task = {
                let Ok(mut clock) = self.clock.lock() else {
                    return;
                };
                let due = clock
                    .pending
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|(deadline, _)| *deadline <= target);
                match due {
                    Some(key) => {
                        clock.now = clock.now.max(key.0);
                        clock.pending.remove(&key)
                    }
                    None => {
                        clock.now = target;
                        None
                    }
                }
            };
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Number of tasks waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.clock.lock().map(|c| c.pending.len()).unwrap_or(0)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: ScheduledTask) -> TimerToken {
        let token = TimerToken::next();
        if let Ok(mut clock) = self.clock.lock() {
            let deadline = clock.now + delay;
            clock.pending.insert((deadline, token), task);
        }
        token
    }

    fn cancel(&self, token: TimerToken) {
        if let Ok(mut clock) = self.clock.lock() {
            clock.pending.retain(|(_, t), _| *t != token);
        }
    }

    fn now(&self) -> Duration {
        self.clock.lock().map(|c| c.now).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> ScheduledTask) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handle = log.clone();
        let make = move |name: &'static str| -> ScheduledTask {
            let log = handle.clone();
            Box::new(move || log.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule_once(Duration::from_millis(300), task("c"));
        scheduler.schedule_once(Duration::from_millis(100), task("a"));
        scheduler.schedule_once(Duration::from_millis(200), task("b"));

        scheduler.advance(Duration::from_millis(250));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.now(), Duration::from_millis(250));
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        let token = scheduler.schedule_once(Duration::from_millis(10), task("x"));
        scheduler.cancel(token);
        scheduler.advance(Duration::from_secs(1));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_same_deadline_keeps_scheduling_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule_once(Duration::from_millis(50), task("first"));
        scheduler.schedule_once(Duration::from_millis(50), task("second"));
        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_task_scheduled_from_task() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        let inner = scheduler.clone();
        let follow_up = task("follow-up");
        scheduler.schedule_once(
            Duration::from_millis(10),
            Box::new(move || {
                inner.schedule_once(Duration::from_millis(10), follow_up);
            }),
        );
        scheduler.advance(Duration::from_millis(25));
        assert_eq!(*log.lock().unwrap(), vec!["follow-up"]);
    }
}
