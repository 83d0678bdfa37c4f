//! The notification queue handle.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::events::{Listener, Listeners, SubscriptionId};
use crate::scheduler::{Scheduler, TimerToken};

use super::events::{DismissReason, NotificationEvent};
use super::notification::{
    Notification, NotificationAction, NotificationId, NotificationKind, NotificationSpec,
    NotificationUpdate,
};
use super::options::NotificationConfig;

/// One queued notification and its timer state.
struct Entry {
    notification: Notification,
    timer: Option<TimerToken>,
    /// Scheduler time at which the running timer fires.
    deadline: Option<Duration>,
    /// Time left while paused.
    paused: Option<Duration>,
    /// Bumped whenever the timer changes; a firing timer whose generation
    /// no longer matches is stale and does nothing.
    generation: u64,
    /// Set once removal started; the entry stays queued until `on_close`
    /// returns.
    closing: bool,
}

impl Entry {
    fn new(notification: Notification) -> Self {
        Self {
            notification,
            timer: None,
            deadline: None,
            paused: None,
            generation: 0,
            closing: false,
        }
    }
}

#[derive(Default)]
struct Inner {
    entries: Vec<Entry>,
    listeners: Listeners<NotificationEvent>,
}

impl Inner {
    fn open_mut(&mut self, id: &NotificationId) -> Option<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| !e.closing && e.notification.id == *id)
    }

    fn open(&self, id: &NotificationId) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| !e.closing && e.notification.id == *id)
    }
}

struct Shared {
    config: NotificationConfig,
    scheduler: Arc<dyn Scheduler>,
    inner: Mutex<Inner>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Ok(inner) = self.inner.get_mut() {
            for entry in &mut inner.entries {
                if let Some(token) = entry.timer.take() {
                    self.scheduler.cancel(token);
                }
            }
        }
    }
}

/// Render-agnostic view of one queued notification.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub notification: Notification,
    /// Time until expiry, if a timer applies.
    pub remaining: Option<Duration>,
    pub paused: bool,
}

/// A bounded, ordered queue of notifications.
///
/// `NotificationQueue` is a cheap handle; clones share the same queue.
/// Expiry timers hold only a weak reference, so dropping every handle
/// drops the queue and cancels its timers.
///
/// Callbacks (`on_close`, `on_click`, action handlers, subscribers) run
/// with no internal lock held and may call back into the queue.
#[derive(Clone)]
pub struct NotificationQueue {
    shared: Arc<Shared>,
}

impl NotificationQueue {
    /// Create a queue whose timers run on `scheduler`.
    pub fn new(config: NotificationConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                scheduler,
                inner: Mutex::new(Inner::default()),
            }),
        }
    }

    /// The options in use.
    pub fn config(&self) -> &NotificationConfig {
        &self.shared.config
    }

    fn capacity(&self) -> usize {
        self.shared.config.max_notifications.max(1)
    }

    // -------------------------------------------------------------------------
    // Showing
    // -------------------------------------------------------------------------

    /// Show a notification and return its id.
    ///
    /// When the queue is full the oldest non-persistent entry is evicted
    /// first (the oldest entry if all are persistent).
    pub fn show(&self, spec: impl Into<NotificationSpec>) -> NotificationId {
        let spec = spec.into();
        self.make_room();

        let notification = Notification {
            id: NotificationId::generate(),
            kind: spec.kind.unwrap_or_default(),
            title: spec.title,
            message: spec.message,
            duration: spec
                .duration
                .unwrap_or_else(|| self.shared.config.default_duration()),
            persistent: spec.persistent,
            actions: spec.actions,
            on_click: spec.on_click,
            on_close: spec.on_close,
            created_at: self.shared.scheduler.now(),
        };
        let id = notification.id.clone();

        let listeners = {
            let Ok(mut inner) = self.shared.inner.lock() else {
                return id;
            };
            let mut entry = Entry::new(notification);
            if entry.notification.expires() {
                let duration = entry.notification.duration;
                self.arm(&mut entry, duration);
            }
            inner.entries.push(entry);
            inner.listeners.snapshot()
        };

        log::debug!("Showing notification {}", id);
        emit(listeners, &NotificationEvent::Shown { id: id.clone() });
        id
    }

    fn make_room(&self) {
        loop {
            let victim = {
                let Ok(inner) = self.shared.inner.lock() else {
                    return;
                };
                let open: Vec<&Entry> = inner.entries.iter().filter(|e| !e.closing).collect();
                if open.len() < self.capacity() {
                    return;
                }
                let oldest = open
                    .iter()
                    .find(|e| !e.notification.persistent)
                    .or(open.first())
                    .map(|e| e.notification.id.clone());
                oldest
            };
            match victim {
                Some(id) if self.dismiss(&id, DismissReason::Eviction) => {}
                _ => return,
            }
        }
    }

    fn show_kind(&self, kind: NotificationKind, spec: impl Into<NotificationSpec>) -> NotificationId {
        let mut spec = spec.into();
        spec.kind = Some(kind);
        spec.title
            .get_or_insert_with(|| kind.default_title().to_string());
        if kind == NotificationKind::Error && spec.duration.is_none() {
            spec.duration = Some(self.shared.config.error_duration());
        }
        self.show(spec)
    }

    /// Show a success notification.
    pub fn success(&self, spec: impl Into<NotificationSpec>) -> NotificationId {
        self.show_kind(NotificationKind::Success, spec)
    }

    /// Show an error notification. Errors stay longer by default.
    pub fn error(&self, spec: impl Into<NotificationSpec>) -> NotificationId {
        self.show_kind(NotificationKind::Error, spec)
    }

    /// Show a warning notification.
    pub fn warning(&self, spec: impl Into<NotificationSpec>) -> NotificationId {
        self.show_kind(NotificationKind::Warning, spec)
    }

    /// Show an info notification.
    pub fn info(&self, spec: impl Into<NotificationSpec>) -> NotificationId {
        self.show_kind(NotificationKind::Info, spec)
    }

    /// Ask for confirmation with a persistent warning carrying
    /// `cancel` and `confirm` actions.
    pub fn confirm_action(
        &self,
        message: impl Into<String>,
        on_confirm: impl Fn(&Notification) + Send + Sync + 'static,
    ) -> NotificationId {
        self.show(
            NotificationSpec::new(message)
                .kind(NotificationKind::Warning)
                .title("Confirmar acción")
                .persistent()
                .action(NotificationAction::new("cancel", "Cancelar").style("secondary"))
                .action(NotificationAction::new("confirm", "Confirmar").handler(on_confirm)),
        )
    }

    /// Show a persistent "loading" notification, to be updated or removed
    /// when the work finishes.
    pub fn loading(&self, message: impl Into<String>) -> NotificationId {
        self.show(
            NotificationSpec::new(message)
                .kind(NotificationKind::Info)
                .title("Cargando...")
                .persistent(),
        )
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    /// Dismiss a notification. Unknown ids and repeated calls are no-ops.
    pub fn remove(&self, id: &NotificationId) -> bool {
        self.dismiss(id, DismissReason::User)
    }

    /// Dismiss every notification.
    pub fn clear(&self) {
        let ids: Vec<NotificationId> = match self.shared.inner.lock() {
            Ok(inner) => inner
                .entries
                .iter()
                .filter(|e| !e.closing)
                .map(|e| e.notification.id.clone())
                .collect(),
            Err(_) => return,
        };
        for id in &ids {
            self.dismiss(id, DismissReason::Cleared);
        }
    }

    /// Every removal goes through here.
    ///
    /// The entry is marked closing and its timer cancelled under the lock;
    /// `on_close` then runs unlocked while the entry is still queued, and
    /// only afterwards is the entry dropped.
    fn dismiss(&self, id: &NotificationId, reason: DismissReason) -> bool {
        let closing = {
            let Ok(mut inner) = self.shared.inner.lock() else {
                return false;
            };
            let Some(entry) = inner.open_mut(id) else {
                log::debug!("Ignoring removal of unknown notification {}", id);
                return false;
            };
            entry.closing = true;
            self.disarm(entry);
            entry.paused = None;
            entry.notification.clone()
        };

        if let Some(on_close) = &closing.on_close {
            on_close(&closing);
        }

        let listeners = {
            let Ok(mut inner) = self.shared.inner.lock() else {
                return true;
            };
            inner.entries.retain(|e| e.notification.id != *id);
            inner.listeners.snapshot()
        };

        log::debug!("Removed notification {} ({:?})", id, reason);
        emit(
            listeners,
            &NotificationEvent::Removed {
                id: id.clone(),
                reason,
            },
        );
        true
    }

    fn expire(&self, id: &NotificationId, generation: u64) {
        let current = match self.shared.inner.lock() {
            Ok(inner) => inner
                .open(id)
                .is_some_and(|e| e.generation == generation && e.timer.is_some()),
            Err(_) => false,
        };
        if current {
            self.dismiss(id, DismissReason::Timer);
        }
    }

    // -------------------------------------------------------------------------
    // Timers
    // -------------------------------------------------------------------------

    fn arm(&self, entry: &mut Entry, delay: Duration) {
        self.disarm(entry);
        entry.paused = None;

        let generation = entry.generation;
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let id = entry.notification.id.clone();
        let token = self.shared.scheduler.schedule_once(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    NotificationQueue { shared }.expire(&id, generation);
                }
            }),
        );
        entry.timer = Some(token);
        entry.deadline = Some(self.shared.scheduler.now() + delay);
    }

    fn disarm(&self, entry: &mut Entry) {
        if let Some(token) = entry.timer.take() {
            self.shared.scheduler.cancel(token);
        }
        entry.deadline = None;
        entry.generation += 1;
    }

    // -------------------------------------------------------------------------
    // Updates & interaction
    // -------------------------------------------------------------------------

    /// Merge `patch` into a notification.
    ///
    /// The expiry timer keeps running unless the patch carries a duration,
    /// in which case it restarts from now. Becoming persistent (or getting
    /// a zero duration) stops it; a persistent entry made non-persistent
    /// starts a fresh timer.
    pub fn update(&self, id: &NotificationId, patch: NotificationUpdate) -> bool {
        let listeners = {
            let Ok(mut inner) = self.shared.inner.lock() else {
                return false;
            };
            let Some(entry) = inner.open_mut(id) else {
                log::debug!("Ignoring update of unknown notification {}", id);
                return false;
            };

            let new_duration = patch.duration.is_some();
            patch.apply(&mut entry.notification);
            let duration = entry.notification.duration;

            if !entry.notification.expires() {
                self.disarm(entry);
                entry.paused = None;
            } else if entry.paused.is_some() {
                if new_duration {
                    entry.paused = Some(duration);
                }
            } else if new_duration || entry.timer.is_none() {
                self.arm(entry, duration);
            }
            inner.listeners.snapshot()
        };

        emit(listeners, &NotificationEvent::Updated { id: id.clone() });
        true
    }

    /// Stop the expiry timer while the pointer hovers the notification.
    ///
    /// Returns false if pausing is disabled or nothing is running.
    pub fn pause(&self, id: &NotificationId) -> bool {
        if !self.shared.config.pause_on_hover {
            return false;
        }
        let Ok(mut inner) = self.shared.inner.lock() else {
            return false;
        };
        let Some(entry) = inner.open_mut(id) else {
            return false;
        };
        let Some(deadline) = entry.deadline else {
            return false;
        };
        let remaining = deadline.saturating_sub(self.shared.scheduler.now());
        self.disarm(entry);
        entry.paused = Some(remaining);
        true
    }

    /// Restart a paused timer with the time it had left.
    pub fn resume(&self, id: &NotificationId) -> bool {
        let Ok(mut inner) = self.shared.inner.lock() else {
            return false;
        };
        let Some(entry) = inner.open_mut(id) else {
            return false;
        };
        let Some(remaining) = entry.paused.take() else {
            return false;
        };
        self.arm(entry, remaining);
        true
    }

    /// Body click: run `on_click`, then dismiss if `close_on_click` is set.
    pub fn click(&self, id: &NotificationId) -> bool {
        let notification = match self.shared.inner.lock() {
            Ok(inner) => match inner.open(id) {
                Some(entry) => entry.notification.clone(),
                None => return false,
            },
            Err(_) => return false,
        };
        if let Some(on_click) = &notification.on_click {
            on_click(&notification);
        }
        if self.shared.config.close_on_click {
            self.dismiss(id, DismissReason::User);
        }
        true
    }

    /// Run action `name` of a notification, then dismiss it unless the
    /// action keeps it open. Returns false for unknown ids or actions.
    pub fn trigger_action(&self, id: &NotificationId, name: &str) -> bool {
        let (notification, action) = {
            let Ok(inner) = self.shared.inner.lock() else {
                return false;
            };
            let Some(entry) = inner.open(id) else {
                return false;
            };
            let Some(action) = entry.notification.action(name).cloned() else {
                log::debug!("Notification {} has no action '{}'", id, name);
                return false;
            };
            (entry.notification.clone(), action)
        };

        if let Some(handler) = &action.handler {
            handler(&notification);
        }
        if action.close_on_click {
            self.dismiss(id, DismissReason::User);
        }
        true
    }

    // -------------------------------------------------------------------------
    // Reading
    // -------------------------------------------------------------------------

    /// Number of queued notifications.
    pub fn len(&self) -> usize {
        self.shared
            .inner
            .lock()
            .map(|inner| inner.entries.len())
            .unwrap_or(0)
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a notification is queued.
    pub fn contains(&self, id: &NotificationId) -> bool {
        self.shared
            .inner
            .lock()
            .map(|inner| inner.entries.iter().any(|e| e.notification.id == *id))
            .unwrap_or(false)
    }

    /// A copy of one notification.
    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        let inner = self.shared.inner.lock().ok()?;
        inner
            .entries
            .iter()
            .find(|e| e.notification.id == *id)
            .map(|e| e.notification.clone())
    }

    /// Queued notifications in insertion order.
    pub fn snapshot(&self) -> Vec<NotificationView> {
        let now = self.shared.scheduler.now();
        let Ok(inner) = self.shared.inner.lock() else {
            return Vec::new();
        };
        inner
            .entries
            .iter()
            .map(|e| NotificationView {
                notification: e.notification.clone(),
                remaining: e
                    .paused
                    .or_else(|| e.deadline.map(|d| d.saturating_sub(now))),
                paused: e.paused.is_some(),
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Subscribe to queue changes.
    pub fn subscribe(
        &self,
        listener: impl Fn(&NotificationEvent) + Send + Sync + 'static,
    ) -> Option<SubscriptionId> {
        let mut inner = self.shared.inner.lock().ok()?;
        Some(inner.listeners.subscribe(listener))
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared
            .inner
            .lock()
            .map(|mut inner| inner.listeners.unsubscribe(id))
            .unwrap_or(false)
    }
}

fn emit(listeners: Vec<Listener<NotificationEvent>>, event: &NotificationEvent) {
    for listener in listeners {
        listener(event);
    }
}

impl fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("config", &self.shared.config)
            .field("len", &self.len())
            .finish()
    }
}
