//! Notification model and builders.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Callback receiving the notification it belongs to.
pub type NotificationHandler = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Unique notification identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(String);

impl NotificationId {
    pub(crate) fn generate() -> Self {
        Self(format!("notification_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl NotificationKind {
    /// Title used when none is given.
    pub fn default_title(self) -> &'static str {
        match self {
            NotificationKind::Success => "Éxito",
            NotificationKind::Error => "Error",
            NotificationKind::Warning => "Advertencia",
            NotificationKind::Info => "Información",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        };
        f.write_str(name)
    }
}

/// A button on a notification.
#[derive(Clone)]
pub struct NotificationAction {
    pub name: String,
    pub label: String,
    /// Style hint (`primary`, `secondary`, ...).
    pub style: String,
    pub handler: Option<NotificationHandler>,
    /// Whether running the action dismisses the notification.
    pub close_on_click: bool,
}

impl NotificationAction {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            style: "primary".to_string(),
            handler: None,
            close_on_click: true,
        }
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn handler(mut self, handler: impl Fn(&Notification) + Send + Sync + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Keep the notification open after the action runs.
    pub fn keep_open(mut self) -> Self {
        self.close_on_click = false;
        self
    }
}

impl fmt::Debug for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationAction")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("style", &self.style)
            .field("handler", &self.handler.is_some())
            .field("close_on_click", &self.close_on_click)
            .finish()
    }
}

/// A message held by the queue.
#[derive(Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub message: String,
    /// Time until auto-dismissal. Zero means manual dismissal only.
    pub duration: Duration,
    /// Persistent notifications never expire.
    pub persistent: bool,
    pub actions: Vec<NotificationAction>,
    pub on_click: Option<NotificationHandler>,
    pub on_close: Option<NotificationHandler>,
    /// Scheduler clock reading when the notification was shown.
    pub created_at: Duration,
}

impl Notification {
    /// Whether an expiry timer applies.
    pub fn expires(&self) -> bool {
        !self.persistent && !self.duration.is_zero()
    }

    /// Find an action by name.
    pub fn action(&self, name: &str) -> Option<&NotificationAction> {
        self.actions.iter().find(|a| a.name == name)
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("duration", &self.duration)
            .field("persistent", &self.persistent)
            .field("actions", &self.actions)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// What to show.
///
/// Unset fields take the queue's defaults: kind `info`, the configured
/// duration, no title.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use minimarket_lib::notify::{NotificationKind, NotificationSpec};
///
/// let spec = NotificationSpec::new("Stock bajo")
///     .kind(NotificationKind::Warning)
///     .title("Inventario")
///     .duration(Duration::from_secs(10));
/// ```
#[derive(Clone, Default)]
pub struct NotificationSpec {
    pub kind: Option<NotificationKind>,
    pub title: Option<String>,
    pub message: String,
    pub duration: Option<Duration>,
    pub persistent: bool,
    pub actions: Vec<NotificationAction>,
    pub on_click: Option<NotificationHandler>,
    pub on_close: Option<NotificationHandler>,
}

impl NotificationSpec {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn action(mut self, action: NotificationAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn on_click(mut self, handler: impl Fn(&Notification) + Send + Sync + 'static) -> Self {
        self.on_click = Some(Arc::new(handler));
        self
    }

    pub fn on_close(mut self, handler: impl Fn(&Notification) + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(handler));
        self
    }
}

impl From<String> for NotificationSpec {
    fn from(message: String) -> Self {
        NotificationSpec::new(message)
    }
}

impl From<&str> for NotificationSpec {
    fn from(message: &str) -> Self {
        NotificationSpec::new(message)
    }
}

/// Fields to change on a shown notification. `None` leaves a field alone.
#[derive(Clone, Default)]
pub struct NotificationUpdate {
    pub kind: Option<NotificationKind>,
    pub title: Option<String>,
    pub message: Option<String>,
    /// A new duration restarts the expiry timer from the update.
    pub duration: Option<Duration>,
    pub persistent: Option<bool>,
    pub actions: Option<Vec<NotificationAction>>,
}

impl NotificationUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = Some(persistent);
        self
    }

    pub fn actions(mut self, actions: Vec<NotificationAction>) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Apply to `notification`.
    pub(crate) fn apply(self, notification: &mut Notification) {
        if let Some(kind) = self.kind {
            notification.kind = kind;
        }
        if let Some(title) = self.title {
            notification.title = Some(title);
        }
        if let Some(message) = self.message {
            notification.message = message;
        }
        if let Some(duration) = self.duration {
            notification.duration = duration;
        }
        if let Some(persistent) = self.persistent {
            notification.persistent = persistent;
        }
        if let Some(actions) = self.actions {
            notification.actions = actions;
        }
    }
}
