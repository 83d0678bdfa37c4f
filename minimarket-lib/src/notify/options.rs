//! Notification queue options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where a front-end stacks notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
    TopCenter,
    BottomCenter,
}

/// Options of a [`NotificationQueue`](super::NotificationQueue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Lifetime of entries that set no duration, in milliseconds.
    pub default_duration_ms: u64,
    /// Lifetime of error entries that set no duration, in milliseconds.
    pub error_duration_ms: u64,
    /// Capacity of the queue.
    pub max_notifications: usize,
    /// Whether `pause` stops the expiry timer.
    pub pause_on_hover: bool,
    /// Whether `click` dismisses the entry.
    pub close_on_click: bool,
    /// Whether a front-end draws a progress bar.
    pub show_progress: bool,
    pub position: NotificationPosition,
}

impl NotificationConfig {
    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms)
    }

    pub fn error_duration(&self) -> Duration {
        Duration::from_millis(self.error_duration_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 4000,
            error_duration_ms: 6000,
            max_notifications: 5,
            pause_on_hover: true,
            close_on_click: true,
            show_progress: true,
            position: NotificationPosition::TopRight,
        }
    }
}
