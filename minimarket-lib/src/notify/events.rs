//! Events published by the notification queue.

use super::notification::NotificationId;

/// Why an entry left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// Its expiry timer fired.
    Timer,
    /// Closed explicitly (close button, click, action).
    User,
    /// Pushed out by a newer entry when the queue was full.
    Eviction,
    /// Removed by [`clear`](super::NotificationQueue::clear).
    Cleared,
}

/// State change of the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown { id: NotificationId },
    Updated { id: NotificationId },
    Removed { id: NotificationId, reason: DismissReason },
}
