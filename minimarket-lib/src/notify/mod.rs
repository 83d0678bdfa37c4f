//! Notification queue engine.
//!
//! A [`NotificationQueue`] keeps a bounded, ordered list of transient
//! messages. Entries expire through an injected
//! [`Scheduler`](crate::scheduler::Scheduler), can be paused while hovered,
//! carry action buttons, and every way of dismissing one ends in the same
//! removal routine so `on_close` runs exactly once.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use minimarket_lib::notify::{NotificationConfig, NotificationQueue};
//! use minimarket_lib::scheduler::ManualScheduler;
//!
//! let scheduler = ManualScheduler::new();
//! let queue = NotificationQueue::new(NotificationConfig::default(), Arc::new(scheduler.clone()));
//!
//! queue.success("Venta registrada");
//! assert_eq!(queue.len(), 1);
//!
//! scheduler.advance(Duration::from_secs(4));
//! assert!(queue.is_empty());
//! ```

mod events;
mod notification;
mod options;
mod queue;

pub use events::{DismissReason, NotificationEvent};
pub use notification::{
    Notification, NotificationAction, NotificationHandler, NotificationId, NotificationKind,
    NotificationSpec, NotificationUpdate,
};
pub use options::{NotificationConfig, NotificationPosition};
pub use queue::{NotificationQueue, NotificationView};
