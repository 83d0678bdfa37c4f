//! Minimarket panel engines
//!
//! Render-agnostic building blocks for the minimarket administration panel:
//! a tabular data engine (search, filters, stable sort, pagination,
//! selection, CSV export), a notification queue with scheduler-driven
//! expiry, and the formatting and validation helpers both of them use.

pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod notify;
pub mod scheduler;
pub mod table;
pub mod validation;

pub use config::PanelConfig;
pub use events::SubscriptionId;
pub use format::{FormatSettings, Formatter};
pub use notify::{Notification, NotificationId, NotificationKind, NotificationQueue, NotificationSpec};
pub use scheduler::{ManualScheduler, Scheduler, TimerToken, TokioScheduler};
pub use table::{Column, ColumnKind, DataTable, PageRequest, Row, RowId, TableView, Value};
