//! Transient, per-user notifications reported after signature operations.
//!
//! Producers never touch the feeds directly: they push a `NotificationUpdate`
//! through a [`Notifier`] and a single updater task owns the writes. Clients
//! drain their feed through `GET /api/notifications`.

pub mod state;

pub use state::{start_notification_updater, Notifier, NotificationsState};
