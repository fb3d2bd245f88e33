//! Shared state of the notification feeds.
//!
//! The main components are:
//! - `NotificationsState`: a clonable, thread-safe container holding every
//!   user's pending notifications. It is injected into the Actix application
//!   state in `main.rs`.
//! - `NotificationUpdate`: the message a producer sends to append a
//!   notification to one user's feed.
//! - `start_notification_updater`: the long-running task that receives updates
//!   on an MPSC channel and applies them to the shared feeds.

use common::notifications::{Notification, NotificationLevel};
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Oldest entries are dropped once a feed holds this many notifications.
pub const MAX_FEED_LEN: usize = 50;

/// Capacity of the channel between producers and the updater task.
pub const CHANNEL_CAPACITY: usize = 100;

#[derive(Clone)]
pub struct NotificationsState {
    /// Pending notifications per user id, oldest first.
    pub feeds: Arc<RwLock<HashMap<String, VecDeque<Notification>>>>,

    /// Producers send through this; only the updater task writes `feeds`.
    pub tx: mpsc::Sender<NotificationUpdate>,
}

#[derive(Debug)]
pub struct NotificationUpdate {
    pub(crate) user_id: String,
    pub(crate) notification: Notification,
}

impl NotificationsState {
    /// Creates the state and the receiver that must be handed to
    /// [`start_notification_updater`].
    pub fn new() -> (Self, mpsc::Receiver<NotificationUpdate>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let state = Self {
            feeds: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    pub fn notifier(&self) -> Notifier {
        Notifier {
            tx: self.tx.clone(),
        }
    }

    /// Removes and returns everything pending for `user_id`.
    pub async fn drain(&self, user_id: &str) -> Vec<Notification> {
        let mut feeds = self.feeds.write().await;
        feeds
            .remove(user_id)
            .map(Vec::from)
            .unwrap_or_default()
    }
}

/// Applies incoming updates until every sender has been dropped.
///
/// Spawned once as a background task from `main.rs`.
pub async fn start_notification_updater(
    state: NotificationsState,
    mut rx: mpsc::Receiver<NotificationUpdate>,
) {
    while let Some(update) = rx.recv().await {
        match update.notification.level {
            NotificationLevel::Error => warn!(
                "Notifying {} of failure: {}",
                update.user_id, update.notification.message
            ),
            NotificationLevel::Success => debug!(
                "Notifying {}: {}",
                update.user_id, update.notification.message
            ),
        }

        let mut feeds = state.feeds.write().await;
        let feed = feeds.entry(update.user_id).or_default();
        feed.push_back(update.notification);
        while feed.len() > MAX_FEED_LEN {
            feed.pop_front();
        }
    }
}

/// Producer side of the notification channel.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<NotificationUpdate>,
}

impl Notifier {
    pub fn new(tx: mpsc::Sender<NotificationUpdate>) -> Self {
        Self { tx }
    }

    /// Queues a notification. A closed channel only loses the notification;
    /// the operation that produced it is not affected.
    pub async fn send(&self, user_id: &str, notification: Notification) {
        let update = NotificationUpdate {
            user_id: user_id.to_string(),
            notification,
        };
        if self.tx.send(update).await.is_err() {
            warn!("Notification channel closed, dropping message for {}", user_id);
        }
    }
}
