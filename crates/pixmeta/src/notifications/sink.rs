//! Bounded, newest-first log of user-facing events.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entries beyond this count are evicted, oldest first.
pub const MAX_NOTIFICATIONS: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Processing,
    System,
    Project,
    Api,
    Storage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub archived: bool,
    pub category: NotificationCategory,
}

/// An event before it is assigned an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
}

impl NewNotification {
    pub fn new(
        kind: NotificationKind,
        title: &str,
        message: &str,
        category: NotificationCategory,
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.to_string(),
            category,
        }
    }

    pub fn success(title: &str, message: &str, category: NotificationCategory) -> Self {
        Self::new(NotificationKind::Success, title, message, category)
    }

    pub fn error(title: &str, message: &str, category: NotificationCategory) -> Self {
        Self::new(NotificationKind::Error, title, message, category)
    }

    pub fn warning(title: &str, message: &str, category: NotificationCategory) -> Self {
        Self::new(NotificationKind::Warning, title, message, category)
    }

    pub fn info(title: &str, message: &str, category: NotificationCategory) -> Self {
        Self::new(NotificationKind::Info, title, message, category)
    }
}

/// Append-only notification log capped at [`MAX_NOTIFICATIONS`].
///
/// None of the mutating operations fail for an unknown id; they simply
/// report whether anything changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the event, prepends it and evicts anything past the cap.
    pub fn add(&mut self, event: NewNotification) -> Notification {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            kind: event.kind,
            title: event.title,
            message: event.message,
            timestamp: Utc::now(),
            read: false,
            archived: false,
            category: event.category,
        };

        self.entries.push_front(notification.clone());
        self.entries.truncate(MAX_NOTIFICATIONS);
        notification
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for notification in self.entries.iter_mut() {
            notification.read = true;
        }
    }

    pub fn archive(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.archived = true;
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    /// Newest first.
    pub fn list(&self) -> Vec<Notification> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn unread_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|n| !n.read && !n.archived)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
