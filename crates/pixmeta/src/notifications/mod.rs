//! Notification sink and external delivery.

pub mod sink;
pub mod webhook;

pub use sink::{
    NewNotification, Notification, NotificationCategory, NotificationKind, NotificationLog,
    MAX_NOTIFICATIONS,
};
pub use webhook::{deliver_detached, ExternalNotifier, WebhookNotifier};
