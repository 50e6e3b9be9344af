//! Fire-and-forget delivery of processing messages to external sinks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{header, Client};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NotificationSettings;
use crate::error::NotifyError;

/// An external destination for processing messages (chat webhook, pager...).
#[async_trait]
pub trait ExternalNotifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    source: &'static str,
    timestamp: String,
}

/// Posts `{"text": ...}` JSON to every configured URL.
pub struct WebhookNotifier {
    client: Client,
    urls: Vec<String>,
}

impl WebhookNotifier {
    pub fn new(urls: Vec<String>) -> Result<Self, NotifyError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("pixmeta/", env!("CARGO_PKG_VERSION"))),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, urls })
    }

    /// Builds a notifier for the configured webhooks, or `None` when there
    /// are none.
    pub fn from_settings(settings: &NotificationSettings) -> Result<Option<Self>, NotifyError> {
        if settings.webhook_urls.is_empty() {
            return Ok(None);
        }
        Self::new(settings.webhook_urls.clone()).map(Some)
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    async fn post(&self, url: &str, payload: &WebhookPayload<'_>) -> Result<(), NotifyError> {
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        debug!("Webhook {} accepted notification", url);
        Ok(())
    }
}

#[async_trait]
impl ExternalNotifier for WebhookNotifier {
    /// Sends to all URLs concurrently; reports the first failure after every
    /// URL has been attempted.
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            text: message,
            source: "pixmeta",
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let results = join_all(self.urls.iter().map(|url| self.post(url, &payload))).await;
        results.into_iter().collect()
    }
}

/// Spawns the delivery and only logs a failure. Callers never observe
/// delivery errors.
pub fn deliver_detached(notifier: Arc<dyn ExternalNotifier>, message: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&message).await {
            warn!("External notification failed: {}", e);
        }
    });
}
