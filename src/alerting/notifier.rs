//! Alert delivery.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while delivering an alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP request could not be sent or completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("webhook returned {0}")]
    Status(StatusCode),

    /// Delivery did not finish within the deadline.
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// Something that can deliver a rendered alert.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        body: &str,
        title: Option<&str>,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Posts alerts to a Slack-compatible incoming webhook.
///
/// Without a URL the notifier only logs what it would have sent.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, body: &str, title: Option<&str>) -> Result<(), NotifyError> {
        let Some(url) = &self.url else {
            tracing::info!(title = title.unwrap_or_default(), "No webhook configured, would alert: {}", body);
            return Ok(());
        };

        let response = self
            .client
            .post(url)
            .json(&webhook_payload(body, title))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }

        tracing::debug!(title = title.unwrap_or_default(), "Posted alert to webhook");
        Ok(())
    }
}

fn webhook_payload(body: &str, title: Option<&str>) -> serde_json::Value {
    let text = match title {
        Some(title) => format!("*{title}*\n{body}"),
        None => body.to_string(),
    };
    json!({ "text": text })
}
