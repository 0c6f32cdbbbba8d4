//! A client for sending notifications to the Telegram bot API.

use crate::config::TelegramConfig;
use crate::core::Notifier;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, instrument};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP request to Telegram failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Telegram rejected the message: status {status}, body: {body}")]
    Rejected { status: StatusCode, body: String },
}

impl NotifyError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, NotifyError::Transport(e) if e.is_timeout())
    }
}

/// Sends messages to a single chat through `sendMessage`.
pub struct TelegramNotifier {
    client: reqwest::Client,
    /// Full `sendMessage` URL. Contains the bot token, so it is never logged.
    endpoint: String,
    chat_id: String,
    parse_mode: String,
}

impl TelegramNotifier {
    /// Creates a notifier from the Telegram section of the configuration.
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(NotifyError::Client)?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base_url.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
            parse_mode: config.parse_mode.clone(),
        })
    }

    /// Posts `text` to the configured chat. Only HTTP 200 counts as delivered.
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("parse_mode", self.parse_mode.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            // The URL carries the bot token.
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected { status, body })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip_all, fields(len = text.len()))]
    async fn notify(&self, text: &str) -> bool {
        let start = Instant::now();
        let result = self.send_message(text).await;
        metrics::histogram!("notification_duration_seconds").record(start.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                info!("Successfully sent message to Telegram.");
                metrics::counter!("notifications_sent_total", "outcome" => "success").increment(1);
                true
            }
            Err(NotifyError::Rejected { status, body }) => {
                error!(status = %status, body = %body, "Failed to send Telegram notification");
                metrics::counter!("notifications_sent_total", "outcome" => "rejected").increment(1);
                false
            }
            Err(e) => {
                error!(error = %e, timeout = e.is_timeout(), "Telegram notification failed");
                metrics::counter!("notifications_sent_total", "outcome" => "error").increment(1);
                false
            }
        }
    }
}
