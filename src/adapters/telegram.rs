use crate::config::NotifyConfig;
use crate::domain::ports::Notifier;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// 透過 Telegram Bot API 傳送純文字訊息
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    config: NotifyConfig,
}

impl TelegramNotifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.credentials().is_some()
    }

    fn endpoint(&self, token: &str) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let Some((token, chat_id)) = self.config.credentials() else {
            tracing::warn!("Telegram not configured. Skipping notification.");
            return Ok(());
        };

        let response = self
            .client
            .post(self.endpoint(token))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&SendMessage {
                chat_id,
                text: message,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::NotificationError {
                message: format!("Telegram API returned {}: {}", status, body),
            });
        }

        tracing::debug!("Telegram API response status: {}", status);
        Ok(())
    }
}
