//! Operator notifications for errors surfaced to API clients.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, warn};

use crate::config::TelegramSettings;

/// Telegram caps message text at 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4000;

#[async_trait]
pub trait ErrorNotifier: Send + Sync {
    /// Deliver a notification. Failures are logged, never returned.
    async fn notify(&self, message: &str);
}

/// Writes notifications to the log only.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl ErrorNotifier for LogNotifier {
    async fn notify(&self, message: &str) {
        warn!("API error: {}", message);
    }
}

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    settings: TelegramSettings,
}

impl TelegramNotifier {
    pub fn new(settings: TelegramSettings) -> Result<Self, reqwest::Error> {
        Self::with_api_base(settings, "https://api.telegram.org")
    }

    pub fn with_api_base(
        settings: TelegramSettings,
        api_base: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            settings,
        })
    }
}

#[async_trait]
impl ErrorNotifier for TelegramNotifier {
    async fn notify(&self, message: &str) {
        let text: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
        let result = self
            .client
            .post(format!(
                "{}/bot{}/sendMessage",
                self.api_base, self.settings.bot_token
            ))
            .json(&serde_json::json!({
                "chat_id": self.settings.chat_id,
                "text": text,
                "disable_web_page_preview": true
            }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => error!("Telegram notification rejected: {}", response.status()),
            Err(e) => error!("Telegram notification failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_telegram_posts_to_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botabc/sendMessage"))
            .and(body_partial_json(serde_json::json!({"chat_id": "42", "text": "boom"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::with_api_base(
            TelegramSettings {
                bot_token: "abc".to_string(),
                chat_id: "42".to_string(),
            },
            server.uri(),
        )
        .unwrap();
        notifier.notify("boom").await;
    }

    #[tokio::test]
    async fn test_telegram_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::with_api_base(
            TelegramSettings {
                bot_token: "abc".to_string(),
                chat_id: "42".to_string(),
            },
            server.uri(),
        )
        .unwrap();
        notifier.notify("still fine").await;
    }
}
