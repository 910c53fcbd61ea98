use std::time::Duration;

use async_trait::async_trait;
use common::TelegramConfig;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::errors::NotifyError;
use crate::telegram::types::{ApiResponse, SendMessage};
use crate::transport::MessageTransport;

/// Per-attempt bound on a `sendMessage` call.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    /// `{api_base}/bot{token}/sendMessage`; holds the token, never log it.
    endpoint: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            endpoint: send_message_url(&config.api_base, &config.bot_token),
            chat_id: config.chat_id.clone(),
            timeout: SEND_TIMEOUT,
        })
    }
}

pub(crate) fn send_message_url(api_base: &str, token: &str) -> String {
    format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token)
}

#[async_trait]
impl MessageTransport for TelegramClient {
    #[instrument(skip(self, text), fields(chat_id = %self.chat_id, len = text.len()), level = "debug")]
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();

        // Telegram explains rejections in the JSON body, even on 4xx.
        let reply: ApiResponse = match resp.json().await {
            Ok(reply) => reply,
            Err(e) if status.is_success() => return Err(self.classify(e)),
            Err(_) => return Err(NotifyError::Rejected(format!("http status {status}"))),
        };

        if !reply.ok {
            return Err(NotifyError::Rejected(
                reply
                    .description
                    .unwrap_or_else(|| format!("http status {status}")),
            ));
        }

        debug!(%status, "telegram message accepted");
        Ok(())
    }
}

impl TelegramClient {
    fn classify(&self, e: reqwest::Error) -> NotifyError {
        if e.is_timeout() {
            NotifyError::Timeout(self.timeout)
        } else {
            NotifyError::Http(e.without_url())
        }
    }
}
