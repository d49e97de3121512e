//! Minimal Telegram Bot API transport.
//!
//! Wraps reqwest for `getUpdates` long-polling and `sendMessage`. Only
//! the fields the bot reads are deserialized; everything else is ignored.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

/// Errors from Telegram API calls.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API returned error: {0}")]
    Api(String),
}

/// Generic Telegram API response wrapper.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

/// An update from `getUpdates`.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// A Telegram message.
#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

/// A Telegram chat.
#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Timeout for plain request/response calls like `sendMessage`.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack added on top of the long-poll window so `getUpdates` is never
/// cut off by its own request timeout.
const POLL_TIMEOUT_MARGIN_SECS: u64 = 30;

fn poll_request_timeout(poll_timeout_secs: u64) -> Duration {
    Duration::from_secs(poll_timeout_secs + POLL_TIMEOUT_MARGIN_SECS)
}

/// Low-level Telegram Bot API client.
pub struct TelegramApi {
    client: Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(bot_token: &str) -> Result<Self, TelegramError> {
        Self::with_base_url(bot_token, "https://api.telegram.org")
    }

    /// Create with a custom base URL (for testing with wiremock).
    pub fn with_base_url(bot_token: &str, base_url: &str) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        })
    }

    /// Long-poll for new updates. `offset` should be `last_update_id + 1`
    /// to acknowledge previously received updates.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(off) = offset {
            body["offset"] = json!(off);
        }

        let resp = self
            .client
            .post(format!("{}/getUpdates", self.base_url))
            .timeout(poll_request_timeout(timeout_secs))
            .json(&body)
            .send()
            .await?;

        let api_resp: ApiResponse<Vec<Update>> = resp.json().await?;
        if !api_resp.ok {
            let desc = api_resp.description.unwrap_or_default();
            warn!("getUpdates failed: {desc}");
            return Err(TelegramError::Api(desc));
        }

        Ok(api_resp.result.unwrap_or_default())
    }

    /// Send a plain-text reply to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
        });

        let resp = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&body)
            .send()
            .await?;

        let api_resp: ApiResponse<serde_json::Value> = resp.json().await?;
        if !api_resp.ok {
            let desc = api_resp.description.unwrap_or_default();
            warn!(chat_id, "sendMessage failed: {desc}");
            return Err(TelegramError::Api(desc));
        }

        Ok(())
    }
}

/// Split message text into a command name and its argument string.
///
/// `/auth@mybot deadbeef00 laptop` becomes `("auth", "deadbeef00 laptop")`.
/// Text without a leading slash yields an empty command name, which the
/// router answers with its commands-only reply.
pub fn parse_command(text: &str) -> (String, String) {
    let Some(rest) = text.strip_prefix('/') else {
        return (String::new(), String::new());
    };
    let (token, args) = match rest.split_once(' ') {
        Some((token, args)) => (token, args),
        None => (rest, ""),
    };
    let name = match token.split_once('@') {
        Some((name, _bot)) => name,
        None => token,
    };
    (name.to_string(), args.to_string())
}
