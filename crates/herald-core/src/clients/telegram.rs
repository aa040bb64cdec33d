//! Telegram client for notifications, decisions, and chat replies

use crate::config::TelegramConfig;
use crate::error::{HeraldError, Result};
use crate::workflow::traits::Notifier;
use crate::workflow::types::{ApprovalId, Decision};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// How much of a draft is shown in the approval message
const PREVIEW_CHARS: usize = 500;

pub struct TelegramClient {
    bot_token: String,
    admin_chat_id: String,
    poll_timeout_secs: u64,
    http_client: HttpClient,
}

/// Envelope every Bot API method responds with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        // Long-poll requests hold the connection for poll_timeout_secs;
        // the client timeout needs headroom on top of that.
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .map_err(HeraldError::Http)?;

        Ok(Self {
            bot_token: config.bot_token,
            admin_chat_id: config.admin_chat_id,
            poll_timeout_secs: config.poll_timeout_secs,
            http_client,
        })
    }

    pub fn admin_chat_id(&self) -> &str {
        &self.admin_chat_id
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    /// Escape special characters for Telegram HTML parse mode
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// Char-boundary-safe preview of a draft
    fn preview(text: &str) -> String {
        let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
        if preview.len() < text.len() {
            preview.push('…');
        }
        preview
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HeraldError::ServiceUnavailable(format!(
                "Telegram {} returned {}: {}",
                method, status, body
            )));
        }

        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.ok {
            return Err(HeraldError::ServiceUnavailable(format!(
                "Telegram {} failed: {}",
                method,
                envelope.description.unwrap_or_default()
            )));
        }

        envelope.result.ok_or_else(|| {
            HeraldError::ServiceUnavailable(format!("Telegram {} returned no result", method))
        })
    }

    /// Send a plain text message to a chat
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
        });

        self.call::<Message>("sendMessage", payload).await?;
        Ok(())
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let mut payload = json!({
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }

        self.call("getUpdates", payload).await
    }

    /// Acknowledge a button press so the client stops its spinner
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let payload = json!({ "callback_query_id": callback_query_id });

        // answerCallbackQuery returns a bare boolean
        self.call::<bool>("answerCallbackQuery", payload).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    /// Present a draft to the admin chat with approve/reject buttons
    /// tagged with the approval id.
    async fn send_approval_request(&self, content: &str, id: &ApprovalId) -> Result<()> {
        let message = format!(
            "📬 <b>New post awaiting approval</b>\n\n{}",
            Self::escape_html(&Self::preview(content))
        );

        let payload = json!({
            "chat_id": self.admin_chat_id,
            "text": message,
            "parse_mode": "HTML",
            "reply_markup": {
                "inline_keyboard": [[
                    {"text": "✅ Approve", "callback_data": Decision::Approve(id.clone()).callback_data()},
                    {"text": "❌ Reject", "callback_data": Decision::Reject(id.clone()).callback_data()}
                ]]
            }
        });

        self.call::<Message>("sendMessage", payload)
            .await
            .map_err(|e| HeraldError::Notification(e.to_string()))?;

        log::info!("Approval request {} sent to Telegram", id);
        Ok(())
    }
}
