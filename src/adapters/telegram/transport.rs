//! Telegram Bot API message transport

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::errors::DeliveryError;
use crate::adapters::traits::MessageTransport;
use crate::core::types::{MessageLink, RecipientId, RenderedMessage};

use super::config::TelegramConfig;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: RecipientId,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
    reply_markup: InlineKeyboardMarkup,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

fn keyboard_for(links: &[Vec<MessageLink>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: links
            .iter()
            .map(|row| {
                row.iter()
                    .map(|link| InlineKeyboardButton {
                        text: link.label.clone(),
                        url: link.url.clone(),
                    })
                    .collect()
            })
            .collect(),
    }
}

pub struct TelegramTransport {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramTransport {
    pub fn new(config: TelegramConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DeliveryError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn send(&self, recipient: RecipientId, message: &RenderedMessage) -> Result<(), DeliveryError> {
        let body = SendMessageRequest {
            chat_id: recipient,
            text: &message.text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
            reply_markup: keyboard_for(&message.links),
        };

        let response = self
            .client
            .post(self.config.send_message_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let parsed: Option<ApiResponse> = response.json().await.ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => {
                debug!(recipient, "Telegram message sent");
                Ok(())
            }
            Some(api) => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: api.description.unwrap_or_else(|| "ok=false".to_string()),
            }),
            None => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: "unparseable response body".to_string(),
            }),
        }
    }
}
