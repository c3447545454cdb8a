//! Meta WhatsApp Business (Graph) API adapter.
//!
//! Two-step protocol: upload the document to `/{phone_number_id}/media`
//! with a bearer token to obtain a media id, then send a message that
//! references the id. A failed upload short-circuits the attempt; the
//! message call is never made with a nonexistent media handle.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::BusinessConfig;

use super::{AdapterKind, DeliveryAdapter, DeliveryError, DeliveryPayload, DeliveryRequest, MessageId};

pub struct BusinessApiAdapter {
    config: BusinessConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct MediaUploadResponse {
    id: String,
}

#[derive(Deserialize)]
struct SentMessage {
    id: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Vec<SentMessage>,
}

impl BusinessApiAdapter {
    pub fn new(config: BusinessConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    async fn upload_media(&self, filename: &str, bytes: &[u8]) -> Result<String, DeliveryError> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new()
            .text("messaging_product", "whatsapp")
            .part("file", part);

        let response = self
            .client
            .post(format!(
                "{}/{}/media",
                self.config.base_url, self.config.phone_number_id
            ))
            .bearer_auth(&self.config.access_token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Provider(body));
        }

        let media: MediaUploadResponse = response.json().await?;
        Ok(media.id)
    }

    async fn send_message(
        &self,
        body: serde_json::Value,
    ) -> Result<MessageId, DeliveryError> {
        let response = self
            .client
            .post(format!(
                "{}/{}/messages",
                self.config.base_url, self.config.phone_number_id
            ))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Provider(body));
        }

        let parsed: MessagesResponse = response.json().await?;
        let id = parsed
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| DeliveryError::Provider("provider returned no message id".to_string()))?;
        Ok(MessageId(id))
    }
}

#[async_trait]
impl DeliveryAdapter for BusinessApiAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Business
    }

    async fn send(&self, request: &DeliveryRequest) -> Result<MessageId, DeliveryError> {
        // Graph API addresses recipients by digits only, no leading `+`.
        let to = request.recipient.trim_start_matches('+');

        let body = match &request.payload {
            DeliveryPayload::Document { filename, bytes } => {
                let media_id = self.upload_media(filename, bytes).await?;
                json!({
                    "messaging_product": "whatsapp",
                    "to": to,
                    "type": "document",
                    "document": { "id": media_id, "caption": request.caption },
                })
            }
            DeliveryPayload::Text(text) => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "text",
                "text": { "body": format!("{}\n\n{}", request.caption, text) },
            }),
        };

        self.send_message(body).await
    }
}
