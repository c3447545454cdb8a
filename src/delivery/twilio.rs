//! Twilio WhatsApp API adapter.
//!
//! The document must be publicly reachable before the send call, so the
//! adapter first pushes it through the [`ObjectStorage`] seam, then issues a
//! single Messages request with `whatsapp:+E.164` addressing and the media
//! URL. Provider failures propagate with the provider's message unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::TwilioConfig;
use crate::storage::ObjectStorage;

use super::{AdapterKind, DeliveryAdapter, DeliveryError, DeliveryPayload, DeliveryRequest, MessageId};

pub struct TwilioAdapter {
    config: TwilioConfig,
    client: reqwest::Client,
    storage: Arc<dyn ObjectStorage>,
}

#[derive(Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

impl TwilioAdapter {
    pub fn new(config: TwilioConfig, client: reqwest::Client, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            config,
            client,
            storage,
        }
    }
}

#[async_trait]
impl DeliveryAdapter for TwilioAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Twilio
    }

    async fn send(&self, request: &DeliveryRequest) -> Result<MessageId, DeliveryError> {
        let mut params: Vec<(&str, String)> = vec![
            ("From", format!("whatsapp:{}", self.config.from_number)),
            ("To", format!("whatsapp:{}", request.recipient)),
        ];

        match &request.payload {
            DeliveryPayload::Document { filename, bytes } => {
                let media_url = self
                    .storage
                    .upload_file(filename, bytes)
                    .await
                    .map_err(|e| DeliveryError::Upload(e.to_string()))?;
                params.push(("Body", request.caption.clone()));
                params.push(("MediaUrl", media_url));
            }
            DeliveryPayload::Text(text) => {
                params.push(("Body", format!("{}\n\n{}", request.caption, text)));
            }
        }

        let response = self
            .client
            .post(format!(
                "{}/Accounts/{}/Messages.json",
                self.config.base_url, self.config.account_sid
            ))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Provider(body));
        }

        let parsed: TwilioMessageResponse = response.json().await?;
        Ok(MessageId(parsed.sid))
    }
}
