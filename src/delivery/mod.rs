//! WhatsApp delivery adapters.
//!
//! Three interchangeable strategies behind one trait: a mock adapter, the
//! Meta Business (Graph) API and the Twilio hosted-media API. Exactly one is
//! wired into [`crate::db::AppState`] at startup from [`DeliveryConfig`];
//! swapping providers never touches the renderer or the persistence step.

pub mod business;
pub mod mock;
pub mod twilio;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{DeliveryConfig, ProviderKind};
use crate::storage::ObjectStorage;

pub use business::BusinessApiAdapter;
pub use mock::MockAdapter;
pub use twilio::TwilioAdapter;

/// Provider-assigned identifier of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The provider rejected the request; carries its error payload verbatim.
    #[error("{0}")]
    Provider(String),
    #[error("failed to reach the messaging provider: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("document upload failed: {0}")]
    Upload(String),
}

/// What gets attached to the message: the rendered PDF, or the plain-text
/// rendering when PDF generation failed.
#[derive(Debug, Clone)]
pub enum DeliveryPayload {
    Document { filename: String, bytes: Vec<u8> },
    Text(String),
}

impl DeliveryPayload {
    pub fn describe(&self) -> String {
        match self {
            DeliveryPayload::Document { filename, bytes } => {
                format!("document {} ({} bytes)", filename, bytes.len())
            }
            DeliveryPayload::Text(text) => format!("text fallback ({} chars)", text.chars().count()),
        }
    }
}

/// One send request: recipient in `+E.164` form, payload and caption.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub recipient: String,
    pub caption: String,
    pub payload: DeliveryPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Mock,
    Business,
    Twilio,
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterKind::Mock => write!(f, "mock"),
            AdapterKind::Business => write!(f, "business"),
            AdapterKind::Twilio => write!(f, "twilio"),
        }
    }
}

#[async_trait]
pub trait DeliveryAdapter: Send + Sync {
    fn kind(&self) -> AdapterKind;

    /// Push one message to the recipient. A `FAILED` attempt is terminal;
    /// re-triggering is the caller's (user's) decision.
    async fn send(&self, request: &DeliveryRequest) -> Result<MessageId, DeliveryError>;
}

/// Build the configured adapter. Fails at startup when the selected
/// provider's credentials are missing, so handlers only ever see a
/// fully-initialized adapter.
pub fn build_adapter(
    config: &DeliveryConfig,
    client: reqwest::Client,
    storage: Arc<dyn ObjectStorage>,
) -> anyhow::Result<Arc<dyn DeliveryAdapter>> {
    match config.provider {
        ProviderKind::Mock => Ok(Arc::new(MockAdapter::new())),
        ProviderKind::Business => {
            let business = config
                .business
                .clone()
                .ok_or_else(|| anyhow::anyhow!("business provider selected without credentials"))?;
            Ok(Arc::new(BusinessApiAdapter::new(business, client)))
        }
        ProviderKind::Twilio => {
            let twilio = config
                .twilio
                .clone()
                .ok_or_else(|| anyhow::anyhow!("twilio provider selected without credentials"))?;
            Ok(Arc::new(TwilioAdapter::new(twilio, client, storage)))
        }
    }
}
