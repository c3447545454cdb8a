//! Typed configuration read once at startup.
//!
//! The delivery provider is a deployment-time choice: exactly one adapter is
//! wired into the application, selected here and never re-decided per
//! request.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};

/// Which WhatsApp integration to wire in (`WHATSAPP_PROVIDER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Log-only adapter with simulated latency. Default when no messaging
    /// credentials are configured.
    Mock,
    /// Meta WhatsApp Business (Graph) API: upload media, then send.
    Business,
    /// Twilio WhatsApp API: single send referencing a hosted media URL.
    Twilio,
}

impl ProviderKind {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "mock" => Ok(ProviderKind::Mock),
            "business" => Ok(ProviderKind::Business),
            "twilio" => Ok(ProviderKind::Twilio),
            other => bail!("unknown WHATSAPP_PROVIDER '{}', expected mock|business|twilio", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BusinessConfig {
    pub access_token: String,
    pub phone_number_id: String,
    /// Graph API root; overridable for tests.
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending number, `+E.164` without the `whatsapp:` prefix.
    pub from_number: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub provider: ProviderKind,
    pub business: Option<BusinessConfig>,
    pub twilio: Option<TwilioConfig>,
}

impl DeliveryConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let provider = match env::var("WHATSAPP_PROVIDER") {
            Ok(value) => ProviderKind::parse(&value)?,
            Err(_) => ProviderKind::Mock,
        };

        let business = if provider == ProviderKind::Business {
            Some(BusinessConfig {
                access_token: env::var("WHATSAPP_ACCESS_TOKEN")
                    .context("WHATSAPP_ACCESS_TOKEN must be set for the business provider")?,
                phone_number_id: env::var("WHATSAPP_PHONE_NUMBER_ID")
                    .context("WHATSAPP_PHONE_NUMBER_ID must be set for the business provider")?,
                base_url: env::var("WHATSAPP_GRAPH_BASE_URL")
                    .unwrap_or_else(|_| "https://graph.facebook.com/v18.0".to_string()),
            })
        } else {
            None
        };

        let twilio = if provider == ProviderKind::Twilio {
            Some(TwilioConfig {
                account_sid: env::var("TWILIO_ACCOUNT_SID")
                    .context("TWILIO_ACCOUNT_SID must be set for the twilio provider")?,
                auth_token: env::var("TWILIO_AUTH_TOKEN")
                    .context("TWILIO_AUTH_TOKEN must be set for the twilio provider")?,
                from_number: env::var("TWILIO_WHATSAPP_NUMBER")
                    .unwrap_or_else(|_| "+14155238886".to_string()),
                base_url: env::var("TWILIO_BASE_URL")
                    .unwrap_or_else(|_| "https://api.twilio.com/2010-04-01".to_string()),
            })
        } else {
            None
        };

        Ok(DeliveryConfig {
            provider,
            business,
            twilio,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory generated documents are archived in, created on demand.
    pub uploads_dir: PathBuf,
    /// Base URL uploads are served under (the server's own `/uploads` route
    /// by default).
    pub public_base_url: String,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        StorageConfig {
            uploads_dir: env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(ProviderKind::parse("mock").unwrap(), ProviderKind::Mock);
        assert_eq!(ProviderKind::parse("Business").unwrap(), ProviderKind::Business);
        assert_eq!(ProviderKind::parse("TWILIO").unwrap(), ProviderKind::Twilio);
        assert!(ProviderKind::parse("carrier-pigeon").is_err());
    }
}
