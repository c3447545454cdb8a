//! Mock delivery adapter: logs the intended send and always succeeds after a
//! simulated network delay. Active whenever no real messaging credentials
//! are configured.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{AdapterKind, DeliveryAdapter, DeliveryError, DeliveryRequest, MessageId};

const SIMULATED_LATENCY: Duration = Duration::from_secs(2);

pub struct MockAdapter {
    delay: Duration,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self {
            delay: SIMULATED_LATENCY,
        }
    }

    /// Constructor with a custom delay, for tests.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryAdapter for MockAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Mock
    }

    async fn send(&self, request: &DeliveryRequest) -> Result<MessageId, DeliveryError> {
        log::info!(
            "mock whatsapp send to {}: {} | caption: {}",
            request.recipient,
            request.payload.describe(),
            request.caption
        );
        tokio::time::sleep(self.delay).await;
        Ok(MessageId(format!("mock-{}", Uuid::new_v4())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryPayload;

    #[tokio::test]
    async fn test_mock_send_always_succeeds() {
        let adapter = MockAdapter::with_delay(Duration::from_millis(5));
        let request = DeliveryRequest {
            recipient: "+919876543210".to_string(),
            caption: "Invoice for batch 20250506001".to_string(),
            payload: DeliveryPayload::Text("fallback body".to_string()),
        };
        let id = adapter.send(&request).await.expect("mock never fails");
        assert!(id.0.starts_with("mock-"));
        assert_eq!(adapter.kind(), AdapterKind::Mock);
    }
}
