#[cfg(test)]
mod pipeline_tests {
    use std::time::Duration;

    use rmc_dispatch_server::delivery::{
        DeliveryAdapter, DeliveryPayload, DeliveryRequest, MockAdapter,
    };
    use rmc_dispatch_server::dispatch::resolve_payload;
    use rmc_dispatch_server::invoice::models::{InvoiceRecord, InvoiceSubmission};
    use rmc_dispatch_server::render::{
        self, render_batch_slip_pdf, render_invoice_pdf, RenderError, RenderedDocument,
    };

    fn invoice() -> InvoiceRecord {
        InvoiceSubmission {
            client_name: "Client A".to_string(),
            client_address: "12 Mount Road, Chennai".to_string(),
            client_email: "client@example.com".to_string(),
            client_whatsapp: "+919876543210".to_string(),
            description: "Concrete M30".to_string(),
            hsn: "6810".to_string(),
            quantity: "15.00".to_string(),
            rate: "4000.00".to_string(),
            ..Default::default()
        }
        .validate()
        .expect("submission should validate")
    }

    #[test]
    fn test_invoice_pdf_renders_nonempty_document() {
        let bytes = render_invoice_pdf(&invoice()).expect("invoice should render");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_batch_slip_pdf_renders_nonempty_document() {
        let slip = rmc_dispatch_server::batch_slip::models::BatchSlipSubmission {
            batch_date: "2025-05-06".to_string(),
            customer: "Client A".to_string(),
            recipe_code: "M30".to_string(),
            recipe_name: "Concrete M30".to_string(),
            truck_number: "TN01AB1234".to_string(),
            truck_driver: "Murugesan".to_string(),
            batcher_name: "SS".to_string(),
            client_name: "Client A".to_string(),
            client_address: "12 Mount Road, Chennai".to_string(),
            client_email: "client@example.com".to_string(),
            client_whatsapp: "+919876543210".to_string(),
            description: "Concrete M30".to_string(),
            hsn: "6810".to_string(),
            quantity: "15.00".to_string(),
            rate: "4000.00".to_string(),
            ..Default::default()
        }
        .validate()
        .expect("slip should validate");

        let bytes = render_batch_slip_pdf(&slip).expect("batch slip should render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_failure_falls_back_to_text_payload() {
        let record = invoice();
        let fallback = render::invoice_text(&record);
        let failure: Result<RenderedDocument, RenderError> =
            Err(RenderError::Pdf("simulated stream error".to_string()));

        let (payload, degraded) = resolve_payload(failure, &fallback);

        assert!(degraded);
        match payload {
            DeliveryPayload::Text(text) => {
                // The adapter must always get a usable body with the amounts.
                assert!(!text.is_empty());
                assert!(text.contains("Amount: ₹60000.00"));
                assert!(text.contains("CGST @ 9%: ₹5400.00"));
                assert!(text.contains("Grand Total: ₹70800.00"));
            }
            DeliveryPayload::Document { .. } => panic!("expected the text fallback"),
        }
    }

    #[tokio::test]
    async fn test_mock_adapter_succeeds_for_any_valid_recipient() {
        let adapter = MockAdapter::with_delay(Duration::from_millis(5));
        for recipient in ["+919876543210", "+14155238886"] {
            let request = DeliveryRequest {
                recipient: recipient.to_string(),
                caption: "Invoice attached".to_string(),
                payload: DeliveryPayload::Text("body".to_string()),
            };
            let id = adapter.send(&request).await.expect("mock never fails");
            assert!(id.0.starts_with("mock-"));
        }
    }
}
