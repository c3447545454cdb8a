//! Generation-and-delivery pipeline: render the document, send it through
//! the configured WhatsApp adapter, then persist the record.
//!
//! Render failures degrade to the plain-text rendering instead of aborting;
//! delivery failures are terminal for the attempt; persistence failures
//! after a successful send are reported as a warning, never as a rollback.

pub mod handlers;
pub mod multipart;

use log::{error, info, warn};
use thiserror::Error;

use crate::db::AppState;
use crate::delivery::{DeliveryError, DeliveryPayload, DeliveryRequest, MessageId};
use crate::invoice::models::InvoiceRecord;
use crate::render::{self, RenderError, RenderedDocument};

/// Lifecycle of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Pending,
    Rendering,
    /// `degraded` is set when rendering failed and the text fallback is
    /// being sent instead of the PDF.
    Sending { degraded: bool },
    Succeeded,
    Failed,
}

impl std::fmt::Display for AttemptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptState::Pending => write!(f, "PENDING"),
            AttemptState::Rendering => write!(f, "RENDERING"),
            AttemptState::Sending { degraded: false } => write!(f, "SENDING"),
            AttemptState::Sending { degraded: true } => write!(f, "SENDING (text fallback)"),
            AttemptState::Succeeded => write!(f, "SUCCEEDED"),
            AttemptState::Failed => write!(f, "FAILED"),
        }
    }
}

fn transition(batch_number: &str, state: AttemptState) {
    info!("Delivery attempt for batch {}: {}", batch_number, state);
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Terminal delivery failure, provider message carried verbatim.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub invoice: InvoiceRecord,
    pub message_id: MessageId,
    /// Archive filename of the rendered PDF, absent when the attempt
    /// degraded to the text fallback.
    pub filename: Option<String>,
    pub degraded: bool,
    /// Set when the delivery succeeded but the store write did not.
    pub persistence_warning: Option<String>,
}

/// Turn the renderer result into the payload for the adapter. A render
/// failure never aborts the attempt; the text fallback carries the same
/// fields.
pub fn resolve_payload(
    render_result: Result<RenderedDocument, RenderError>,
    fallback_text: &str,
) -> (DeliveryPayload, bool) {
    match render_result {
        Ok(document) => (
            DeliveryPayload::Document {
                filename: document.filename,
                bytes: document.bytes,
            },
            false,
        ),
        Err(e) => {
            error!("Document rendering failed, degrading to text fallback: {}", e);
            (DeliveryPayload::Text(fallback_text.to_string()), true)
        }
    }
}

fn render_invoice_document(invoice: &InvoiceRecord) -> Result<RenderedDocument, RenderError> {
    let bytes = render::render_invoice_pdf(invoice)?;
    Ok(RenderedDocument {
        filename: render::document_filename(&invoice.batch_number),
        bytes,
    })
}

/// Run the whole pipeline for one validated invoice: render, archive,
/// deliver, persist. The attempt is sequential; there is no retry.
pub async fn dispatch_invoice(
    state: &AppState,
    invoice: InvoiceRecord,
    recipient: &str,
    caption: &str,
) -> Result<DispatchOutcome, DispatchError> {
    let batch_number = invoice.batch_number.clone();
    transition(&batch_number, AttemptState::Pending);

    transition(&batch_number, AttemptState::Rendering);
    let render_result = render_invoice_document(&invoice);

    // Archive the generated PDF under the uploads directory so it stays
    // downloadable (and publicly reachable for the hosted-URL adapter).
    if let Ok(document) = &render_result {
        if let Err(e) = state
            .storage
            .upload_file(&document.filename, &document.bytes)
            .await
        {
            warn!(
                "Failed to archive {} before delivery: {}",
                document.filename, e
            );
        }
    }

    let fallback = render::invoice_text(&invoice);
    let (payload, degraded) = resolve_payload(render_result, &fallback);
    let filename = match &payload {
        DeliveryPayload::Document { filename, .. } => Some(filename.clone()),
        DeliveryPayload::Text(_) => None,
    };

    transition(&batch_number, AttemptState::Sending { degraded });
    let request = DeliveryRequest {
        recipient: recipient.to_string(),
        caption: caption.to_string(),
        payload,
    };
    let message_id = match state.adapter.send(&request).await {
        Ok(id) => id,
        Err(e) => {
            transition(&batch_number, AttemptState::Failed);
            error!("Delivery failed for batch {}: {}", batch_number, e);
            return Err(DispatchError::Delivery(e));
        }
    };
    transition(&batch_number, AttemptState::Succeeded);

    // Persistence is an independent failure domain: a store error does not
    // revoke the delivery, it only produces a warning.
    let persistence_warning = match state.insert_invoice(&invoice).await {
        Ok(id) => {
            info!("Invoice {} persisted with id {}", invoice.invoice_number, id);
            None
        }
        Err(e) => {
            error!(
                "Invoice {} delivered but not persisted: {}",
                invoice.invoice_number, e
            );
            Some(format!("Invoice was sent but could not be saved: {}", e))
        }
    };

    Ok(DispatchOutcome {
        invoice,
        message_id,
        filename,
        degraded,
        persistence_warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::models::InvoiceSubmission;

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
        .unwrap()
    }

    #[test]
    fn test_resolve_payload_keeps_document_on_success() {
        let invoice = invoice();
        let rendered = render_invoice_document(&invoice).unwrap();
        let (payload, degraded) = resolve_payload(Ok(rendered), "fallback");
        assert!(!degraded);
        match payload {
            DeliveryPayload::Document { filename, bytes } => {
                assert!(filename.starts_with(&format!("invoice-{}-", invoice.batch_number)));
                assert!(bytes.starts_with(b"%PDF"));
            }
            DeliveryPayload::Text(_) => panic!("expected a document payload"),
        }
    }

    #[test]
    fn test_render_failure_degrades_to_nonempty_text() {
        let invoice = invoice();
        let fallback = render::invoice_text(&invoice);
        let failure = Err(RenderError::Pdf("simulated stream error".to_string()));
        let (payload, degraded) = resolve_payload(failure, &fallback);
        assert!(degraded);
        match payload {
            DeliveryPayload::Text(text) => {
                assert!(!text.is_empty());
                assert!(text.contains("₹60000.00"));
            }
            DeliveryPayload::Document { .. } => panic!("expected the text fallback"),
        }
    }
}
