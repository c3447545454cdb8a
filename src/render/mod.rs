//! Document renderer: turns invoice / batch-slip records into single-page
//! PDFs via absolute-positioned draw commands, with a plain-text rendering
//! of the same fields as the always-available fallback.

pub mod batch_slip;
pub mod canvas;
pub mod invoice;
pub mod text;

use chrono::Utc;
use thiserror::Error;

pub use batch_slip::render_batch_slip_pdf;
pub use invoice::render_invoice_pdf;
pub use text::{batch_slip_text, invoice_text};

/// Errors raised while producing a PDF document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf generation failed: {0}")]
    Pdf(String),
}

/// A rendered document ready for delivery and archiving.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Filename convention for generated invoices:
/// `invoice-<batchNumber>-<unixTimestampMillis>.pdf`.
pub fn document_filename(batch_number: &str) -> String {
    format!(
        "invoice-{}-{}.pdf",
        batch_number,
        Utc::now().timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_filename_convention() {
        let name = document_filename("20250506123");
        assert!(name.starts_with("invoice-20250506123-"));
        assert!(name.ends_with(".pdf"));
        let millis = name
            .trim_start_matches("invoice-20250506123-")
            .trim_end_matches(".pdf");
        assert!(millis.parse::<i64>().is_ok());
    }
}
