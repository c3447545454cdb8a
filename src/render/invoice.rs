//! Tax invoice layout: header block, bill-to block, single line-item table,
//! tax summary and footer, all drawn at fixed coordinates.

use printpdf::PdfDocument;

use crate::invoice::models::InvoiceRecord;

use super::canvas::{PageCanvas, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::RenderError;

// Builtin Helvetica is WinAnsi-encoded and cannot carry the rupee sign, so
// monetary values inside the PDF are prefixed "Rs." while captions keep ₹.
fn rs(value: f64) -> String {
    format!("Rs.{:.2}", value)
}

pub fn render_invoice_pdf(invoice: &InvoiceRecord) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Invoice {}", invoice.invoice_number),
        printpdf::Mm(PAGE_WIDTH_MM),
        printpdf::Mm(PAGE_HEIGHT_MM),
        "invoice",
    );
    let canvas = PageCanvas::new(&doc, doc.get_page(page).get_layer(layer))?;

    // Header
    canvas.text_bold("RR CONSTRUCTIONS", 16.0, 20.0, 20.0);
    canvas.text_bold("Tax Invoice", 16.0, 150.0, 20.0);

    canvas.text("GSTIN: 33AAGFT4474P1Z1", 10.0, 20.0, 30.0);
    canvas.text(&format!("Invoice No: {}", invoice.invoice_number), 10.0, 150.0, 30.0);
    canvas.text("Excel College Campus, NH 91, Mathura", 10.0, 20.0, 35.0);
    canvas.text(
        &format!("Date: {}", invoice.created_at.format("%d/%m/%Y")),
        10.0,
        150.0,
        35.0,
    );
    canvas.text("Road, Haryana - 121102", 10.0, 20.0, 40.0);
    canvas.text(&format!("Batch Number: {}", invoice.batch_number), 10.0, 150.0, 40.0);
    canvas.text("Biller: INFRA LP", 10.0, 20.0, 45.0);
    canvas.text("Terms of Delivery: As per Order & Cheque", 10.0, 150.0, 45.0);
    canvas.text("State Name: Tamil Nadu, India", 10.0, 20.0, 50.0);

    // Bill-to block
    canvas.text_bold("Bill To:", 10.0, 20.0, 70.0);
    canvas.text_bold("Dispatch Site:", 10.0, 150.0, 70.0);
    canvas.text(&invoice.client_name, 10.0, 20.0, 80.0);
    canvas.text("N/A", 10.0, 150.0, 80.0);
    canvas.text(&invoice.client_address, 10.0, 20.0, 85.0);
    canvas.text("Bill of Lading/Ref No: N/A", 10.0, 150.0, 85.0);
    let gstin = if invoice.client_gstin.is_empty() {
        "N/A"
    } else {
        invoice.client_gstin.as_str()
    };
    canvas.text(&format!("GSTIN: {}", gstin), 10.0, 20.0, 90.0);

    // Line-item table
    let table_top = 105.0;
    let columns = [20.0, 85.0, 110.0, 130.0, 155.0, 170.0];
    let headers = ["Description", "HSN", "Quantity", "Rate", "Per", "Amount"];
    for (header, x) in headers.iter().zip(columns.iter()) {
        canvas.text_bold(header, 10.0, *x, table_top);
    }
    canvas.line(20.0, table_top + 3.0, 190.0, table_top + 3.0);

    let item_y = table_top + 10.0;
    canvas.text(&invoice.description, 10.0, columns[0], item_y);
    canvas.text(&invoice.hsn, 10.0, columns[1], item_y);
    canvas.text(&format!("{:.2}", invoice.quantity), 10.0, columns[2], item_y);
    canvas.text(&rs(invoice.rate), 10.0, columns[3], item_y);
    canvas.text(&invoice.unit, 10.0, columns[4], item_y);
    canvas.text(&rs(invoice.total), 10.0, columns[5], item_y);
    canvas.line(20.0, item_y + 5.0, 190.0, item_y + 5.0);

    // Tax summary
    let totals_y = item_y + 15.0;
    canvas.text(&format!("Total: {}", rs(invoice.total)), 10.0, 150.0, totals_y);
    canvas.text(
        &format!("Output-CGST @ 9%: {}", rs(invoice.cgst)),
        10.0,
        150.0,
        totals_y + 10.0,
    );
    canvas.text(
        &format!("Output-SGST @ 9%: {}", rs(invoice.sgst)),
        10.0,
        150.0,
        totals_y + 20.0,
    );
    canvas.text_bold(
        &format!("Grand Total: {}", rs(invoice.grand_total)),
        10.0,
        150.0,
        totals_y + 30.0,
    );

    canvas.text(
        &format!("Amount Chargeable (in words): {}", invoice.amount_in_words),
        10.0,
        20.0,
        totals_y + 50.0,
    );

    // Footer
    canvas.text("Subject to the Tirupati Jurisdiction", 10.0, 20.0, 270.0);
    canvas.text("This is a Computer Generated Invoice", 10.0, 130.0, 270.0);
    canvas.text("Authorised Signatory", 10.0, 20.0, 280.0);

    doc.save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}
