//! Plain-text renderings of the same documents.
//!
//! These are the delivery fallback when PDF generation fails and the
//! download fallback on the client; they must always be available and must
//! carry the same fields as the PDF.

use crate::batch_slip::models::BatchSlipRecord;
use crate::invoice::models::InvoiceRecord;

pub fn invoice_text(invoice: &InvoiceRecord) -> String {
    let gstin = if invoice.client_gstin.is_empty() {
        "N/A"
    } else {
        invoice.client_gstin.as_str()
    };
    format!(
        "INVOICE DETAILS\n\
         \n\
         Company: RR CONSTRUCTIONS\n\
         GSTIN: 33AAGFT4474P1Z1\n\
         Address: Excel College Campus, NH 91, Mathura Road, Haryana - 121102\n\
         \n\
         Invoice No: {}\n\
         Date: {}\n\
         Batch Number: {}\n\
         \n\
         Bill To:\n\
         {}\n\
         {}\n\
         GSTIN: {}\n\
         \n\
         Item Details:\n\
         Description: {}\n\
         HSN: {}\n\
         Quantity: {:.2}\n\
         Rate: ₹{:.2}\n\
         Unit: {}\n\
         Amount: ₹{:.2}\n\
         \n\
         Tax Calculation:\n\
         Subtotal: ₹{:.2}\n\
         CGST @ 9%: ₹{:.2}\n\
         SGST @ 9%: ₹{:.2}\n\
         Grand Total: ₹{:.2}\n\
         \n\
         Amount in Words: {}\n\
         \n\
         Subject to Tirupati Jurisdiction\n\
         This is a Computer Generated Invoice",
        invoice.invoice_number,
        invoice.created_at.format("%d/%m/%Y"),
        invoice.batch_number,
        invoice.client_name,
        invoice.client_address,
        gstin,
        invoice.description,
        invoice.hsn,
        invoice.quantity,
        invoice.rate,
        invoice.unit,
        invoice.total,
        invoice.total,
        invoice.cgst,
        invoice.sgst,
        invoice.grand_total,
        invoice.amount_in_words,
    )
}

pub fn batch_slip_text(slip: &BatchSlipRecord) -> String {
    format!(
        "BATCH SLIP DETAILS\n\
         \n\
         Company: RR CONSTRUCTIONS\n\
         MCI 70 Control System Ver 3.1\n\
         SCHWING Stetter\n\
         \n\
         Batch Information:\n\
         Batch Number: {}\n\
         Batch Date: {}\n\
         Customer: {}\n\
         Recipe Code: {}\n\
         Recipe Name: {}\n\
         \n\
         Production Details:\n\
         Ordered Quantity: {:.2} M³\n\
         Production Quantity: {:.2} M³\n\
         Batch Size: {:.2} M³\n\
         \n\
         Truck Information:\n\
         Truck Number: {}\n\
         Truck Driver: {}\n\
         Batcher Name: {}\n\
         \n\
         Plant Serial Number: {}\n\
         Order Number: {}",
        slip.batch_number,
        slip.batch_date.format("%Y-%m-%d"),
        slip.customer,
        slip.recipe_code,
        slip.recipe_name,
        slip.ordered_quantity,
        slip.production_quantity,
        slip.batch_size,
        slip.truck_number,
        slip.truck_driver,
        slip.batcher_name,
        slip.plant_serial_number,
        slip.order_number,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch_slip::models::BatchSlipSubmission;

    fn record() -> BatchSlipRecord {
        BatchSlipSubmission {
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
        .unwrap()
    }

    #[test]
    fn test_batch_slip_text_carries_key_fields() {
        let text = batch_slip_text(&record());
        assert!(text.contains("Client A"));
        assert!(text.contains("TN01AB1234"));
        assert!(text.contains("Recipe Code: M30"));
    }

    #[test]
    fn test_invoice_text_carries_amounts() {
        let invoice = InvoiceRecord::from_batch_slip(&record());
        let text = invoice_text(&invoice);
        assert!(text.contains("Amount: ₹60000.00"));
        assert!(text.contains("CGST @ 9%: ₹5400.00"));
        assert!(text.contains("Grand Total: ₹70800.00"));
        assert!(text.contains("Rupees Seventy Thousand Eight Hundred Only"));
    }
}
