use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::batch_slip::models::{
    flexible_string, generate_batch_number, round2, BatchSlipRecord,
};
use crate::collector::{parse_decimal, validate_email, validate_phone, validate_required, ValidationErrors};

/// GST rate applied twice (central + state), as used on the tax invoice.
pub const GST_COMPONENT_RATE: f64 = 0.09;

/// One billable delivery, as rendered on the tax invoice. Immutable once
/// rendered into a document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub invoice_number: String,
    pub batch_number: String,
    pub created_at: DateTime<Utc>,
    pub client_name: String,
    pub client_address: String,
    pub client_email: String,
    #[serde(rename = "clientGSTIN")]
    pub client_gstin: String,
    #[serde(rename = "clientWhatsApp")]
    pub client_whatsapp: String,
    pub description: String,
    pub hsn: String,
    pub quantity: f64,
    pub rate: f64,
    pub unit: String,
    /// quantity x rate, rounded to 2 decimals.
    pub total: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub grand_total: f64,
    pub amount_in_words: String,
}

impl InvoiceRecord {
    /// Derive the invoice for a batch slip. Invoice numbers are
    /// `INV-<batchNumber>`; taxes are CGST and SGST at 9% each.
    pub fn from_batch_slip(slip: &BatchSlipRecord) -> Self {
        let total = slip.amount();
        let cgst = round2(total * GST_COMPONENT_RATE);
        let sgst = round2(total * GST_COMPONENT_RATE);
        let grand_total = round2(total + cgst + sgst);
        InvoiceRecord {
            invoice_number: format!("INV-{}", slip.batch_number),
            batch_number: slip.batch_number.clone(),
            created_at: Utc::now(),
            client_name: slip.client_name.clone(),
            client_address: slip.client_address.clone(),
            client_email: slip.client_email.clone(),
            client_gstin: slip.client_gstin.clone(),
            client_whatsapp: slip.client_whatsapp.clone(),
            description: slip.description.clone(),
            hsn: slip.hsn.clone(),
            quantity: slip.quantity,
            rate: slip.rate,
            unit: slip.unit.clone(),
            total,
            cgst,
            sgst,
            grand_total,
            amount_in_words: amount_in_words(grand_total),
        }
    }
}

/// Raw invoice submission as posted by the invoice form (the `invoiceData`
/// multipart field). All fields are strings; `validate` turns it into a
/// typed [`InvoiceRecord`] or a field -> message error map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceSubmission {
    pub batch_number: String,
    pub client_name: String,
    pub client_address: String,
    pub client_email: String,
    #[serde(rename = "clientGSTIN")]
    pub client_gstin: String,
    #[serde(rename = "clientWhatsApp")]
    pub client_whatsapp: String,
    pub description: String,
    pub hsn: String,
    #[serde(deserialize_with = "flexible_string")]
    pub quantity: String,
    #[serde(deserialize_with = "flexible_string")]
    pub rate: String,
    pub unit: String,
}

impl InvoiceSubmission {
    pub fn validate(&self) -> Result<InvoiceRecord, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.client_name, "clientName", "Client name", &mut errors);
        validate_required(
            &self.client_address,
            "clientAddress",
            "Client address",
            &mut errors,
        );
        validate_email(&self.client_email, "clientEmail", &mut errors);
        validate_phone(&self.client_whatsapp, "clientWhatsApp", &mut errors);
        validate_required(&self.description, "description", "Description", &mut errors);
        validate_required(&self.hsn, "hsn", "HSN code", &mut errors);

        let quantity = parse_decimal(&self.quantity, "quantity", "Quantity", &mut errors);
        let rate = parse_decimal(&self.rate, "rate", "Rate", &mut errors);

        errors.into_result()?;

        let batch_number = if self.batch_number.trim().is_empty() {
            generate_batch_number()
        } else {
            self.batch_number.trim().to_string()
        };

        let total = round2(quantity * rate);
        let cgst = round2(total * GST_COMPONENT_RATE);
        let sgst = round2(total * GST_COMPONENT_RATE);
        let grand_total = round2(total + cgst + sgst);

        Ok(InvoiceRecord {
            invoice_number: format!("INV-{}", batch_number),
            batch_number,
            created_at: Utc::now(),
            client_name: self.client_name.trim().to_string(),
            client_address: self.client_address.trim().to_string(),
            client_email: self.client_email.trim().to_string(),
            client_gstin: self.client_gstin.trim().to_string(),
            client_whatsapp: self.client_whatsapp.trim().to_string(),
            description: self.description.trim().to_string(),
            hsn: self.hsn.trim().to_string(),
            quantity,
            rate,
            unit: if self.unit.trim().is_empty() {
                "M³".to_string()
            } else {
                self.unit.trim().to_string()
            },
            total,
            cgst,
            sgst,
            grand_total,
            amount_in_words: amount_in_words(grand_total),
        })
    }
}

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn two_digits(n: u64) -> String {
    if n < 20 {
        ONES[n as usize].to_string()
    } else if n % 10 == 0 {
        TENS[(n / 10) as usize].to_string()
    } else {
        format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize])
    }
}

fn three_digits(n: u64) -> String {
    if n >= 100 {
        let rest = n % 100;
        if rest == 0 {
            format!("{} Hundred", ONES[(n / 100) as usize])
        } else {
            format!("{} Hundred {}", ONES[(n / 100) as usize], two_digits(rest))
        }
    } else {
        two_digits(n)
    }
}

/// Integer amount in words using the Indian grouping (crore / lakh / thousand).
fn integer_in_words(mut n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut parts: Vec<String> = Vec::new();
    if n >= 1_00_00_000 {
        parts.push(format!("{} Crore", integer_in_words(n / 1_00_00_000)));
        n %= 1_00_00_000;
    }
    if n >= 1_00_000 {
        parts.push(format!("{} Lakh", two_digits(n / 1_00_000)));
        n %= 1_00_000;
    }
    if n >= 1_000 {
        parts.push(format!("{} Thousand", two_digits(n / 1_000)));
        n %= 1_000;
    }
    if n > 0 {
        parts.push(three_digits(n));
    }
    parts.join(" ")
}

/// Render a rupee amount as the "Amount Chargeable (in words)" line.
pub fn amount_in_words(value: f64) -> String {
    let paise_total = (value.max(0.0) * 100.0).round() as u64;
    let rupees = paise_total / 100;
    let paise = paise_total % 100;
    if paise == 0 {
        format!("Rupees {} Only", integer_in_words(rupees))
    } else {
        format!(
            "Rupees {} and {} Paise Only",
            integer_in_words(rupees),
            two_digits(paise)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_in_words_indian_grouping() {
        assert_eq!(amount_in_words(0.0), "Rupees Zero Only");
        assert_eq!(amount_in_words(60000.0), "Rupees Sixty Thousand Only");
        assert_eq!(
            amount_in_words(70800.0),
            "Rupees Seventy Thousand Eight Hundred Only"
        );
        assert_eq!(
            amount_in_words(1_23_45_678.0),
            "Rupees One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight Only"
        );
        assert_eq!(
            amount_in_words(12.05),
            "Rupees Twelve and Five Paise Only"
        );
    }

    fn submission() -> InvoiceSubmission {
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
    }

    #[test]
    fn test_invoice_submission_computes_taxes() {
        let invoice = submission().validate().expect("submission should validate");
        assert_eq!(invoice.total, 60000.0);
        assert_eq!(invoice.cgst, 5400.0);
        assert_eq!(invoice.sgst, 5400.0);
        assert_eq!(invoice.grand_total, 70800.0);
        assert_eq!(
            invoice.amount_in_words,
            "Rupees Seventy Thousand Eight Hundred Only"
        );
        assert_eq!(invoice.invoice_number, format!("INV-{}", invoice.batch_number));
        assert_eq!(invoice.unit, "M³");
    }

    #[test]
    fn test_invoice_submission_rejects_bad_phone_and_rate() {
        let mut sub = submission();
        sub.client_whatsapp = "+0123456789".to_string();
        sub.rate = "four thousand".to_string();
        let errors = sub.validate().unwrap_err().to_field_map();
        assert!(errors.contains_key("clientWhatsApp"));
        assert!(errors.contains_key("rate"));
    }
}
