use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::collector::is_valid_phone;
use crate::db::AppState;
use crate::delivery::{DeliveryPayload, DeliveryRequest};
use crate::dispatch::{dispatch_invoice, DispatchError};
use crate::dispatch::multipart::MultipartParser;
use crate::invoice::models::InvoiceSubmission;
use crate::ErrorResponse;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendDetails {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    pub details: SendDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
}

fn validate_numbers(sender: &str, recipient: &str) -> Result<(), HttpResponse> {
    if sender.is_empty() || recipient.is_empty() {
        return Err(HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "senderNumber and recipientNumber are required",
        )));
    }
    if !is_valid_phone(sender) {
        return Err(HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "senderNumber must match +<countrycode><digits>",
        )));
    }
    if !is_valid_phone(recipient) {
        return Err(HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "recipientNumber must match +<countrycode><digits>",
        )));
    }
    Ok(())
}

#[utoipa::path(
    context_path = "/api",
    tag = "Dispatch Service",
    post,
    path = "/send-whatsapp",
    request_body(content = inline(SendWhatsAppRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document delivered", body = SendResponse),
        (status = 400, description = "Missing fields or invalid phone number", body = ErrorResponse),
        (status = 502, description = "Messaging provider rejected the send", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn send_whatsapp(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing send_whatsapp handler");

    let form = match MultipartParser::parse_send_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            error!("Failed to parse send-whatsapp form: {}", e);
            return HttpResponse::from(e);
        }
    };

    if let Err(response) = validate_numbers(&form.sender_number, &form.recipient_number) {
        return response;
    }

    let (filename, bytes) = match form.pdf_file {
        Some(file) => file,
        None => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("pdfFile is required"));
        }
    };

    // Keep a server-side copy under the uploads directory before sending.
    if let Err(e) = data.storage.upload_file(&filename, &bytes).await {
        error!("Failed to save uploaded PDF {}: {}", filename, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error("Failed to save uploaded PDF"));
    }

    let request = DeliveryRequest {
        recipient: form.recipient_number.clone(),
        caption: form.message.clone(),
        payload: DeliveryPayload::Document {
            filename: filename.clone(),
            bytes,
        },
    };

    match data.adapter.send(&request).await {
        Ok(message_id) => {
            info!(
                "Document {} delivered to {} (provider id {})",
                filename, form.recipient_number, message_id.0
            );
            HttpResponse::Ok().json(SendResponse {
                success: true,
                message: "WhatsApp message sent successfully".to_string(),
                details: SendDetails {
                    from: form.sender_number,
                    to: form.recipient_number,
                    file_name: Some(filename),
                    amount: None,
                },
                persistence_warning: None,
            })
        }
        Err(e) => {
            error!("Delivery failed for {}: {}", form.recipient_number, e);
            HttpResponse::BadGateway().json(ErrorResponse::new("DeliveryFailed", &e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Dispatch Service",
    post,
    path = "/generate-and-send-invoice",
    request_body(content = inline(SendWhatsAppRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Invoice generated and delivered; persistenceWarning set when the store write failed", body = SendResponse),
        (status = 400, description = "Missing fields, invalid phone numbers, or validation failure (field to message map)"),
        (status = 502, description = "Messaging provider rejected the send", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn generate_and_send_invoice(
    payload: Multipart,
    data: web::Data<AppState>,
) -> impl Responder {
    info!("Executing generate_and_send_invoice handler");

    let form = match MultipartParser::parse_send_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            error!("Failed to parse generate-and-send-invoice form: {}", e);
            return HttpResponse::from(e);
        }
    };

    if let Err(response) = validate_numbers(&form.sender_number, &form.recipient_number) {
        return response;
    }

    let invoice_data = match form.invoice_data {
        Some(data) => data,
        None => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("invoiceData is required"));
        }
    };

    let submission: InvoiceSubmission = match serde_json::from_str(&invoice_data) {
        Ok(submission) => submission,
        Err(e) => {
            error!("invoiceData is not valid JSON: {}", e);
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("invoiceData must be a JSON object"));
        }
    };

    let invoice = match submission.validate() {
        Ok(invoice) => invoice,
        Err(errors) => {
            error!("Invoice submission failed validation: {} errors", errors.len());
            return HttpResponse::BadRequest().json(errors.to_field_map());
        }
    };

    let amount = format!("₹{:.2}", invoice.total);

    match dispatch_invoice(&data, invoice, &form.recipient_number, &form.message).await {
        Ok(outcome) => {
            info!(
                "Invoice {} dispatched to {} (provider id {})",
                outcome.invoice.invoice_number, form.recipient_number, outcome.message_id.0
            );
            HttpResponse::Ok().json(SendResponse {
                success: true,
                message: if outcome.degraded {
                    "Invoice sent as text (PDF generation failed)".to_string()
                } else {
                    "Invoice generated and sent successfully".to_string()
                },
                details: SendDetails {
                    from: form.sender_number,
                    to: form.recipient_number,
                    file_name: outcome.filename,
                    amount: Some(amount),
                },
                persistence_warning: outcome.persistence_warning,
            })
        }
        Err(DispatchError::Delivery(e)) => {
            HttpResponse::BadGateway().json(ErrorResponse::new("DeliveryFailed", &e.to_string()))
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendWhatsAppRequest {
    #[allow(unused)]
    pub sender_number: String,
    #[allow(unused)]
    pub recipient_number: String,
    #[allow(unused)]
    pub message: Option<String>,
    #[allow(unused)]
    pub pdf_file: Option<Vec<u8>>,
    #[allow(unused)]
    pub invoice_data: Option<String>,
}
