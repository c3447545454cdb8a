use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::StreamExt;
use sanitize_filename::sanitize;
use serde::{Deserialize, Serialize};

use crate::ErrorResponse;

/// Fields of the `send-whatsapp` / `generate-and-send-invoice` forms. The
/// document arrives either as an uploaded PDF or as the `invoiceData` JSON
/// string, never both.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SendForm {
    pub sender_number: String,
    pub recipient_number: String,
    pub message: String,
    pub pdf_file: Option<(String, Vec<u8>)>,
    pub invoice_data: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::FieldError(_) | MultipartParseError::Utf8Error(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error)))
            }
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    pub async fn parse_send_form(mut multipart: Multipart) -> Result<SendForm, MultipartParseError> {
        let mut form = SendForm::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field.content_disposition().ok_or_else(|| {
                MultipartParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let maybe_filename = content_disposition.get_filename().map(|s| s.to_string());

            let mut buffer = Vec::new();
            while let Some(chunk) = field.next().await {
                let data_chunk = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                buffer.extend_from_slice(&data_chunk);
            }

            match name.as_str() {
                "pdfFile" => {
                    let filename = maybe_filename
                        .map(|f| sanitize(&f))
                        .unwrap_or_else(|| "document.pdf".to_string());
                    form.pdf_file = Some((filename, buffer));
                }
                "senderNumber" => {
                    form.sender_number = Self::utf8(buffer)?.trim().to_string();
                }
                "recipientNumber" => {
                    form.recipient_number = Self::utf8(buffer)?.trim().to_string();
                }
                "message" => {
                    form.message = Self::utf8(buffer)?;
                }
                "invoiceData" => {
                    form.invoice_data = Some(Self::utf8(buffer)?);
                }
                _ => {
                    continue;
                }
            }
        }

        Ok(form)
    }

    fn utf8(bytes: Vec<u8>) -> Result<String, MultipartParseError> {
        String::from_utf8(bytes).map_err(|e| MultipartParseError::Utf8Error(e.to_string()))
    }
}
