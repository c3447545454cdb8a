use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::batch_slip::models::{BatchSlipRecord, BatchSlipSubmission};
use crate::db::AppState;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Batch Slip Service",
    get,
    path = "/batch-slips",
    responses(
        (status = 200, description = "List of all stored batch slips; empty when the store is unreachable", body = [BatchSlipRecord])
    )
)]
pub async fn get_all_batch_slips(data: web::Data<AppState>) -> impl Responder {
    info!("Executing get_all_batch_slips handler");
    match data.get_all_batch_slips_cached().await {
        Ok(slips) => {
            info!("Successfully fetched {} batch slips", slips.len());
            HttpResponse::Ok().json(slips)
        }
        Err(e) => {
            // The list view must stay usable when the store is down, so a
            // read failure degrades to an empty list instead of a 5xx.
            error!("Failed to fetch batch slips, returning empty list: {}", e);
            HttpResponse::Ok().json(Vec::<BatchSlipRecord>::new())
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Batch Slip Service",
    post,
    path = "/batch-slips",
    request_body = BatchSlipSubmission,
    responses(
        (status = 201, description = "Batch slip stored", body = BatchSlipRecord),
        (status = 400, description = "Validation failed, body maps field name to message"),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn create_batch_slip(
    req: web::Json<BatchSlipSubmission>,
    data: web::Data<AppState>,
) -> impl Responder {
    info!("Executing create_batch_slip handler");

    let record = match req.validate() {
        Ok(record) => record,
        Err(errors) => {
            error!("Batch slip submission failed validation: {} errors", errors.len());
            return HttpResponse::BadRequest().json(errors.to_field_map());
        }
    };

    match data.insert_batch_slip(&record).await {
        Ok(id) => {
            info!(
                "Batch slip {} stored with id {}",
                record.batch_number, id
            );
            HttpResponse::Created().json(record)
        }
        Err(e) => {
            error!("Failed to insert batch slip into db: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to save batch slip"))
        }
    }
}
