use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::db::AppState;
use crate::invoice::models::InvoiceRecord;

#[utoipa::path(
    context_path = "/api",
    tag = "Invoice Service",
    get,
    path = "/invoices",
    responses(
        (status = 200, description = "List of all stored invoices; empty when the store is unreachable", body = [InvoiceRecord])
    )
)]
pub async fn get_all_invoices(data: web::Data<AppState>) -> impl Responder {
    info!("Executing get_all_invoices handler");
    match data.get_all_invoices_cached().await {
        Ok(invoices) => {
            info!("Successfully fetched {} invoices", invoices.len());
            HttpResponse::Ok().json(invoices)
        }
        Err(e) => {
            error!("Failed to fetch invoices, returning empty list: {}", e);
            HttpResponse::Ok().json(Vec::<InvoiceRecord>::new())
        }
    }
}
