use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod batch_slip;
pub mod collector;
pub mod config;
pub mod db;
pub mod delivery;
pub mod dispatch;
pub mod invoice;
pub mod render;
pub mod storage;

pub use crate::db::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

pub async fn run() -> std::io::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::dispatch::handlers::send_whatsapp,
            crate::dispatch::handlers::generate_and_send_invoice,
            crate::batch_slip::handlers::get_all_batch_slips,
            crate::batch_slip::handlers::create_batch_slip,
            crate::invoice::handlers::get_all_invoices
        ),
        components(
            schemas(
                batch_slip::models::BatchSlipRecord,
                batch_slip::models::BatchSlipSubmission,
                batch_slip::models::MaterialRow,
                batch_slip::models::MaterialRowSubmission,
                batch_slip::models::MaterialTotals,
                invoice::models::InvoiceRecord,
                invoice::models::InvoiceSubmission,
                dispatch::handlers::SendWhatsAppRequest,
                dispatch::handlers::SendResponse,
                dispatch::handlers::SendDetails,
                ErrorResponse,
            )
        ),
        tags(
            (name = "Dispatch Service", description = "Invoice generation and WhatsApp delivery endpoints."),
            (name = "Batch Slip Service", description = "Batch slip store endpoints."),
            (name = "Invoice Service", description = "Invoice store endpoints.")
        ),
        servers(
            (url = "http://127.0.0.1:8080", description = "Localhost server")
        )
    )]
    struct ApiDoc;

    dotenvy::dotenv().ok(); // Load .env file
    let app_state = match AppState::new().await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to start. Please check your DATABASE_URL and WhatsApp provider settings in .env. Error: {}", e);
            std::process::exit(1);
        }
    };
    let uploads_dir = app_state.storage_config.uploads_dir.clone();
    std::fs::create_dir_all(&uploads_dir)?;

    let prometheus = PrometheusMetricsBuilder::new("rmc_dispatch_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    log::info!("Starting server at http://0.0.0.0:8080");

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let uploads_dir = uploads_dir.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/send-whatsapp")
                            .route(web::post().to(dispatch::handlers::send_whatsapp)),
                    )
                    .service(
                        web::resource("/generate-and-send-invoice")
                            .route(web::post().to(dispatch::handlers::generate_and_send_invoice)),
                    )
                    .service(
                        web::resource("/batch-slips")
                            .route(web::get().to(batch_slip::handlers::get_all_batch_slips))
                            .route(web::post().to(batch_slip::handlers::create_batch_slip)),
                    )
                    .service(
                        web::resource("/invoices")
                            .route(web::get().to(invoice::handlers::get_all_invoices)),
                    ),
            )
            .service(actix_files::Files::new("/uploads", uploads_dir))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .backlog(8192)
    .max_connections(25000)
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(("0.0.0.0", 8080))?
    .run()
    .await
}
