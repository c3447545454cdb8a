#[actix_web::main]
async fn main() -> std::io::Result<()> {
    rmc_dispatch_server::run().await
}
