//! Database module - AppState and database operations
//!
//! This module is split into submodules for better separation of concerns:
//! - `batch_slip` - batch-slip store operations
//! - `invoice` - invoice store operations

mod batch_slip;
mod invoice;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::batch_slip::models::BatchSlipRecord;
use crate::config::{DeliveryConfig, StorageConfig};
use crate::delivery::{build_adapter, DeliveryAdapter};
use crate::invoice::models::InvoiceRecord;
use crate::storage::{LocalStorage, ObjectStorage};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub batch_slip_cache: Cache<String, Vec<BatchSlipRecord>>,
    pub invoice_cache: Cache<String, Vec<InvoiceRecord>>,
    pub http_client: reqwest::Client,
    pub storage: Arc<dyn ObjectStorage>,
    pub adapter: Arc<dyn DeliveryAdapter>,
    pub storage_config: StorageConfig,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file
        let delivery_config = DeliveryConfig::from_env()?;
        let storage_config = StorageConfig::from_env();
        Self::new_with_config(delivery_config, storage_config).await
    }

    pub async fn new_with_config(
        delivery_config: DeliveryConfig,
        storage_config: StorageConfig,
    ) -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(50)
            .min_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&database_url)
            .await?;

        Self::ensure_schema(&pool).await?;

        Self::new_with_pool(pool, delivery_config, storage_config)
    }

    /// Assemble the state from an already-connected pool. The delivery
    /// adapter is selected from `delivery_config`; tests that need a
    /// canned adapter use [`AppState::with_adapter`] instead.
    pub fn new_with_pool(
        pool: PgPool,
        delivery_config: DeliveryConfig,
        storage_config: StorageConfig,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent("rmc-dispatch-server/0.3")
            .build()?;

        let storage: Arc<dyn ObjectStorage> = Arc::new(LocalStorage::new(
            storage_config.uploads_dir.clone(),
            storage_config.public_base_url.clone(),
        ));

        let adapter = build_adapter(&delivery_config, http_client.clone(), storage.clone())?;
        log::info!("Delivery adapter wired: {}", adapter.kind());

        Ok(Self::assemble(
            pool,
            http_client,
            storage,
            adapter,
            storage_config,
        ))
    }

    pub fn with_adapter(
        pool: PgPool,
        adapter: Arc<dyn DeliveryAdapter>,
        storage_config: StorageConfig,
    ) -> Self {
        let http_client = reqwest::Client::new();
        let storage: Arc<dyn ObjectStorage> = Arc::new(LocalStorage::new(
            storage_config.uploads_dir.clone(),
            storage_config.public_base_url.clone(),
        ));
        Self::assemble(pool, http_client, storage, adapter, storage_config)
    }

    fn assemble(
        pool: PgPool,
        http_client: reqwest::Client,
        storage: Arc<dyn ObjectStorage>,
        adapter: Arc<dyn DeliveryAdapter>,
        storage_config: StorageConfig,
    ) -> Self {
        let batch_slip_cache = Cache::builder()
            .time_to_live(Duration::from_secs(10 * 60))
            .max_capacity(10)
            .build();

        let invoice_cache = Cache::builder()
            .time_to_live(Duration::from_secs(10 * 60))
            .max_capacity(10)
            .build();

        AppState {
            pool,
            batch_slip_cache,
            invoice_cache,
            http_client,
            storage,
            adapter,
            storage_config,
        }
    }

    /// Create the batch-slip and invoice tables when they do not exist yet.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS batch_slips (
                id BIGSERIAL PRIMARY KEY,
                plant_serial_number TEXT NOT NULL,
                batch_date DATE NOT NULL,
                batch_start_time TEXT NOT NULL DEFAULT '',
                batch_end_time TEXT NOT NULL DEFAULT '',
                batch_number TEXT NOT NULL,
                customer TEXT NOT NULL DEFAULT '',
                site TEXT NOT NULL DEFAULT '',
                recipe_code TEXT NOT NULL DEFAULT '',
                recipe_name TEXT NOT NULL DEFAULT '',
                truck_number TEXT NOT NULL DEFAULT '',
                truck_driver TEXT NOT NULL DEFAULT '',
                order_number TEXT NOT NULL DEFAULT '',
                batcher_name TEXT NOT NULL DEFAULT '',
                ordered_quantity DOUBLE PRECISION NOT NULL DEFAULT 0,
                production_quantity DOUBLE PRECISION NOT NULL DEFAULT 0,
                adj_manual_quantity DOUBLE PRECISION NOT NULL DEFAULT 0,
                with_this_load DOUBLE PRECISION NOT NULL DEFAULT 0,
                mixer_capacity DOUBLE PRECISION NOT NULL DEFAULT 0,
                batch_size DOUBLE PRECISION NOT NULL DEFAULT 0,
                client_name TEXT NOT NULL,
                client_address TEXT NOT NULL,
                client_email TEXT NOT NULL,
                client_gstin TEXT NOT NULL DEFAULT '',
                client_whatsapp TEXT NOT NULL,
                description TEXT NOT NULL,
                hsn TEXT NOT NULL DEFAULT '',
                quantity DOUBLE PRECISION NOT NULL,
                rate DOUBLE PRECISION NOT NULL,
                unit TEXT NOT NULL,
                material_data JSONB NOT NULL,
                totals JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS invoices (
                id BIGSERIAL PRIMARY KEY,
                invoice_number TEXT NOT NULL,
                batch_number TEXT NOT NULL,
                client_name TEXT NOT NULL,
                client_address TEXT NOT NULL,
                client_email TEXT NOT NULL,
                client_gstin TEXT NOT NULL DEFAULT '',
                client_whatsapp TEXT NOT NULL,
                description TEXT NOT NULL,
                hsn TEXT NOT NULL DEFAULT '',
                quantity DOUBLE PRECISION NOT NULL,
                rate DOUBLE PRECISION NOT NULL,
                unit TEXT NOT NULL,
                total DOUBLE PRECISION NOT NULL,
                cgst DOUBLE PRECISION NOT NULL,
                sgst DOUBLE PRECISION NOT NULL,
                grand_total DOUBLE PRECISION NOT NULL,
                amount_in_words TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
