//! Batch-slip database operations

use sqlx::types::Json;
use sqlx::Row;

use super::AppState;
use crate::batch_slip::models::{BatchSlipRecord, MaterialRow, MaterialTotals};

const BATCH_SLIP_CACHE_KEY: &str = "all_batch_slips";

impl AppState {
    pub async fn insert_batch_slip(&self, record: &BatchSlipRecord) -> Result<i64, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO batch_slips (
                plant_serial_number, batch_date, batch_start_time, batch_end_time,
                batch_number, customer, site, recipe_code, recipe_name,
                truck_number, truck_driver, order_number, batcher_name,
                ordered_quantity, production_quantity, adj_manual_quantity,
                with_this_load, mixer_capacity, batch_size,
                client_name, client_address, client_email, client_gstin,
                client_whatsapp, description, hsn, quantity, rate, unit,
                material_data, totals
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31
            )
            RETURNING id
            "#,
        )
        .bind(&record.plant_serial_number)
        .bind(record.batch_date)
        .bind(&record.batch_start_time)
        .bind(&record.batch_end_time)
        .bind(&record.batch_number)
        .bind(&record.customer)
        .bind(&record.site)
        .bind(&record.recipe_code)
        .bind(&record.recipe_name)
        .bind(&record.truck_number)
        .bind(&record.truck_driver)
        .bind(&record.order_number)
        .bind(&record.batcher_name)
        .bind(record.ordered_quantity)
        .bind(record.production_quantity)
        .bind(record.adj_manual_quantity)
        .bind(record.with_this_load)
        .bind(record.mixer_capacity)
        .bind(record.batch_size)
        .bind(&record.client_name)
        .bind(&record.client_address)
        .bind(&record.client_email)
        .bind(&record.client_gstin)
        .bind(&record.client_whatsapp)
        .bind(&record.description)
        .bind(&record.hsn)
        .bind(record.quantity)
        .bind(record.rate)
        .bind(&record.unit)
        .bind(Json(&record.material_data))
        .bind(Json(record.totals))
        .fetch_one(&self.pool)
        .await?;

        self.batch_slip_cache.invalidate(BATCH_SLIP_CACHE_KEY).await;

        Ok(id)
    }

    pub async fn get_all_batch_slips(&self) -> Result<Vec<BatchSlipRecord>, sqlx::Error> {
        sqlx::query(
            r#"
            SELECT plant_serial_number, batch_date, batch_start_time, batch_end_time,
                   batch_number, customer, site, recipe_code, recipe_name,
                   truck_number, truck_driver, order_number, batcher_name,
                   ordered_quantity, production_quantity, adj_manual_quantity,
                   with_this_load, mixer_capacity, batch_size,
                   client_name, client_address, client_email, client_gstin,
                   client_whatsapp, description, hsn, quantity, rate, unit,
                   material_data, totals
            FROM batch_slips
            ORDER BY created_at DESC
            "#,
        )
        .try_map(|row: sqlx::postgres::PgRow| {
            let material_data: Json<Vec<MaterialRow>> = row.try_get("material_data")?;
            let totals: Json<MaterialTotals> = row.try_get("totals")?;
            Ok(BatchSlipRecord {
                plant_serial_number: row.try_get("plant_serial_number")?,
                batch_date: row.try_get("batch_date")?,
                batch_start_time: row.try_get("batch_start_time")?,
                batch_end_time: row.try_get("batch_end_time")?,
                batch_number: row.try_get("batch_number")?,
                customer: row.try_get("customer")?,
                site: row.try_get("site")?,
                recipe_code: row.try_get("recipe_code")?,
                recipe_name: row.try_get("recipe_name")?,
                truck_number: row.try_get("truck_number")?,
                truck_driver: row.try_get("truck_driver")?,
                order_number: row.try_get("order_number")?,
                batcher_name: row.try_get("batcher_name")?,
                ordered_quantity: row.try_get("ordered_quantity")?,
                production_quantity: row.try_get("production_quantity")?,
                adj_manual_quantity: row.try_get("adj_manual_quantity")?,
                with_this_load: row.try_get("with_this_load")?,
                mixer_capacity: row.try_get("mixer_capacity")?,
                batch_size: row.try_get("batch_size")?,
                client_name: row.try_get("client_name")?,
                client_address: row.try_get("client_address")?,
                client_email: row.try_get("client_email")?,
                client_gstin: row.try_get("client_gstin")?,
                client_whatsapp: row.try_get("client_whatsapp")?,
                description: row.try_get("description")?,
                hsn: row.try_get("hsn")?,
                quantity: row.try_get("quantity")?,
                rate: row.try_get("rate")?,
                unit: row.try_get("unit")?,
                material_data: material_data.0,
                totals: totals.0,
            })
        })
        .fetch_all(&self.pool)
        .await
    }

    /// Cached read of the batch-slip list, 10-minute TTL.
    pub async fn get_all_batch_slips_cached(&self) -> Result<Vec<BatchSlipRecord>, sqlx::Error> {
        if let Some(cached) = self.batch_slip_cache.get(BATCH_SLIP_CACHE_KEY).await {
            return Ok(cached);
        }

        let slips = self.get_all_batch_slips().await?;
        self.batch_slip_cache
            .insert(BATCH_SLIP_CACHE_KEY.to_string(), slips.clone())
            .await;
        Ok(slips)
    }
}
