//! Invoice database operations

use sqlx::Row;

use super::AppState;
use crate::invoice::models::InvoiceRecord;

const INVOICE_CACHE_KEY: &str = "all_invoices";

impl AppState {
    pub async fn insert_invoice(&self, record: &InvoiceRecord) -> Result<i64, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoices (
                invoice_number, batch_number, client_name, client_address,
                client_email, client_gstin, client_whatsapp, description, hsn,
                quantity, rate, unit, total, cgst, sgst, grand_total,
                amount_in_words, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9,
                $10, $11, $12, $13, $14, $15, $16, $17, $18
            )
            RETURNING id
            "#,
        )
        .bind(&record.invoice_number)
        .bind(&record.batch_number)
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
        .bind(record.total)
        .bind(record.cgst)
        .bind(record.sgst)
        .bind(record.grand_total)
        .bind(&record.amount_in_words)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        self.invoice_cache.invalidate(INVOICE_CACHE_KEY).await;

        Ok(id)
    }

    pub async fn get_all_invoices(&self) -> Result<Vec<InvoiceRecord>, sqlx::Error> {
        sqlx::query(
            r#"
            SELECT invoice_number, batch_number, client_name, client_address,
                   client_email, client_gstin, client_whatsapp, description, hsn,
                   quantity, rate, unit, total, cgst, sgst, grand_total,
                   amount_in_words, created_at
            FROM invoices
            ORDER BY created_at DESC
            "#,
        )
        .try_map(|row: sqlx::postgres::PgRow| {
            Ok(InvoiceRecord {
                invoice_number: row.try_get("invoice_number")?,
                batch_number: row.try_get("batch_number")?,
                created_at: row.try_get("created_at")?,
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
                total: row.try_get("total")?,
                cgst: row.try_get("cgst")?,
                sgst: row.try_get("sgst")?,
                grand_total: row.try_get("grand_total")?,
                amount_in_words: row.try_get("amount_in_words")?,
            })
        })
        .fetch_all(&self.pool)
        .await
    }

    /// Cached read of the invoice list, 10-minute TTL.
    pub async fn get_all_invoices_cached(&self) -> Result<Vec<InvoiceRecord>, sqlx::Error> {
        if let Some(cached) = self.invoice_cache.get(INVOICE_CACHE_KEY).await {
            return Ok(cached);
        }

        let invoices = self.get_all_invoices().await?;
        self.invoice_cache
            .insert(INVOICE_CACHE_KEY.to_string(), invoices.clone())
            .await;
        Ok(invoices)
    }
}
