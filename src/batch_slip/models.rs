use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::collector::{
    parse_decimal, parse_decimal_or_zero, validate_email, validate_phone, validate_required,
    ValidationError, ValidationErrors,
};

/// A batch slip always carries exactly this many material dosage rows.
pub const MATERIAL_ROW_COUNT: usize = 20;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One dosage row of the material table (all quantities in kg, admixture in l).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRow {
    pub sand: f64,
    pub mm40: f64,
    pub mm20: f64,
    pub mm0: f64,
    pub cem1: f64,
    pub cem2: f64,
    pub cem3: f64,
    pub water: f64,
    pub admix1: f64,
}

/// Column-wise totals over the 20 material rows, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialTotals {
    pub total_sand: f64,
    pub total_mm40: f64,
    pub total_mm20: f64,
    pub total_mm0: f64,
    pub total_cem1: f64,
    pub total_cem2: f64,
    pub total_cem3: f64,
    pub total_water: f64,
    pub total_admix1: f64,
}

impl MaterialTotals {
    /// Recompute every column sum. Idempotent: the input rows are not touched,
    /// so computing twice yields identical totals.
    pub fn compute(rows: &[MaterialRow]) -> Self {
        let mut totals = MaterialTotals::default();
        for row in rows {
            totals.total_sand += row.sand;
            totals.total_mm40 += row.mm40;
            totals.total_mm20 += row.mm20;
            totals.total_mm0 += row.mm0;
            totals.total_cem1 += row.cem1;
            totals.total_cem2 += row.cem2;
            totals.total_cem3 += row.cem3;
            totals.total_water += row.water;
            totals.total_admix1 += row.admix1;
        }
        totals.total_sand = round2(totals.total_sand);
        totals.total_mm40 = round2(totals.total_mm40);
        totals.total_mm20 = round2(totals.total_mm20);
        totals.total_mm0 = round2(totals.total_mm0);
        totals.total_cem1 = round2(totals.total_cem1);
        totals.total_cem2 = round2(totals.total_cem2);
        totals.total_cem3 = round2(totals.total_cem3);
        totals.total_water = round2(totals.total_water);
        totals.total_admix1 = round2(totals.total_admix1);
        totals
    }
}

/// Durable batch-slip record: one billable concrete delivery plus the plant
/// production metadata. Immutable once rendered into a document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchSlipRecord {
    pub plant_serial_number: String,
    pub batch_date: NaiveDate,
    pub batch_start_time: String,
    pub batch_end_time: String,
    pub batch_number: String,
    pub customer: String,
    pub site: String,
    pub recipe_code: String,
    pub recipe_name: String,
    pub truck_number: String,
    pub truck_driver: String,
    pub order_number: String,
    pub batcher_name: String,
    pub ordered_quantity: f64,
    pub production_quantity: f64,
    pub adj_manual_quantity: f64,
    pub with_this_load: f64,
    pub mixer_capacity: f64,
    pub batch_size: f64,
    pub client_name: String,
    pub client_address: String,
    pub client_email: String,
    pub client_gstin: String,
    #[serde(rename = "clientWhatsApp")]
    pub client_whatsapp: String,
    pub description: String,
    pub hsn: String,
    pub quantity: f64,
    pub rate: f64,
    pub unit: String,
    pub material_data: Vec<MaterialRow>,
    pub totals: MaterialTotals,
}

impl BatchSlipRecord {
    /// `amount = quantity x rate`, rounded to 2 decimals for display.
    pub fn amount(&self) -> f64 {
        round2(self.quantity * self.rate)
    }

    /// Recompute the totals from the current material rows. Called after any
    /// row edit so a stale-total record is never persisted.
    pub fn recompute_totals(&mut self) {
        self.totals = MaterialTotals::compute(&self.material_data);
    }
}

/// Generate a business batch number: `YYYYMMDD` + 3-digit random sequence.
pub fn generate_batch_number() -> String {
    let today = Utc::now().date_naive();
    let sequence = rand::thread_rng().gen_range(1..=999);
    format!("{}{:03}", today.format("%Y%m%d"), sequence)
}

/// Accepts both `"15.00"` and `15.0` for quantity-ish JSON fields; the source
/// forms are inconsistent about which one they send.
pub(crate) fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// One material row as submitted by the form (string fields, unparsed).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialRowSubmission {
    #[serde(deserialize_with = "flexible_string")]
    pub sand: String,
    #[serde(deserialize_with = "flexible_string")]
    pub mm40: String,
    #[serde(deserialize_with = "flexible_string")]
    pub mm20: String,
    #[serde(deserialize_with = "flexible_string")]
    pub mm0: String,
    #[serde(deserialize_with = "flexible_string")]
    pub cem1: String,
    #[serde(deserialize_with = "flexible_string")]
    pub cem2: String,
    #[serde(deserialize_with = "flexible_string")]
    pub cem3: String,
    #[serde(deserialize_with = "flexible_string")]
    pub water: String,
    #[serde(deserialize_with = "flexible_string")]
    pub admix1: String,
}

impl MaterialRowSubmission {
    fn to_row(&self) -> MaterialRow {
        MaterialRow {
            sand: parse_decimal_or_zero(&self.sand),
            mm40: parse_decimal_or_zero(&self.mm40),
            mm20: parse_decimal_or_zero(&self.mm20),
            mm0: parse_decimal_or_zero(&self.mm0),
            cem1: parse_decimal_or_zero(&self.cem1),
            cem2: parse_decimal_or_zero(&self.cem2),
            cem3: parse_decimal_or_zero(&self.cem3),
            water: parse_decimal_or_zero(&self.water),
            admix1: parse_decimal_or_zero(&self.admix1),
        }
    }
}

/// Raw batch-slip submission as posted by the form. All fields arrive as
/// strings; `validate` turns it into a typed [`BatchSlipRecord`] or a
/// field -> message error map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchSlipSubmission {
    pub plant_serial_number: String,
    pub batch_date: String,
    pub batch_start_time: String,
    pub batch_end_time: String,
    pub batch_number: String,
    pub customer: String,
    pub site: String,
    pub recipe_code: String,
    pub recipe_name: String,
    pub truck_number: String,
    pub truck_driver: String,
    pub order_number: String,
    pub batcher_name: String,
    #[serde(deserialize_with = "flexible_string")]
    pub ordered_quantity: String,
    #[serde(deserialize_with = "flexible_string")]
    pub production_quantity: String,
    #[serde(deserialize_with = "flexible_string")]
    pub adj_manual_quantity: String,
    #[serde(deserialize_with = "flexible_string")]
    pub with_this_load: String,
    #[serde(deserialize_with = "flexible_string")]
    pub mixer_capacity: String,
    #[serde(deserialize_with = "flexible_string")]
    pub batch_size: String,
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
    pub material_data: Vec<MaterialRowSubmission>,
}

impl BatchSlipSubmission {
    /// Validate the submission and build the typed record.
    ///
    /// Required-ness and formats mirror the create-batch-slip form: the
    /// production metadata and client block are mandatory, the WhatsApp
    /// handle must be E.164-like and the email must look like an address.
    /// An absent material table defaults to 20 zeroed rows; anything else
    /// must be exactly 20 rows.
    pub fn validate(&self) -> Result<BatchSlipRecord, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.batch_date, "batchDate", "Batch date", &mut errors);
        validate_required(&self.customer, "customer", "Customer", &mut errors);
        validate_required(&self.recipe_code, "recipeCode", "Recipe code", &mut errors);
        validate_required(&self.recipe_name, "recipeName", "Recipe name", &mut errors);
        validate_required(&self.truck_number, "truckNumber", "Truck number", &mut errors);
        validate_required(&self.truck_driver, "truckDriver", "Truck driver", &mut errors);
        validate_required(&self.batcher_name, "batcherName", "Batcher name", &mut errors);
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

        let batch_date = match NaiveDate::parse_from_str(self.batch_date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                if !self.batch_date.trim().is_empty() {
                    errors.add(ValidationError::new(
                        "batchDate",
                        "Batch date must be in YYYY-MM-DD format",
                    ));
                }
                Utc::now().date_naive()
            }
        };

        let quantity = parse_decimal(&self.quantity, "quantity", "Quantity", &mut errors);
        let rate = parse_decimal(&self.rate, "rate", "Rate", &mut errors);

        let material_data: Vec<MaterialRow> = if self.material_data.is_empty() {
            vec![MaterialRow::default(); MATERIAL_ROW_COUNT]
        } else if self.material_data.len() == MATERIAL_ROW_COUNT {
            self.material_data.iter().map(|row| row.to_row()).collect()
        } else {
            errors.add(ValidationError::new(
                "materialData",
                format!(
                    "Material table must contain exactly {} rows, got {}",
                    MATERIAL_ROW_COUNT,
                    self.material_data.len()
                ),
            ));
            Vec::new()
        };

        errors.into_result()?;

        let batch_number = if self.batch_number.trim().is_empty() {
            generate_batch_number()
        } else {
            self.batch_number.trim().to_string()
        };

        let totals = MaterialTotals::compute(&material_data);

        Ok(BatchSlipRecord {
            plant_serial_number: if self.plant_serial_number.trim().is_empty() {
                "3494".to_string()
            } else {
                self.plant_serial_number.trim().to_string()
            },
            batch_date,
            batch_start_time: self.batch_start_time.trim().to_string(),
            batch_end_time: self.batch_end_time.trim().to_string(),
            batch_number,
            customer: self.customer.trim().to_string(),
            site: self.site.trim().to_string(),
            recipe_code: self.recipe_code.trim().to_string(),
            recipe_name: self.recipe_name.trim().to_string(),
            truck_number: self.truck_number.trim().to_string(),
            truck_driver: self.truck_driver.trim().to_string(),
            order_number: self.order_number.trim().to_string(),
            batcher_name: self.batcher_name.trim().to_string(),
            ordered_quantity: parse_decimal_or_zero(&self.ordered_quantity),
            production_quantity: parse_decimal_or_zero(&self.production_quantity),
            adj_manual_quantity: parse_decimal_or_zero(&self.adj_manual_quantity),
            with_this_load: parse_decimal_or_zero(&self.with_this_load),
            mixer_capacity: parse_decimal_or_zero(&self.mixer_capacity),
            batch_size: parse_decimal_or_zero(&self.batch_size),
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
            material_data,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> BatchSlipSubmission {
        BatchSlipSubmission {
            batch_date: "2025-05-06".to_string(),
            customer: "Client A".to_string(),
            recipe_code: "M30".to_string(),
            recipe_name: "Concrete M30".to_string(),
            truck_number: "TN01AB1234".to_string(),
            truck_driver: "Murugesan".to_string(),
            batcher_name: "SS".to_string(),
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
    fn test_valid_submission_builds_record() {
        let record = submission().validate().expect("submission should validate");
        assert_eq!(record.quantity, 15.0);
        assert_eq!(record.rate, 4000.0);
        assert_eq!(record.amount(), 60000.0);
        assert_eq!(record.unit, "M³");
        assert_eq!(record.material_data.len(), MATERIAL_ROW_COUNT);
        assert_eq!(record.batch_number.len(), 11);
    }

    #[test]
    fn test_missing_required_fields_map() {
        let mut sub = submission();
        sub.customer = String::new();
        sub.client_whatsapp = "9876543210".to_string();
        let errors = sub.validate().unwrap_err().to_field_map();
        assert!(errors.contains_key("customer"));
        assert!(errors.contains_key("clientWhatsApp"));
    }

    #[test]
    fn test_wrong_material_row_count_rejected() {
        let mut sub = submission();
        sub.material_data = vec![MaterialRowSubmission::default(); 5];
        let errors = sub.validate().unwrap_err().to_field_map();
        assert!(errors.contains_key("materialData"));
    }

    #[test]
    fn test_totals_match_column_sums() {
        let rows = vec![
            MaterialRow {
                sand: 145.0,
                mm40: 75.0,
                mm20: 150.0,
                mm0: 0.0,
                cem1: 25.0,
                cem2: 25.0,
                cem3: 25.0,
                water: 45.0,
                admix1: 0.38,
            };
            MATERIAL_ROW_COUNT
        ];
        let totals = MaterialTotals::compute(&rows);
        assert_eq!(totals.total_sand, 2900.0);
        assert_eq!(totals.total_mm40, 1500.0);
        assert_eq!(totals.total_water, 900.0);
        assert_eq!(totals.total_admix1, 7.6);
    }

    #[test]
    fn test_totals_recompute_is_idempotent() {
        let mut record = submission().validate().unwrap();
        record.material_data[3].water = 52.5;
        record.recompute_totals();
        let first = record.totals;
        record.recompute_totals();
        assert_eq!(first, record.totals);
        assert_eq!(record.totals.total_water, 52.5);
    }

    #[test]
    fn test_batch_number_shape() {
        let number = generate_batch_number();
        assert_eq!(number.len(), 11);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
        let today = Utc::now().date_naive().format("%Y%m%d").to_string();
        assert!(number.starts_with(&today));
    }

    #[test]
    fn test_numeric_fields_accept_json_numbers() {
        let json = r#"{
            "batchDate": "2025-05-06",
            "customer": "Client A",
            "withThisLoad": 0,
            "quantity": "15.00",
            "rate": 4000
        }"#;
        let sub: BatchSlipSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(sub.with_this_load, "0");
        assert_eq!(sub.rate, "4000");
    }
}
