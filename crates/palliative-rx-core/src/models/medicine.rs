//! Medicine catalog and per-pharmacy inventory batches.

use serde::{Deserialize, Serialize};

use crate::validation::{
    non_empty, parse_timestamp, validate_id, validate_non_negative, ValidationResult,
};

/// Threshold applied when an inventory batch does not set one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

text_enum! {
    /// Regulatory class of a medicine.
    MedicineType ("medicine type") {
        General => "GENERAL",
        Opioid => "OPIOID",
        Controlled => "CONTROLLED",
    }
}

impl Default for MedicineType {
    fn default() -> Self {
        MedicineType::General
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: String,
    pub name: String,
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub medicine_type: MedicineType,
    pub dosage: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicine {
    pub name: String,
    pub manufacturer: Option<String>,
    #[serde(rename = "type", default)]
    pub medicine_type: MedicineType,
    pub dosage: Option<String>,
}

impl NewMedicine {
    pub fn validate(&self) -> ValidationResult<()> {
        non_empty("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineUpdate {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub medicine_type: Option<MedicineType>,
    pub dosage: Option<String>,
}

impl MedicineUpdate {
    pub fn apply(self, medicine: &mut Medicine) -> ValidationResult<()> {
        if let Some(name) = self.name {
            non_empty("name", &name)?;
            medicine.name = name;
        }
        if let Some(manufacturer) = self.manufacturer {
            medicine.manufacturer = Some(manufacturer);
        }
        if let Some(medicine_type) = self.medicine_type {
            medicine.medicine_type = medicine_type;
        }
        if let Some(dosage) = self.dosage {
            medicine.dosage = Some(dosage);
        }
        Ok(())
    }
}

/// One stock batch of a medicine held at a pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub pharmacy_id: String,
    pub medicine_id: String,
    pub batch_number: String,
    pub quantity: i64,
    pub expiry_date: String,
    pub low_stock_threshold: i64,
    pub last_updated: String,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Add-to-inventory body; the pharmacy comes from the route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub medicine_id: String,
    pub batch_number: String,
    pub quantity: i64,
    pub expiry_date: String,
    pub low_stock_threshold: Option<i64>,
}

impl NewInventoryItem {
    /// Validate and return the normalized expiry timestamp.
    pub fn validate(&self) -> ValidationResult<String> {
        validate_id("medicineId", &self.medicine_id)?;
        non_empty("batchNumber", &self.batch_number)?;
        validate_non_negative("quantity", self.quantity)?;
        if let Some(threshold) = self.low_stock_threshold {
            validate_non_negative("lowStockThreshold", threshold)?;
        }
        parse_timestamp("expiryDate", &self.expiry_date)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub batch_number: Option<String>,
    pub quantity: Option<i64>,
    pub expiry_date: Option<String>,
    pub low_stock_threshold: Option<i64>,
}

impl InventoryUpdate {
    pub fn apply(&self, item: &mut InventoryItem) -> ValidationResult<()> {
        if let Some(batch_number) = &self.batch_number {
            non_empty("batchNumber", batch_number)?;
            item.batch_number = batch_number.clone();
        }
        if let Some(quantity) = self.quantity {
            validate_non_negative("quantity", quantity)?;
            item.quantity = quantity;
        }
        if let Some(expiry_date) = &self.expiry_date {
            item.expiry_date = parse_timestamp("expiryDate", expiry_date)?;
        }
        if let Some(threshold) = self.low_stock_threshold {
            validate_non_negative("lowStockThreshold", threshold)?;
            item.low_stock_threshold = threshold;
        }
        Ok(())
    }
}
