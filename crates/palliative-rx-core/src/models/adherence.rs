//! Patient medication adherence logs.

use serde::{Deserialize, Serialize};

use crate::validation::{parse_timestamp, validate_id, validate_non_negative, ValidationResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceLog {
    pub id: String,
    pub patient_id: String,
    pub medicine_id: String,
    pub taken_at: String,
    pub missed: bool,
    pub remarks: Option<String>,
    pub quantity_taken: Option<i64>,
}

/// Adherence log joined with the names a reviewer needs to read it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceLogDetail {
    #[serde(flatten)]
    pub log: AdherenceLog,
    pub patient_name: Option<String>,
    pub medicine_name: String,
}

/// Log body; the patient comes from the route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdherenceLog {
    pub medicine_id: String,
    pub taken_at: Option<String>,
    #[serde(default)]
    pub missed: bool,
    pub remarks: Option<String>,
    pub quantity_taken: Option<i64>,
}

impl NewAdherenceLog {
    /// Validate and return the normalized `taken_at`, if one was given.
    pub fn validate(&self) -> ValidationResult<Option<String>> {
        validate_id("medicineId", &self.medicine_id)?;
        if let Some(quantity) = self.quantity_taken {
            validate_non_negative("quantityTaken", quantity)?;
        }
        self.taken_at
            .as_deref()
            .map(|value| parse_timestamp("takenAt", value))
            .transpose()
    }
}
