//! Prescriptions, their medicine lines, and fills (dispense events).

use serde::{Deserialize, Serialize};

use crate::validation::{
    non_empty, require_fields, validate_id, validate_positive, ValidationError,
    ValidationResult,
};

text_enum! {
    /// Prescription lifecycle status.
    PrescriptionStatus ("prescription status") {
        Active => "ACTIVE",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl Default for PrescriptionStatus {
    fn default() -> Self {
        PrescriptionStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub status: PrescriptionStatus,
    pub created_at: String,
    pub notes: Option<String>,
}

/// A single medicine line on a prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionMedicine {
    pub id: String,
    pub prescription_id: String,
    pub medicine_id: String,
    pub dosage: String,
    pub frequency: String,
    /// Course length in days
    pub duration: i64,
    pub quantity_prescribed: i64,
}

/// A prescription together with its medicine lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDetail {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub medicines: Vec<PrescriptionMedicine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescriptionMedicine {
    pub medicine_id: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: i64,
    pub quantity_prescribed: i64,
}

impl NewPrescriptionMedicine {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("medicineId", &self.medicine_id)?;
        non_empty("dosage", &self.dosage)?;
        non_empty("frequency", &self.frequency)?;
        validate_positive("duration", self.duration)?;
        validate_positive("quantityPrescribed", self.quantity_prescribed)
    }
}

/// Create-prescription body, optionally carrying its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub doctor_id: String,
    pub patient_id: String,
    pub status: Option<PrescriptionStatus>,
    pub notes: Option<String>,
    #[serde(default)]
    pub medicines: Vec<NewPrescriptionMedicine>,
}

impl NewPrescription {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("doctorId", &self.doctor_id)?;
        validate_id("patientId", &self.patient_id)?;
        for line in &self.medicines {
            line.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionUpdate {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub status: Option<PrescriptionStatus>,
    pub notes: Option<String>,
}

impl PrescriptionUpdate {
    pub fn apply(self, prescription: &mut Prescription) -> ValidationResult<()> {
        if let Some(doctor_id) = self.doctor_id {
            validate_id("doctorId", &doctor_id)?;
            prescription.doctor_id = doctor_id;
        }
        if let Some(patient_id) = self.patient_id {
            validate_id("patientId", &patient_id)?;
            prescription.patient_id = patient_id;
        }
        if let Some(status) = self.status {
            prescription.status = status;
        }
        if let Some(notes) = self.notes {
            prescription.notes = Some(notes);
        }
        Ok(())
    }
}

/// A dispense event against one prescription line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionFill {
    pub id: String,
    pub pharmacy_id: String,
    pub prescription_medicine_id: String,
    pub quantity_dispensed: i64,
    pub dispensed_at: String,
}

/// Dispense request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescriptionFill {
    pub pharmacy_id: Option<String>,
    pub prescription_medicine_id: Option<String>,
    pub quantity_dispensed: Option<i64>,
}

/// Validated dispense request.
#[derive(Debug, Clone, PartialEq)]
pub struct DispenseRequest {
    pub pharmacy_id: String,
    pub prescription_medicine_id: String,
    pub quantity: i64,
}

impl NewPrescriptionFill {
    pub fn validate(&self) -> ValidationResult<DispenseRequest> {
        require_fields(&[
            ("pharmacyId", self.pharmacy_id.is_some()),
            ("prescriptionMedicineId", self.prescription_medicine_id.is_some()),
            ("quantityDispensed", self.quantity_dispensed.is_some()),
        ])?;
        let pharmacy_id = self.pharmacy_id.clone().unwrap_or_default();
        let prescription_medicine_id = self.prescription_medicine_id.clone().unwrap_or_default();
        let quantity = self.quantity_dispensed.unwrap_or_default();

        validate_id("pharmacyId", &pharmacy_id)?;
        validate_id("prescriptionMedicineId", &prescription_medicine_id)?;
        if quantity <= 0 {
            return Err(ValidationError::Invalid(
                "Quantity dispensed must be a positive number".into(),
            ));
        }

        Ok(DispenseRequest {
            pharmacy_id,
            prescription_medicine_id,
            quantity,
        })
    }
}
