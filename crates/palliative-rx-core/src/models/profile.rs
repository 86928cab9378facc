//! Role profiles linked to user accounts: doctors, patients, pharmacies
//! and distributors.

use serde::{Deserialize, Serialize};

use crate::validation::{
    non_empty, present, require_fields, validate_email, validate_id, ValidationResult,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub user_id: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub user_id: String,
    pub specialization: Option<String>,
}

impl NewDoctor {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("userId", &self.user_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorUpdate {
    pub user_id: Option<String>,
    pub specialization: Option<String>,
}

impl DoctorUpdate {
    pub fn apply(self, doctor: &mut Doctor) -> ValidationResult<()> {
        if let Some(user_id) = self.user_id {
            validate_id("userId", &user_id)?;
            doctor.user_id = user_id;
        }
        if let Some(specialization) = self.specialization {
            doctor.specialization = Some(specialization);
        }
        Ok(())
    }
}

/// A patient profile. The linked user account is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub user_id: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub user_id: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

impl NewPatient {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(user_id) = &self.user_id {
            validate_id("userId", user_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    pub user_id: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

impl PatientUpdate {
    pub fn apply(self, patient: &mut Patient) -> ValidationResult<()> {
        if let Some(user_id) = self.user_id {
            validate_id("userId", &user_id)?;
            patient.user_id = Some(user_id);
        }
        if let Some(contact_number) = self.contact_number {
            patient.contact_number = Some(contact_number);
        }
        if let Some(address) = self.address {
            patient.address = Some(address);
        }
        Ok(())
    }
}

/// A dispensing pharmacy. `user_id` is the pharmacist account that
/// receives stock notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub id: String,
    pub name: String,
    pub location: String,
    pub contact: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPharmacy {
    pub name: String,
    pub location: String,
    pub contact: Option<String>,
    pub user_id: Option<String>,
}

impl NewPharmacy {
    pub fn validate(&self) -> ValidationResult<()> {
        non_empty("name", &self.name)?;
        non_empty("location", &self.location)?;
        if let Some(user_id) = &self.user_id {
            validate_id("userId", user_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub user_id: Option<String>,
}

impl PharmacyUpdate {
    pub fn apply(self, pharmacy: &mut Pharmacy) -> ValidationResult<()> {
        if let Some(name) = self.name {
            non_empty("name", &name)?;
            pharmacy.name = name;
        }
        if let Some(location) = self.location {
            non_empty("location", &location)?;
            pharmacy.location = location;
        }
        if let Some(contact) = self.contact {
            pharmacy.contact = Some(contact);
        }
        if let Some(user_id) = self.user_id {
            validate_id("userId", &user_id)?;
            pharmacy.user_id = Some(user_id);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Distributor {
    pub id: String,
    pub name: String,
    pub contact_number: Option<String>,
    pub email: String,
    pub user_id: Option<String>,
}

/// Create-distributor body. Required fields are optional here so a missing
/// field produces a "Missing required fields" message rather than a parse
/// error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDistributor {
    pub name: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub user_id: Option<String>,
}

impl NewDistributor {
    pub fn validate(&self) -> ValidationResult<()> {
        require_fields(&[("name", present(&self.name)), ("email", present(&self.email))])?;
        validate_email(self.email.as_deref().unwrap_or_default())?;
        if let Some(user_id) = &self.user_id {
            validate_id("userId", user_id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorUpdate {
    pub name: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub user_id: Option<String>,
}

impl DistributorUpdate {
    pub fn apply(self, distributor: &mut Distributor) -> ValidationResult<()> {
        if let Some(name) = self.name {
            non_empty("name", &name)?;
            distributor.name = name;
        }
        if let Some(contact_number) = self.contact_number {
            distributor.contact_number = Some(contact_number);
        }
        if let Some(email) = self.email {
            validate_email(&email)?;
            distributor.email = email;
        }
        if let Some(user_id) = self.user_id {
            validate_id("userId", &user_id)?;
            distributor.user_id = Some(user_id);
        }
        Ok(())
    }
}
