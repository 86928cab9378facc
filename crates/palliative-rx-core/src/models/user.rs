//! User accounts.

use serde::{Deserialize, Serialize};

use crate::validation::{
    non_empty, present, require_fields, validate_email, validate_password, ValidationResult,
};

text_enum! {
    /// Account role.
    Role ("role") {
        Admin => "ADMIN",
        Doctor => "DOCTOR",
        Pharmacist => "PHARMACIST",
        Patient => "PATIENT",
        Distributor => "DISTRIBUTOR",
    }
}

/// A user account. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: String,
}

impl User {
    /// Check a plaintext password against the stored bcrypt hash.
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// Create-user request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Fully validated create-user fields.
#[derive(Debug, Clone)]
pub struct ValidUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    pub fn validate(&self) -> ValidationResult<ValidUser> {
        require_fields(&[
            ("name", present(&self.name)),
            ("email", present(&self.email)),
            ("password", present(&self.password)),
            ("role", present(&self.role)),
        ])?;
        let name = self.name.clone().unwrap_or_default();
        let email = self.email.clone().unwrap_or_default();
        let password = self.password.clone().unwrap_or_default();
        let role = self.role.as_deref().unwrap_or_default().parse::<Role>()?;

        validate_email(&email)?;
        validate_password(&password)?;

        Ok(ValidUser {
            name,
            email,
            password,
            role,
        })
    }
}

/// Partial user update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl UserUpdate {
    /// Validate supplied fields; returns the parsed role if one was given.
    pub fn validate(&self) -> ValidationResult<Option<Role>> {
        if let Some(name) = &self.name {
            non_empty("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        self.role.as_deref().map(str::parse::<Role>).transpose()
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
