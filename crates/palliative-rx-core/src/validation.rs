//! Field-level input validation shared by every create/update path.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::timestamp;

/// Minimum accepted password length (in characters).
pub const MIN_PASSWORD_LEN: usize = 6;

/// Input validation failures. Each maps to a 400 at the HTTP edge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid {0} format")]
    InvalidFormat(&'static str),

    #[error("{0}")]
    Invalid(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collect the names of absent required fields, erroring if any are missing.
pub fn require_fields(fields: &[(&'static str, bool)]) -> ValidationResult<()> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

/// True when an optional string is present and not blank.
pub fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Reject blank strings for a required text column.
pub fn non_empty(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// `local@domain.tld`: exactly one `@`, no whitespace, and a dot inside the
/// domain with text on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

pub fn validate_email(email: &str) -> ValidationResult<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat("email"))
    }
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::Invalid(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Ids are UUIDs; anything else is rejected before touching the database.
pub fn validate_id(field: &'static str, value: &str) -> ValidationResult<()> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidFormat(field))
}

pub fn validate_positive(field: &'static str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::Invalid(format!(
            "{} must be a positive number",
            field
        )));
    }
    Ok(())
}

pub fn validate_non_negative(field: &'static str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Invalid(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}

/// Normalize an RFC 3339 timestamp or a bare `YYYY-MM-DD` date to the
/// stored UTC form.
pub fn parse_timestamp(field: &'static str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp(dt.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(timestamp(dt.and_utc()));
        }
    }
    Err(ValidationError::InvalidFormat(field))
}
