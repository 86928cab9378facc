//! Restock orders placed with distributors.

use serde::{Deserialize, Serialize};

use crate::validation::{
    non_empty, parse_timestamp, validate_id, validate_positive, ValidationError,
    ValidationResult,
};

text_enum! {
    /// Restock order lifecycle status.
    RestockOrderStatus ("restock order status") {
        Pending => "PENDING",
        Shipped => "SHIPPED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl Default for RestockOrderStatus {
    fn default() -> Self {
        RestockOrderStatus::Pending
    }
}

impl RestockOrderStatus {
    /// Completed and cancelled orders never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RestockOrderStatus::Completed | RestockOrderStatus::Cancelled)
    }

    /// Orders that still count as "on the way" for duplicate suppression.
    pub fn is_open(&self) -> bool {
        matches!(self, RestockOrderStatus::Pending | RestockOrderStatus::Shipped)
    }

    /// Whether moving from `self` to `next` is allowed. Re-applying the
    /// current status is a no-op and always allowed.
    pub fn can_transition_to(&self, next: RestockOrderStatus) -> bool {
        use RestockOrderStatus::*;
        if *self == next {
            return true;
        }
        match self {
            Pending => matches!(next, Shipped | Completed | Cancelled),
            Shipped => matches!(next, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestockOrder {
    pub id: String,
    pub pharmacy_id: String,
    pub distributor_id: String,
    pub medicine_id: String,
    pub quantity_ordered: i64,
    pub status: RestockOrderStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestockOrder {
    pub pharmacy_id: String,
    pub distributor_id: String,
    pub medicine_id: String,
    pub quantity_ordered: i64,
}

impl NewRestockOrder {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("pharmacyId", &self.pharmacy_id)?;
        validate_id("distributorId", &self.distributor_id)?;
        validate_id("medicineId", &self.medicine_id)?;
        validate_positive("quantityOrdered", self.quantity_ordered)
    }
}

/// Restock order update. `batch_number` and `expiry_date` only matter
/// when the update completes the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockOrderUpdate {
    pub status: Option<RestockOrderStatus>,
    pub quantity_ordered: Option<i64>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<String>,
}

/// How received stock should be booked into inventory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceivedBatch {
    pub batch_number: Option<String>,
    /// Normalized expiry timestamp
    pub expiry_date: Option<String>,
}

impl RestockOrderUpdate {
    /// Check the update against the order's current state.
    pub fn validate(&self, current: &RestockOrder) -> ValidationResult<ReceivedBatch> {
        if let Some(next) = self.status {
            if !current.status.can_transition_to(next) {
                return Err(ValidationError::Invalid(format!(
                    "Cannot change restock order status from {} to {}",
                    current.status, next
                )));
            }
        }
        if let Some(quantity) = self.quantity_ordered {
            validate_positive("quantityOrdered", quantity)?;
            if current.status != RestockOrderStatus::Pending
                && quantity != current.quantity_ordered
            {
                return Err(ValidationError::Invalid(
                    "Quantity can only change while the order is pending".into(),
                ));
            }
        }
        if let Some(batch_number) = &self.batch_number {
            non_empty("batchNumber", batch_number)?;
        }
        let expiry_date = self
            .expiry_date
            .as_deref()
            .map(|value| parse_timestamp("expiryDate", value))
            .transpose()?;
        Ok(ReceivedBatch {
            batch_number: self.batch_number.clone(),
            expiry_date,
        })
    }
}
