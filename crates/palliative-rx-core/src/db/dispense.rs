//! Dispensing against a prescription line.
//!
//! A fill decrements pharmacy stock and records the fill in a single
//! transaction. Stock is drawn from non-expired batches, earliest expiry
//! first. When the last outstanding line is fully dispensed the prescription
//! is marked completed.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::inventory::{fetch_batches, set_batch_quantity};
use super::prescriptions::{
    dispensed_total, fetch_line, fetch_lines, fetch_prescription, insert_fill,
    set_prescription_status,
};
use super::{Database, DbError, DbResult};
use crate::models::{new_id, timestamp, NewPrescriptionFill, PrescriptionFill, PrescriptionStatus};

impl Database {
    /// Dispense now.
    pub fn dispense(&mut self, input: &NewPrescriptionFill) -> DbResult<PrescriptionFill> {
        self.dispense_at(input, Utc::now())
    }

    /// Dispense as of `now`; batches expiring at or before `now` are skipped.
    pub fn dispense_at(
        &mut self,
        input: &NewPrescriptionFill,
        now: DateTime<Utc>,
    ) -> DbResult<PrescriptionFill> {
        let request = input.validate()?;
        let now = timestamp(now);

        let tx = self.conn.transaction()?;

        let line = fetch_line(&tx, &request.prescription_medicine_id)?
            .ok_or_else(|| DbError::not_found("Prescription medicine"))?;
        let prescription = fetch_prescription(&tx, &line.prescription_id)?
            .ok_or_else(|| DbError::not_found("Prescription"))?;
        if prescription.status != PrescriptionStatus::Active {
            return Err(DbError::rejected("Prescription is not active"));
        }

        let already_dispensed = dispensed_total(&tx, &line.id)?;
        match already_dispensed.checked_add(request.quantity) {
            Some(total) if total <= line.quantity_prescribed => {}
            _ => {
                return Err(DbError::rejected(
                    "Quantity dispensed exceeds prescribed quantity",
                ))
            }
        }

        let batches: Vec<_> = fetch_batches(&tx, &request.pharmacy_id, &line.medicine_id)?
            .into_iter()
            .filter(|batch| batch.expiry_date > now && batch.quantity > 0)
            .collect();
        let available = batches
            .iter()
            .try_fold(0i64, |sum, batch| sum.checked_add(batch.quantity))
            .unwrap_or(i64::MAX);
        if available < request.quantity {
            return Err(DbError::rejected("Insufficient stock in pharmacy inventory"));
        }

        let mut remaining = request.quantity;
        for batch in &batches {
            if remaining == 0 {
                break;
            }
            let taken = remaining.min(batch.quantity);
            set_batch_quantity(&tx, &batch.id, batch.quantity - taken, &now)?;
            debug!(batch = %batch.batch_number, taken, "Drew stock from batch");
            remaining -= taken;
        }

        let fill = PrescriptionFill {
            id: new_id(),
            pharmacy_id: request.pharmacy_id,
            prescription_medicine_id: line.id,
            quantity_dispensed: request.quantity,
            dispensed_at: now,
        };
        insert_fill(&tx, &fill)?;

        let mut fully_dispensed = true;
        for other in fetch_lines(&tx, &prescription.id)? {
            if dispensed_total(&tx, &other.id)? < other.quantity_prescribed {
                fully_dispensed = false;
                break;
            }
        }
        if fully_dispensed {
            set_prescription_status(&tx, &prescription.id, PrescriptionStatus::Completed)?;
            debug!(prescription = %prescription.id, "Prescription fully dispensed");
        }

        tx.commit()?;
        Ok(fill)
    }
}
