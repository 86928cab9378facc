//! Prescriptions, prescription lines and fill history.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{
    new_id, now_timestamp, NewPrescription, NewPrescriptionMedicine, Prescription,
    PrescriptionDetail, PrescriptionFill, PrescriptionMedicine, PrescriptionStatus,
    PrescriptionUpdate,
};

const PRESCRIPTION_COLUMNS: &str = "id, doctor_id, patient_id, status, created_at, notes";
const LINE_COLUMNS: &str =
    "id, prescription_id, medicine_id, dosage, frequency, duration, quantity_prescribed";
const FILL_COLUMNS: &str =
    "id, pharmacy_id, prescription_medicine_id, quantity_dispensed, dispensed_at";

fn prescription_from_row(row: &Row<'_>) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient_id: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
        notes: row.get(5)?,
    })
}

fn line_from_row(row: &Row<'_>) -> rusqlite::Result<PrescriptionMedicine> {
    Ok(PrescriptionMedicine {
        id: row.get(0)?,
        prescription_id: row.get(1)?,
        medicine_id: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        duration: row.get(5)?,
        quantity_prescribed: row.get(6)?,
    })
}

fn fill_from_row(row: &Row<'_>) -> rusqlite::Result<PrescriptionFill> {
    Ok(PrescriptionFill {
        id: row.get(0)?,
        pharmacy_id: row.get(1)?,
        prescription_medicine_id: row.get(2)?,
        quantity_dispensed: row.get(3)?,
        dispensed_at: row.get(4)?,
    })
}

pub(crate) fn fetch_prescription(conn: &Connection, id: &str) -> rusqlite::Result<Option<Prescription>> {
    conn.query_row(
        &format!("SELECT {} FROM prescriptions WHERE id = ?", PRESCRIPTION_COLUMNS),
        [id],
        prescription_from_row,
    )
    .optional()
}

pub(crate) fn fetch_line(conn: &Connection, id: &str) -> rusqlite::Result<Option<PrescriptionMedicine>> {
    conn.query_row(
        &format!("SELECT {} FROM prescription_medicines WHERE id = ?", LINE_COLUMNS),
        [id],
        line_from_row,
    )
    .optional()
}

pub(crate) fn fetch_lines(conn: &Connection, prescription_id: &str) -> rusqlite::Result<Vec<PrescriptionMedicine>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM prescription_medicines WHERE prescription_id = ? ORDER BY rowid",
        LINE_COLUMNS
    ))?;
    let rows = stmt.query_map([prescription_id], line_from_row)?;
    rows.collect()
}

/// Total quantity already dispensed against a line.
pub(crate) fn dispensed_total(conn: &Connection, prescription_medicine_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(quantity_dispensed), 0) FROM prescription_fills WHERE prescription_medicine_id = ?",
        [prescription_medicine_id],
        |row| row.get(0),
    )
}

pub(crate) fn set_prescription_status(
    conn: &Connection,
    id: &str,
    status: PrescriptionStatus,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE prescriptions SET status = ?2 WHERE id = ?1",
        params![id, status],
    )?;
    Ok(())
}

fn insert_line(
    conn: &Connection,
    prescription_id: &str,
    input: &NewPrescriptionMedicine,
) -> rusqlite::Result<PrescriptionMedicine> {
    let line = PrescriptionMedicine {
        id: new_id(),
        prescription_id: prescription_id.to_string(),
        medicine_id: input.medicine_id.clone(),
        dosage: input.dosage.clone(),
        frequency: input.frequency.clone(),
        duration: input.duration,
        quantity_prescribed: input.quantity_prescribed,
    };
    conn.execute(
        r#"
        INSERT INTO prescription_medicines (
            id, prescription_id, medicine_id, dosage, frequency, duration, quantity_prescribed
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            line.id,
            line.prescription_id,
            line.medicine_id,
            line.dosage,
            line.frequency,
            line.duration,
            line.quantity_prescribed,
        ],
    )?;
    Ok(line)
}

pub(crate) fn insert_fill(conn: &Connection, fill: &PrescriptionFill) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO prescription_fills (
            id, pharmacy_id, prescription_medicine_id, quantity_dispensed, dispensed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            fill.id,
            fill.pharmacy_id,
            fill.prescription_medicine_id,
            fill.quantity_dispensed,
            fill.dispensed_at,
        ],
    )?;
    Ok(())
}

impl Database {
    // =========================================================================
    // Prescriptions
    // =========================================================================

    /// Insert a prescription and its lines atomically.
    pub fn create_prescription(&mut self, input: &NewPrescription) -> DbResult<PrescriptionDetail> {
        input.validate()?;
        let prescription = Prescription {
            id: new_id(),
            doctor_id: input.doctor_id.clone(),
            patient_id: input.patient_id.clone(),
            status: input.status.unwrap_or_default(),
            created_at: now_timestamp(),
            notes: input.notes.clone(),
        };

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO prescriptions (id, doctor_id, patient_id, status, created_at, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                prescription.id,
                prescription.doctor_id,
                prescription.patient_id,
                prescription.status,
                prescription.created_at,
                prescription.notes,
            ],
        )?;
        let medicines = input
            .medicines
            .iter()
            .map(|line| insert_line(&tx, &prescription.id, line))
            .collect::<Result<Vec<_>, _>>()?;
        tx.commit()?;

        Ok(PrescriptionDetail {
            prescription,
            medicines,
        })
    }

    /// List prescriptions, newest first.
    pub fn list_prescriptions(&self) -> DbResult<Vec<Prescription>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM prescriptions ORDER BY created_at DESC, rowid DESC",
            PRESCRIPTION_COLUMNS
        ))?;
        let rows = stmt.query_map([], prescription_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_prescription(&self, id: &str) -> DbResult<Option<Prescription>> {
        Ok(fetch_prescription(&self.conn, id)?)
    }

    /// Prescription with its lines.
    pub fn get_prescription_detail(&self, id: &str) -> DbResult<Option<PrescriptionDetail>> {
        let Some(prescription) = fetch_prescription(&self.conn, id)? else {
            return Ok(None);
        };
        let medicines = fetch_lines(&self.conn, id)?;
        Ok(Some(PrescriptionDetail {
            prescription,
            medicines,
        }))
    }

    pub fn update_prescription(
        &self,
        id: &str,
        update: PrescriptionUpdate,
    ) -> DbResult<Option<Prescription>> {
        let Some(mut prescription) = fetch_prescription(&self.conn, id)? else {
            return Ok(None);
        };
        update.apply(&mut prescription)?;
        self.conn.execute(
            r#"
            UPDATE prescriptions SET
                doctor_id = ?2,
                patient_id = ?3,
                status = ?4,
                notes = ?5
            WHERE id = ?1
            "#,
            params![
                prescription.id,
                prescription.doctor_id,
                prescription.patient_id,
                prescription.status,
                prescription.notes,
            ],
        )?;
        Ok(Some(prescription))
    }

    /// Delete a prescription; its lines and fills cascade.
    pub fn delete_prescription(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM prescriptions WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    // =========================================================================
    // Prescription lines
    // =========================================================================

    /// Lines of a prescription, or `None` if the prescription is missing.
    pub fn list_prescription_medicines(
        &self,
        prescription_id: &str,
    ) -> DbResult<Option<Vec<PrescriptionMedicine>>> {
        if fetch_prescription(&self.conn, prescription_id)?.is_none() {
            return Ok(None);
        }
        Ok(Some(fetch_lines(&self.conn, prescription_id)?))
    }

    pub fn get_prescription_medicine(&self, id: &str) -> DbResult<Option<PrescriptionMedicine>> {
        Ok(fetch_line(&self.conn, id)?)
    }

    pub fn add_prescription_medicine(
        &self,
        prescription_id: &str,
        input: &NewPrescriptionMedicine,
    ) -> DbResult<PrescriptionMedicine> {
        input.validate()?;
        if fetch_prescription(&self.conn, prescription_id)?.is_none() {
            return Err(DbError::not_found("Prescription"));
        }
        Ok(insert_line(&self.conn, prescription_id, input)?)
    }

    /// Remove every line for `medicine_id` from a prescription. Returns the
    /// number of lines removed.
    pub fn remove_prescription_medicine(
        &self,
        prescription_id: &str,
        medicine_id: &str,
    ) -> DbResult<usize> {
        let rows_affected = self.conn.execute(
            "DELETE FROM prescription_medicines WHERE prescription_id = ?1 AND medicine_id = ?2",
            params![prescription_id, medicine_id],
        )?;
        Ok(rows_affected)
    }

    // =========================================================================
    // Fills
    // =========================================================================

    /// Fill history, most recent first.
    pub fn list_prescription_fills(&self) -> DbResult<Vec<PrescriptionFill>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM prescription_fills ORDER BY dispensed_at DESC, rowid DESC",
            FILL_COLUMNS
        ))?;
        let rows = stmt.query_map([], fill_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_prescription_fill(&self, id: &str) -> DbResult<Option<PrescriptionFill>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM prescription_fills WHERE id = ?", FILL_COLUMNS),
                [id],
                fill_from_row,
            )
            .optional()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MedicineType, NewDoctor, NewMedicine, NewPatient, NewUser};

    struct Fixture {
        db: Database,
        doctor_id: String,
        patient_id: String,
        medicine_id: String,
    }

    fn setup() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .create_user(&NewUser {
                name: Some("Dr. Alice".into()),
                email: Some("alice@medical.com".into()),
                password: Some("password123".into()),
                role: Some("DOCTOR".into()),
            })
            .unwrap();
        let doctor = db
            .create_doctor(&NewDoctor {
                user_id: user.id,
                specialization: Some("Palliative Care".into()),
            })
            .unwrap();
        let patient = db.create_patient(&NewPatient::default()).unwrap();
        let medicine = db
            .create_medicine(&NewMedicine {
                name: "Morphine".into(),
                manufacturer: None,
                medicine_type: MedicineType::Opioid,
                dosage: None,
            })
            .unwrap();
        Fixture {
            db,
            doctor_id: doctor.id,
            patient_id: patient.id,
            medicine_id: medicine.id,
        }
    }

    fn line(medicine_id: &str, quantity: i64) -> NewPrescriptionMedicine {
        NewPrescriptionMedicine {
            medicine_id: medicine_id.to_string(),
            dosage: "10mg".into(),
            frequency: "twice daily".into(),
            duration: 7,
            quantity_prescribed: quantity,
        }
    }

    #[test]
    fn test_create_with_lines() {
        let mut f = setup();
        let detail = f
            .db
            .create_prescription(&NewPrescription {
                doctor_id: f.doctor_id.clone(),
                patient_id: f.patient_id.clone(),
                status: None,
                notes: Some("Pain management".into()),
                medicines: vec![line(&f.medicine_id, 14)],
            })
            .unwrap();

        assert_eq!(detail.prescription.status, PrescriptionStatus::Active);
        assert_eq!(detail.medicines.len(), 1);

        let loaded = f
            .db
            .get_prescription_detail(&detail.prescription.id)
            .unwrap()
            .unwrap();
        assert_eq!(loaded, detail);
    }

    #[test]
    fn test_bad_line_rolls_back_prescription() {
        let mut f = setup();
        let missing_medicine = new_id();
        let err = f
            .db
            .create_prescription(&NewPrescription {
                doctor_id: f.doctor_id.clone(),
                patient_id: f.patient_id.clone(),
                status: None,
                notes: None,
                medicines: vec![line(&f.medicine_id, 14), line(&missing_medicine, 5)],
            })
            .unwrap_err();

        assert!(err.is_constraint_violation());
        assert!(f.db.list_prescriptions().unwrap().is_empty());
    }

    #[test]
    fn test_add_and_remove_lines() {
        let mut f = setup();
        let detail = f
            .db
            .create_prescription(&NewPrescription {
                doctor_id: f.doctor_id.clone(),
                patient_id: f.patient_id.clone(),
                status: None,
                notes: None,
                medicines: vec![],
            })
            .unwrap();
        let id = detail.prescription.id;

        f.db.add_prescription_medicine(&id, &line(&f.medicine_id, 10))
            .unwrap();
        assert_eq!(
            f.db.list_prescription_medicines(&id).unwrap().unwrap().len(),
            1
        );

        assert_eq!(
            f.db.remove_prescription_medicine(&id, &f.medicine_id).unwrap(),
            1
        );
        assert!(f.db.list_prescription_medicines(&id).unwrap().unwrap().is_empty());
        assert!(f.db.list_prescription_medicines(&new_id()).unwrap().is_none());
    }

    #[test]
    fn test_add_line_to_missing_prescription() {
        let f = setup();
        let err = f
            .db
            .add_prescription_medicine(&new_id(), &line(&f.medicine_id, 10))
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_update_status_and_notes() {
        let mut f = setup();
        let detail = f
            .db
            .create_prescription(&NewPrescription {
                doctor_id: f.doctor_id.clone(),
                patient_id: f.patient_id.clone(),
                status: None,
                notes: Some("before".into()),
                medicines: vec![],
            })
            .unwrap();

        let updated = f
            .db
            .update_prescription(
                &detail.prescription.id,
                PrescriptionUpdate {
                    status: Some(PrescriptionStatus::Cancelled),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PrescriptionStatus::Cancelled);
        assert_eq!(updated.notes.as_deref(), Some("before"));

        assert!(f.db.delete_prescription(&detail.prescription.id).unwrap());
        assert!(f.db.get_prescription(&detail.prescription.id).unwrap().is_none());
    }
}
