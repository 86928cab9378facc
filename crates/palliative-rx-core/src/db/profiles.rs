//! Doctor, patient, pharmacy and distributor profile operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{
    new_id, Distributor, DistributorUpdate, Doctor, DoctorUpdate, NewDistributor, NewDoctor,
    NewPatient, NewPharmacy, Patient, PatientUpdate, Pharmacy, PharmacyUpdate,
};

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        user_id: row.get(1)?,
        specialization: row.get(2)?,
    })
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        user_id: row.get(1)?,
        contact_number: row.get(2)?,
        address: row.get(3)?,
    })
}

fn pharmacy_from_row(row: &Row<'_>) -> rusqlite::Result<Pharmacy> {
    Ok(Pharmacy {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        contact: row.get(3)?,
        user_id: row.get(4)?,
    })
}

fn distributor_from_row(row: &Row<'_>) -> rusqlite::Result<Distributor> {
    Ok(Distributor {
        id: row.get(0)?,
        name: row.get(1)?,
        contact_number: row.get(2)?,
        email: row.get(3)?,
        user_id: row.get(4)?,
    })
}

pub(crate) fn fetch_pharmacy(conn: &Connection, id: &str) -> rusqlite::Result<Option<Pharmacy>> {
    conn.query_row(
        "SELECT id, name, location, contact, user_id FROM pharmacies WHERE id = ?",
        [id],
        pharmacy_from_row,
    )
    .optional()
}

/// Default supplier for automatic restock orders: first distributor by name.
pub(crate) fn fetch_default_distributor(conn: &Connection) -> rusqlite::Result<Option<Distributor>> {
    conn.query_row(
        "SELECT id, name, contact_number, email, user_id FROM distributors ORDER BY name, id LIMIT 1",
        [],
        distributor_from_row,
    )
    .optional()
}

impl Database {
    // =========================================================================
    // Doctors
    // =========================================================================

    pub fn create_doctor(&self, input: &NewDoctor) -> DbResult<Doctor> {
        input.validate()?;
        let doctor = Doctor {
            id: new_id(),
            user_id: input.user_id.clone(),
            specialization: input.specialization.clone(),
        };
        self.conn.execute(
            "INSERT INTO doctors (id, user_id, specialization) VALUES (?1, ?2, ?3)",
            params![doctor.id, doctor.user_id, doctor.specialization],
        )?;
        Ok(doctor)
    }

    pub fn list_doctors(&self) -> DbResult<Vec<Doctor>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, specialization FROM doctors ORDER BY id")?;
        let rows = stmt.query_map([], doctor_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_doctor(&self, id: &str) -> DbResult<Option<Doctor>> {
        self.conn
            .query_row(
                "SELECT id, user_id, specialization FROM doctors WHERE id = ?",
                [id],
                doctor_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn update_doctor(&self, id: &str, update: DoctorUpdate) -> DbResult<Option<Doctor>> {
        let Some(mut doctor) = self.get_doctor(id)? else {
            return Ok(None);
        };
        update.apply(&mut doctor)?;
        self.conn.execute(
            "UPDATE doctors SET user_id = ?2, specialization = ?3 WHERE id = ?1",
            params![doctor.id, doctor.user_id, doctor.specialization],
        )?;
        Ok(Some(doctor))
    }

    pub fn delete_doctor(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM doctors WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    // =========================================================================
    // Patients
    // =========================================================================

    pub fn create_patient(&self, input: &NewPatient) -> DbResult<Patient> {
        input.validate()?;
        let patient = Patient {
            id: new_id(),
            user_id: input.user_id.clone(),
            contact_number: input.contact_number.clone(),
            address: input.address.clone(),
        };
        self.conn.execute(
            "INSERT INTO patients (id, user_id, contact_number, address) VALUES (?1, ?2, ?3, ?4)",
            params![
                patient.id,
                patient.user_id,
                patient.contact_number,
                patient.address
            ],
        )?;
        Ok(patient)
    }

    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, contact_number, address FROM patients ORDER BY id")?;
        let rows = stmt.query_map([], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                "SELECT id, user_id, contact_number, address FROM patients WHERE id = ?",
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn update_patient(&self, id: &str, update: PatientUpdate) -> DbResult<Option<Patient>> {
        let Some(mut patient) = self.get_patient(id)? else {
            return Ok(None);
        };
        update.apply(&mut patient)?;
        self.conn.execute(
            r#"
            UPDATE patients SET
                user_id = ?2,
                contact_number = ?3,
                address = ?4
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.user_id,
                patient.contact_number,
                patient.address
            ],
        )?;
        Ok(Some(patient))
    }

    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    // =========================================================================
    // Pharmacies
    // =========================================================================

    pub fn create_pharmacy(&self, input: &NewPharmacy) -> DbResult<Pharmacy> {
        input.validate()?;
        let pharmacy = Pharmacy {
            id: new_id(),
            name: input.name.clone(),
            location: input.location.clone(),
            contact: input.contact.clone(),
            user_id: input.user_id.clone(),
        };
        self.conn.execute(
            "INSERT INTO pharmacies (id, name, location, contact, user_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                pharmacy.id,
                pharmacy.name,
                pharmacy.location,
                pharmacy.contact,
                pharmacy.user_id
            ],
        )?;
        Ok(pharmacy)
    }

    pub fn list_pharmacies(&self) -> DbResult<Vec<Pharmacy>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, location, contact, user_id FROM pharmacies ORDER BY name")?;
        let rows = stmt.query_map([], pharmacy_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_pharmacy(&self, id: &str) -> DbResult<Option<Pharmacy>> {
        fetch_pharmacy(&self.conn, id).map_err(Into::into)
    }

    pub fn update_pharmacy(&self, id: &str, update: PharmacyUpdate) -> DbResult<Option<Pharmacy>> {
        let Some(mut pharmacy) = self.get_pharmacy(id)? else {
            return Ok(None);
        };
        update.apply(&mut pharmacy)?;
        self.conn.execute(
            r#"
            UPDATE pharmacies SET
                name = ?2,
                location = ?3,
                contact = ?4,
                user_id = ?5
            WHERE id = ?1
            "#,
            params![
                pharmacy.id,
                pharmacy.name,
                pharmacy.location,
                pharmacy.contact,
                pharmacy.user_id
            ],
        )?;
        Ok(Some(pharmacy))
    }

    /// Delete a pharmacy together with its inventory, fills and orders.
    pub fn delete_pharmacy(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM pharmacies WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    // =========================================================================
    // Distributors
    // =========================================================================

    pub fn create_distributor(&self, input: &NewDistributor) -> DbResult<Distributor> {
        input.validate()?;
        let distributor = Distributor {
            id: new_id(),
            name: input.name.clone().unwrap_or_default(),
            contact_number: input.contact_number.clone(),
            email: input.email.clone().unwrap_or_default(),
            user_id: input.user_id.clone(),
        };
        self.conn.execute(
            r#"
            INSERT INTO distributors (id, name, contact_number, email, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                distributor.id,
                distributor.name,
                distributor.contact_number,
                distributor.email,
                distributor.user_id
            ],
        )?;
        Ok(distributor)
    }

    pub fn list_distributors(&self) -> DbResult<Vec<Distributor>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, contact_number, email, user_id FROM distributors ORDER BY name",
        )?;
        let rows = stmt.query_map([], distributor_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_distributor(&self, id: &str) -> DbResult<Option<Distributor>> {
        self.conn
            .query_row(
                "SELECT id, name, contact_number, email, user_id FROM distributors WHERE id = ?",
                [id],
                distributor_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn update_distributor(
        &self,
        id: &str,
        update: DistributorUpdate,
    ) -> DbResult<Option<Distributor>> {
        let Some(mut distributor) = self.get_distributor(id)? else {
            return Ok(None);
        };
        update.apply(&mut distributor)?;
        self.conn.execute(
            r#"
            UPDATE distributors SET
                name = ?2,
                contact_number = ?3,
                email = ?4,
                user_id = ?5
            WHERE id = ?1
            "#,
            params![
                distributor.id,
                distributor.name,
                distributor.contact_number,
                distributor.email,
                distributor.user_id
            ],
        )?;
        Ok(Some(distributor))
    }

    pub fn delete_distributor(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM distributors WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn user(db: &Database, email: &str, role: &str) -> String {
        db.create_user(&NewUser {
            name: Some("Someone".into()),
            email: Some(email.into()),
            password: Some("password123".into()),
            role: Some(role.into()),
        })
        .unwrap()
        .id
    }

    #[test]
    fn test_doctor_crud() {
        let db = setup_db();
        let user_id = user(&db, "alice@medical.com", "DOCTOR");

        let doctor = db
            .create_doctor(&NewDoctor {
                user_id: user_id.clone(),
                specialization: Some("Palliative Care".into()),
            })
            .unwrap();
        assert_eq!(db.list_doctors().unwrap().len(), 1);

        let updated = db
            .update_doctor(
                &doctor.id,
                DoctorUpdate {
                    specialization: Some("Oncology".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.specialization.as_deref(), Some("Oncology"));
        assert_eq!(updated.user_id, user_id);

        assert!(db.delete_doctor(&doctor.id).unwrap());
        assert!(db.get_doctor(&doctor.id).unwrap().is_none());
    }

    #[test]
    fn test_doctor_cascades_with_user() {
        let db = setup_db();
        let user_id = user(&db, "alice@medical.com", "DOCTOR");
        let doctor = db
            .create_doctor(&NewDoctor {
                user_id: user_id.clone(),
                specialization: None,
            })
            .unwrap();

        db.delete_user(&user_id).unwrap();
        assert!(db.get_doctor(&doctor.id).unwrap().is_none());
    }

    #[test]
    fn test_pharmacy_unlinked_when_user_deleted() {
        let db = setup_db();
        let user_id = user(&db, "bob@pharmacy.com", "PHARMACIST");
        let pharmacy = db
            .create_pharmacy(&NewPharmacy {
                name: "City Pharmacy".into(),
                location: "Downtown".into(),
                contact: None,
                user_id: Some(user_id.clone()),
            })
            .unwrap();

        db.delete_user(&user_id).unwrap();
        let pharmacy = db.get_pharmacy(&pharmacy.id).unwrap().unwrap();
        assert!(pharmacy.user_id.is_none());
    }

    #[test]
    fn test_default_distributor_is_first_by_name() {
        let db = setup_db();
        for (name, email) in [("Zeta Supply", "z@zeta.com"), ("Alpha Meds", "a@alpha.com")] {
            db.create_distributor(&NewDistributor {
                name: Some(name.into()),
                email: Some(email.into()),
                ..Default::default()
            })
            .unwrap();
        }
        let first = fetch_default_distributor(db.conn()).unwrap().unwrap();
        assert_eq!(first.name, "Alpha Meds");
    }

    #[test]
    fn test_patient_update_and_delete() {
        let db = setup_db();
        let patient = db
            .create_patient(&NewPatient {
                contact_number: Some("123-456-7890".into()),
                ..Default::default()
            })
            .unwrap();

        let updated = db
            .update_patient(
                &patient.id,
                PatientUpdate {
                    address: Some("123 Main St".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.contact_number.as_deref(), Some("123-456-7890"));
        assert_eq!(updated.address.as_deref(), Some("123 Main St"));
        assert!(db.delete_patient(&patient.id).unwrap());
    }
}
