//! Demo data for a fresh install.

use serde::Serialize;
use tracing::info;

use super::users::hash_password;
use super::{Database, DbResult};
use crate::models::{
    MedicineType, NewDistributor, NewDoctor, NewInventoryItem, NewMedicine, NewPatient,
    NewPharmacy, Role,
};

/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "password123";

/// Tables cleared before seeding, children first.
const SEEDED_TABLES: &[&str] = &[
    "adherence_logs",
    "notifications",
    "restock_orders",
    "prescription_fills",
    "prescription_medicines",
    "prescriptions",
    "inventory",
    "medicines",
    "distributors",
    "pharmacies",
    "patients",
    "doctors",
    "users",
];

/// Counts of what `seed` inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub users: usize,
    pub medicines: usize,
    pub inventory_items: usize,
}

impl Database {
    /// Replace all data with the demo data set.
    pub fn seed(&self) -> DbResult<SeedSummary> {
        let tx = self.conn.unchecked_transaction()?;
        for table in SEEDED_TABLES {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }

        let password_hash = hash_password(SEED_PASSWORD)?;
        let mut summary = SeedSummary::default();

        let mut user = |name: &str, email: &str, role: Role| {
            summary.users += 1;
            self.insert_user_with_hash(name, email, &password_hash, role)
        };
        let doctor_user = user("Dr. Alice", "alice@medical.com", Role::Doctor)?;
        let pharmacist_user = user("Bob Pharmacist", "bob@pharmacy.com", Role::Pharmacist)?;
        let patient_user = user("Charlie Patient", "charlie@patient.com", Role::Patient)?;
        let distributor_user = user("Diana Distributor", "diana@distro.com", Role::Distributor)?;
        user("Eve Admin", "eve@admin.com", Role::Admin)?;

        self.create_doctor(&NewDoctor {
            user_id: doctor_user.id,
            specialization: Some("Palliative Care".into()),
        })?;
        self.create_patient(&NewPatient {
            user_id: Some(patient_user.id),
            contact_number: Some("123-456-7890".into()),
            address: Some("123 Main St".into()),
        })?;
        let pharmacy = self.create_pharmacy(&NewPharmacy {
            name: "City Pharmacy".into(),
            location: "Downtown".into(),
            contact: Some("987-654-3210".into()),
            user_id: Some(pharmacist_user.id),
        })?;
        self.create_distributor(&NewDistributor {
            name: Some("Medi-Supply Inc.".into()),
            contact_number: Some("555-555-5555".into()),
            email: Some("contact@medisupply.com".into()),
            user_id: Some(distributor_user.id),
        })?;

        let stock = [
            ("Morphine", "Pharma Inc.", MedicineType::Opioid, "10mg", "M123", 50, "2026-12-31", 10),
            ("Fentanyl", "Pharma Inc.", MedicineType::Opioid, "50mcg", "F456", 20, "2027-06-30", 5),
            ("Ibuprofen", "Generic Co.", MedicineType::General, "200mg", "I789", 200, "2025-01-31", 50),
        ];
        for (name, manufacturer, medicine_type, dosage, batch, quantity, expiry, threshold) in stock {
            let medicine = self.create_medicine(&NewMedicine {
                name: name.into(),
                manufacturer: Some(manufacturer.into()),
                medicine_type,
                dosage: Some(dosage.into()),
            })?;
            summary.medicines += 1;

            self.add_inventory(
                &pharmacy.id,
                &NewInventoryItem {
                    medicine_id: medicine.id,
                    batch_number: batch.into(),
                    quantity,
                    expiry_date: expiry.into(),
                    low_stock_threshold: Some(threshold),
                },
            )?;
            summary.inventory_items += 1;
        }

        tx.commit()?;
        info!(
            users = summary.users,
            medicines = summary.medicines,
            inventory_items = summary.inventory_items,
            "Seeded database"
        );
        Ok(summary)
    }
}
