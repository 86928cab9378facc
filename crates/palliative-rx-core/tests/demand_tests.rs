//! Demand forecast integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use palliative_rx_core::db::Database;
use palliative_rx_core::models::{
    MedicineType, NewDoctor, NewInventoryItem, NewMedicine, NewPatient, NewPharmacy,
    NewPrescription, NewPrescriptionFill, NewPrescriptionMedicine, NewUser,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 30, 18, 0, 0).unwrap()
}

struct Store {
    db: Database,
    pharmacy_id: String,
    morphine_line: String,
    ibuprofen_line: String,
}

fn store() -> Store {
    let mut db = Database::open_in_memory().unwrap();
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
            specialization: None,
        })
        .unwrap();
    let patient = db.create_patient(&NewPatient::default()).unwrap();
    let pharmacy = db
        .create_pharmacy(&NewPharmacy {
            name: "City Pharmacy".into(),
            location: "Downtown".into(),
            contact: None,
            user_id: None,
        })
        .unwrap();

    let mut lines = Vec::new();
    for (name, medicine_type, quantity) in [
        ("Morphine", MedicineType::Opioid, 12),
        ("Ibuprofen", MedicineType::General, 500),
    ] {
        let medicine = db
            .create_medicine(&NewMedicine {
                name: name.into(),
                manufacturer: None,
                medicine_type,
                dosage: None,
            })
            .unwrap();
        db.add_inventory(
            &pharmacy.id,
            &NewInventoryItem {
                medicine_id: medicine.id.clone(),
                batch_number: format!("{}-1", name),
                quantity,
                expiry_date: "2027-12-31".into(),
                low_stock_threshold: Some(5),
            },
        )
        .unwrap();
        lines.push(NewPrescriptionMedicine {
            medicine_id: medicine.id,
            dosage: "1 unit".into(),
            frequency: "daily".into(),
            duration: 30,
            quantity_prescribed: 10_000,
        });
    }

    let detail = db
        .create_prescription(&NewPrescription {
            doctor_id: doctor.id,
            patient_id: patient.id,
            status: None,
            notes: None,
            medicines: lines,
        })
        .unwrap();

    Store {
        pharmacy_id: pharmacy.id,
        morphine_line: detail.medicines[0].id.clone(),
        ibuprofen_line: detail.medicines[1].id.clone(),
        db,
    }
}

fn dispense(s: &mut Store, line: &str, quantity: i64, days_ago: i64) {
    // Top up first so forecasts see fills, not stock failures.
    let request = NewPrescriptionFill {
        pharmacy_id: Some(s.pharmacy_id.clone()),
        prescription_medicine_id: Some(line.to_string()),
        quantity_dispensed: Some(quantity),
    };
    let inventory = s.db.list_inventory(&s.pharmacy_id).unwrap();
    let line_medicine = s.db.get_prescription_medicine(line).unwrap().unwrap().medicine_id;
    let batch = inventory.iter().find(|i| i.medicine_id == line_medicine).unwrap();
    s.db.conn()
        .execute(
            "UPDATE inventory SET quantity = quantity + ?2 WHERE id = ?1",
            rusqlite::params![batch.id, quantity],
        )
        .unwrap();
    s.db.dispense_at(&request, now() - Duration::days(days_ago)).unwrap();
}

#[test]
fn test_only_opioids_are_forecast() {
    let mut s = store();
    let ibuprofen = s.ibuprofen_line.clone();
    dispense(&mut s, &ibuprofen, 100, 1);

    let forecasts = s.db.demand_alerts_at(&s.pharmacy_id, now()).unwrap();
    assert_eq!(forecasts.len(), 1);
    assert_eq!(forecasts[0].medicine_name, "Morphine");
    assert_eq!(forecasts[0].predicted_demand, 0.0);
    assert_eq!(forecasts[0].current_stock, 12);
    assert!(forecasts[0].alert.is_none());
}

#[test]
fn test_rising_demand_raises_alert() {
    let mut s = store();
    let morphine = s.morphine_line.clone();
    dispense(&mut s, &morphine, 10, 3);
    dispense(&mut s, &morphine, 20, 2);
    dispense(&mut s, &morphine, 30, 1);

    let forecasts = s.db.demand_alerts_at(&s.pharmacy_id, now()).unwrap();
    let morphine = &forecasts[0];
    assert_eq!(morphine.history, vec![10, 20, 30]);
    assert!((morphine.predicted_demand - 40.0).abs() < 1e-9);
    assert_eq!(morphine.current_stock, 12);
    assert_eq!(morphine.threshold, 5);
    assert_eq!(
        morphine.alert.as_deref(),
        Some("Restock from distributor: predicted 40.0 > stock 12")
    );
}

#[test]
fn test_fills_outside_window_ignored() {
    let mut s = store();
    let morphine = s.morphine_line.clone();
    dispense(&mut s, &morphine, 50, 45);
    dispense(&mut s, &morphine, 50, 40);

    let forecasts = s.db.demand_alerts_at(&s.pharmacy_id, now()).unwrap();
    assert!(forecasts[0].history.is_empty());
    assert_eq!(forecasts[0].predicted_demand, 0.0);
}

#[test]
fn test_unknown_pharmacy() {
    let s = store();
    assert!(s
        .db
        .demand_alerts_at(&uuid::Uuid::new_v4().to_string(), now())
        .is_err());
}
