//! Restock order lifecycle integration tests.

use chrono::{DateTime, TimeZone, Utc};
use palliative_rx_core::db::{Database, DbError};
use palliative_rx_core::models::{
    MedicineType, NewDistributor, NewInventoryItem, NewMedicine, NewPharmacy, NewRestockOrder,
    NewUser, NotificationFilter, NotificationType, RestockOrder, RestockOrderStatus,
    RestockOrderUpdate,
};

struct Supply {
    db: Database,
    pharmacy_id: String,
    pharmacist_id: String,
    distributor_id: String,
    medicine_id: String,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
}

fn supply() -> Supply {
    let db = Database::open_in_memory().unwrap();
    let pharmacist = db
        .create_user(&NewUser {
            name: Some("Bob Pharmacist".into()),
            email: Some("bob@pharmacy.com".into()),
            password: Some("password123".into()),
            role: Some("PHARMACIST".into()),
        })
        .unwrap();
    let pharmacy = db
        .create_pharmacy(&NewPharmacy {
            name: "City Pharmacy".into(),
            location: "Downtown".into(),
            contact: None,
            user_id: Some(pharmacist.id.clone()),
        })
        .unwrap();
    let distributor = db
        .create_distributor(&NewDistributor {
            name: Some("Medi-Supply Inc.".into()),
            contact_number: None,
            email: Some("contact@medisupply.com".into()),
            user_id: None,
        })
        .unwrap();
    let medicine = db
        .create_medicine(&NewMedicine {
            name: "Fentanyl".into(),
            manufacturer: None,
            medicine_type: MedicineType::Opioid,
            dosage: Some("50mcg".into()),
        })
        .unwrap();
    Supply {
        db,
        pharmacy_id: pharmacy.id,
        pharmacist_id: pharmacist.id,
        distributor_id: distributor.id,
        medicine_id: medicine.id,
    }
}

fn order(s: &Supply, quantity: i64) -> RestockOrder {
    s.db.create_restock_order(&NewRestockOrder {
        pharmacy_id: s.pharmacy_id.clone(),
        distributor_id: s.distributor_id.clone(),
        medicine_id: s.medicine_id.clone(),
        quantity_ordered: quantity,
    })
    .unwrap()
}

fn stock(s: &Supply, batch: &str, quantity: i64, expiry: &str) {
    s.db.add_inventory(
        &s.pharmacy_id,
        &NewInventoryItem {
            medicine_id: s.medicine_id.clone(),
            batch_number: batch.into(),
            quantity,
            expiry_date: expiry.into(),
            low_stock_threshold: Some(5),
        },
    )
    .unwrap();
}

fn set_status(s: &mut Supply, id: &str, status: RestockOrderStatus) -> Result<RestockOrder, DbError> {
    s.db.update_restock_order_at(
        id,
        RestockOrderUpdate {
            status: Some(status),
            ..Default::default()
        },
        now(),
    )
    .map(|order| order.unwrap())
}

fn notifications(s: &Supply) -> Vec<NotificationType> {
    s.db.list_notifications(&NotificationFilter {
        user_id: Some(s.pharmacist_id.clone()),
        unread: false,
    })
    .unwrap()
    .into_iter()
    .map(|n| n.notification_type)
    .collect()
}

#[test]
fn test_completion_credits_latest_expiry_batch() {
    let mut s = supply();
    stock(&s, "F-OLD", 2, "2026-08-01");
    stock(&s, "F-NEW", 3, "2027-06-30");
    let o = order(&s, 40);

    let done = set_status(&mut s, &o.id, RestockOrderStatus::Completed).unwrap();
    assert_eq!(done.status, RestockOrderStatus::Completed);
    assert_eq!(done.updated_at, "2026-06-01T09:00:00Z");

    let inventory = s.db.list_inventory(&s.pharmacy_id).unwrap();
    let by_batch: Vec<_> = inventory
        .iter()
        .map(|i| (i.batch_number.as_str(), i.quantity))
        .collect();
    assert_eq!(by_batch, vec![("F-OLD", 2), ("F-NEW", 43)]);
    assert_eq!(notifications(&s), vec![NotificationType::OrderCompleted]);
}

#[test]
fn test_completion_that_would_overflow_batch_is_rejected() {
    let mut s = supply();
    stock(&s, "F-FULL", i64::MAX - 1, "2027-06-30");
    let o = order(&s, 5);

    let err = set_status(&mut s, &o.id, RestockOrderStatus::Completed).unwrap_err();
    assert!(matches!(err, DbError::Rejected(_)));
    assert_eq!(err.to_string(), "Restocked quantity exceeds inventory capacity");

    let unchanged = s.db.get_restock_order(&o.id).unwrap().unwrap();
    assert_eq!(unchanged.status, RestockOrderStatus::Pending);
    let inventory = s.db.list_inventory(&s.pharmacy_id).unwrap();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory[0].quantity, i64::MAX - 1);
    assert!(notifications(&s).is_empty());
}

#[test]
fn test_completion_without_stock_creates_batch() {
    let mut s = supply();
    let o = order(&s, 25);

    set_status(&mut s, &o.id, RestockOrderStatus::Completed).unwrap();

    let inventory = s.db.list_inventory(&s.pharmacy_id).unwrap();
    assert_eq!(inventory.len(), 1);
    let batch = &inventory[0];
    assert_eq!(batch.batch_number, format!("RESTOCK-{}", &o.id[..8]));
    assert_eq!(batch.quantity, 25);
    assert_eq!(batch.expiry_date, "2027-06-01T09:00:00Z");
    assert_eq!(batch.low_stock_threshold, 10);
}

#[test]
fn test_completion_with_named_batch() {
    let mut s = supply();
    stock(&s, "F456", 4, "2027-06-30");
    let o = order(&s, 10);

    s.db.update_restock_order_at(
        &o.id,
        RestockOrderUpdate {
            status: Some(RestockOrderStatus::Completed),
            batch_number: Some("F999".into()),
            expiry_date: Some("2028-03-31".into()),
            ..Default::default()
        },
        now(),
    )
    .unwrap();

    let inventory = s.db.list_inventory(&s.pharmacy_id).unwrap();
    let by_batch: Vec<_> = inventory
        .iter()
        .map(|i| (i.batch_number.as_str(), i.quantity, i.expiry_date.as_str()))
        .collect();
    assert_eq!(
        by_batch,
        vec![
            ("F456", 4, "2027-06-30T00:00:00Z"),
            ("F999", 10, "2028-03-31T00:00:00Z"),
        ]
    );

    // A second order into the same named batch adds to it.
    let o2 = order(&s, 5);
    s.db.update_restock_order_at(
        &o2.id,
        RestockOrderUpdate {
            status: Some(RestockOrderStatus::Completed),
            batch_number: Some("F999".into()),
            ..Default::default()
        },
        now(),
    )
    .unwrap();
    let f999 = s
        .db
        .list_inventory(&s.pharmacy_id)
        .unwrap()
        .into_iter()
        .find(|i| i.batch_number == "F999")
        .unwrap();
    assert_eq!(f999.quantity, 15);
}

#[test]
fn test_ship_then_complete_notifies_twice_and_credits_once() {
    let mut s = supply();
    stock(&s, "F456", 1, "2027-06-30");
    let o = order(&s, 10);

    set_status(&mut s, &o.id, RestockOrderStatus::Shipped).unwrap();
    set_status(&mut s, &o.id, RestockOrderStatus::Completed).unwrap();
    // Re-applying the same status changes nothing.
    set_status(&mut s, &o.id, RestockOrderStatus::Completed).unwrap();

    let inventory = s.db.list_inventory(&s.pharmacy_id).unwrap();
    assert_eq!(inventory[0].quantity, 11);

    let mut kinds = notifications(&s);
    kinds.sort_by_key(|k| k.as_str());
    assert_eq!(
        kinds,
        vec![NotificationType::OrderCompleted, NotificationType::OrderShipped]
    );
}

#[test]
fn test_terminal_orders_reject_changes() {
    let mut s = supply();
    let o = order(&s, 10);
    set_status(&mut s, &o.id, RestockOrderStatus::Cancelled).unwrap();

    let err = set_status(&mut s, &o.id, RestockOrderStatus::Completed).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
    assert_eq!(
        err.to_string(),
        "Cannot change restock order status from CANCELLED to COMPLETED"
    );
    assert!(s.db.list_inventory(&s.pharmacy_id).unwrap().is_empty());
}

#[test]
fn test_shipped_order_cannot_go_back_to_pending() {
    let mut s = supply();
    let o = order(&s, 10);
    set_status(&mut s, &o.id, RestockOrderStatus::Shipped).unwrap();
    assert!(set_status(&mut s, &o.id, RestockOrderStatus::Pending).is_err());
}

#[test]
fn test_missing_order_is_none() {
    let mut s = supply();
    let result = s
        .db
        .update_restock_order_at(
            &uuid::Uuid::new_v4().to_string(),
            RestockOrderUpdate::default(),
            now(),
        )
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_pharmacy_without_user_gets_no_notification() {
    let mut s = supply();
    s.db.delete_user(&s.pharmacist_id).unwrap();
    let pharmacy = s.db.get_pharmacy(&s.pharmacy_id).unwrap().unwrap();
    assert!(pharmacy.user_id.is_none());

    let o = order(&s, 10);
    set_status(&mut s, &o.id, RestockOrderStatus::Completed).unwrap();
    let all = s
        .db
        .list_notifications(&NotificationFilter::default())
        .unwrap();
    assert!(all.is_empty());
}
