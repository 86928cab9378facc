//! Inventory monitor.
//!
//! One pass looks at every inventory batch and:
//!
//! - places a restock order with the default distributor for batches at or
//!   below their low-stock threshold, unless an open order already exists
//! - warns the pharmacy about batches that still hold stock and expire
//!   within the warning window
//!
//! A pass runs inside one transaction.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::db::inventory::inventory_from_row;
use crate::db::notifications::{has_unread_duplicate, insert_notification};
use crate::db::profiles::fetch_default_distributor;
use crate::db::restock::{has_open_order, insert_order};
use crate::db::{Database, DbResult};
use crate::models::{
    timestamp, InventoryItem, NewNotification, NewRestockOrder, NotificationType,
    DEFAULT_LOW_STOCK_THRESHOLD,
};

/// Default look-ahead for expiry warnings.
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 7;

/// Monitor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSettings {
    /// Warn about batches expiring within this many days
    pub expiry_warning_days: i64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
        }
    }
}

/// Outcome of one monitor pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub rows_scanned: usize,
    pub orders_created: usize,
    pub notifications_created: usize,
}

/// An inventory batch with what the monitor needs to act on it.
struct ScannedBatch {
    item: InventoryItem,
    medicine_name: String,
    pharmacy_user_id: Option<String>,
}

fn scanned_from_row(row: &Row<'_>) -> rusqlite::Result<ScannedBatch> {
    Ok(ScannedBatch {
        item: inventory_from_row(row)?,
        medicine_name: row.get(8)?,
        pharmacy_user_id: row.get(9)?,
    })
}

const SCAN_QUERY: &str = r#"
    SELECT i.id, i.pharmacy_id, i.medicine_id, i.batch_number, i.quantity,
           i.expiry_date, i.low_stock_threshold, i.last_updated,
           m.name, p.user_id
    FROM inventory i
    JOIN medicines m ON m.id = i.medicine_id
    JOIN pharmacies p ON p.id = i.pharmacy_id
    ORDER BY i.pharmacy_id, i.medicine_id, i.expiry_date
"#;

/// Quantity to order for a batch that ran low.
pub fn reorder_quantity(low_stock_threshold: i64) -> i64 {
    if low_stock_threshold > 0 {
        low_stock_threshold * 2
    } else {
        DEFAULT_LOW_STOCK_THRESHOLD * 2
    }
}

/// Text of the expiry warning for a batch.
pub fn expiry_warning_message(medicine: &str, batch: &InventoryItem) -> String {
    let date = batch.expiry_date.get(..10).unwrap_or(&batch.expiry_date);
    format!(
        "Warning: {} (Batch: {}) at your pharmacy will expire on {}. Current stock: {}.",
        medicine, batch.batch_number, date, batch.quantity
    )
}

/// Periodic low-stock and expiry checker.
#[derive(Debug, Clone, Default)]
pub struct InventoryMonitor {
    settings: MonitorSettings,
}

impl InventoryMonitor {
    pub fn new(settings: MonitorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Run one pass now.
    pub fn run(&self, db: &mut Database) -> DbResult<ScanReport> {
        self.run_at(db, Utc::now())
    }

    /// Run one pass as of `now`.
    pub fn run_at(&self, db: &mut Database, now: DateTime<Utc>) -> DbResult<ScanReport> {
        let now_str = timestamp(now);
        let expiry_cutoff = timestamp(now + Duration::days(self.settings.expiry_warning_days));

        let tx = db.transaction()?;
        let batches = {
            let mut stmt = tx.prepare(SCAN_QUERY)?;
            let rows = stmt.query_map([], scanned_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let mut report = ScanReport {
            rows_scanned: batches.len(),
            ..Default::default()
        };
        let mut ordered: HashSet<(String, String)> = HashSet::new();
        let distributor = fetch_default_distributor(&tx)?;

        for batch in &batches {
            let item = &batch.item;

            if item.is_low_stock() {
                let key = (item.pharmacy_id.clone(), item.medicine_id.clone());
                if !ordered.contains(&key) && !has_open_order(&tx, &key.0, &key.1)? {
                    match &distributor {
                        None => warn!(
                            medicine = %batch.medicine_name,
                            "Low stock but no distributor available for restocking"
                        ),
                        Some(distributor) => {
                            let order = insert_order(
                                &tx,
                                &NewRestockOrder {
                                    pharmacy_id: item.pharmacy_id.clone(),
                                    distributor_id: distributor.id.clone(),
                                    medicine_id: item.medicine_id.clone(),
                                    quantity_ordered: reorder_quantity(item.low_stock_threshold),
                                },
                                &now_str,
                            )?;
                            report.orders_created += 1;
                            info!(
                                medicine = %batch.medicine_name,
                                batch = %item.batch_number,
                                quantity = order.quantity_ordered,
                                distributor = %distributor.name,
                                "Placed restock order"
                            );

                            if let Some(user_id) = &batch.pharmacy_user_id {
                                let message = format!(
                                    "Low stock for {}. A restock order has been placed.",
                                    batch.medicine_name
                                );
                                insert_notification(
                                    &tx,
                                    &NewNotification::new(user_id, NotificationType::LowStock, message),
                                )?;
                                report.notifications_created += 1;
                            }
                        }
                    }
                    ordered.insert(key);
                }
            }

            if item.quantity > 0 && item.expiry_date < expiry_cutoff {
                let Some(user_id) = &batch.pharmacy_user_id else {
                    continue;
                };
                let message = expiry_warning_message(&batch.medicine_name, item);
                if has_unread_duplicate(&tx, user_id, NotificationType::ExpiryWarning, &message)? {
                    debug!(batch = %item.batch_number, "Expiry warning already pending");
                    continue;
                }
                insert_notification(
                    &tx,
                    &NewNotification::new(user_id, NotificationType::ExpiryWarning, message),
                )?;
                report.notifications_created += 1;
            }
        }

        tx.commit()?;
        info!(
            rows = report.rows_scanned,
            orders = report.orders_created,
            notifications = report.notifications_created,
            "Inventory scan complete"
        );
        Ok(report)
    }
}
