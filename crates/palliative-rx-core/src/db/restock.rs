//! Restock orders and the inventory credit applied when one completes.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::inventory::{fetch_batches, insert_batch, set_batch_quantity};
use super::medicines::fetch_medicine_name;
use super::notifications::insert_notification;
use super::profiles::fetch_pharmacy;
use super::{Database, DbError, DbResult};
use crate::models::{
    new_id, timestamp, InventoryItem, NewNotification, NewRestockOrder, NotificationType,
    ReceivedBatch, RestockOrder, RestockOrderStatus, RestockOrderUpdate,
    DEFAULT_LOW_STOCK_THRESHOLD,
};

/// Shelf life assumed for received stock when no expiry is supplied.
pub const DEFAULT_SHELF_LIFE_DAYS: i64 = 365;

const ORDER_COLUMNS: &str =
    "id, pharmacy_id, distributor_id, medicine_id, quantity_ordered, status, created_at, updated_at";

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<RestockOrder> {
    Ok(RestockOrder {
        id: row.get(0)?,
        pharmacy_id: row.get(1)?,
        distributor_id: row.get(2)?,
        medicine_id: row.get(3)?,
        quantity_ordered: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn fetch_order(conn: &Connection, id: &str) -> rusqlite::Result<Option<RestockOrder>> {
    conn.query_row(
        &format!("SELECT {} FROM restock_orders WHERE id = ?", ORDER_COLUMNS),
        [id],
        order_from_row,
    )
    .optional()
}

pub(crate) fn insert_order(
    conn: &Connection,
    input: &NewRestockOrder,
    now: &str,
) -> rusqlite::Result<RestockOrder> {
    let order = RestockOrder {
        id: new_id(),
        pharmacy_id: input.pharmacy_id.clone(),
        distributor_id: input.distributor_id.clone(),
        medicine_id: input.medicine_id.clone(),
        quantity_ordered: input.quantity_ordered,
        status: RestockOrderStatus::Pending,
        created_at: now.to_string(),
        updated_at: now.to_string(),
    };
    conn.execute(
        r#"
        INSERT INTO restock_orders (
            id, pharmacy_id, distributor_id, medicine_id,
            quantity_ordered, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            order.id,
            order.pharmacy_id,
            order.distributor_id,
            order.medicine_id,
            order.quantity_ordered,
            order.status,
            order.created_at,
            order.updated_at,
        ],
    )?;
    Ok(order)
}

/// Whether a pending or shipped order already covers this medicine at this
/// pharmacy.
pub(crate) fn has_open_order(
    conn: &Connection,
    pharmacy_id: &str,
    medicine_id: &str,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM restock_orders WHERE pharmacy_id = ?1 AND medicine_id = ?2 AND status IN (?3, ?4))",
        params![
            pharmacy_id,
            medicine_id,
            RestockOrderStatus::Pending,
            RestockOrderStatus::Shipped
        ],
        |row| row.get(0),
    )
}

/// Add received stock to the pharmacy's inventory. Returns the credited batch.
fn credit_inventory(
    conn: &Connection,
    order: &RestockOrder,
    received: &ReceivedBatch,
    now: DateTime<Utc>,
) -> DbResult<InventoryItem> {
    let now_str = timestamp(now);
    let default_expiry = timestamp(now + Duration::days(DEFAULT_SHELF_LIFE_DAYS));
    let batches = fetch_batches(conn, &order.pharmacy_id, &order.medicine_id)?;

    let existing = match &received.batch_number {
        Some(batch_number) => batches
            .into_iter()
            .find(|batch| &batch.batch_number == batch_number),
        // Latest expiry sorts last.
        None => batches.into_iter().last(),
    };

    if let Some(mut batch) = existing {
        batch.quantity = batch
            .quantity
            .checked_add(order.quantity_ordered)
            .ok_or_else(|| DbError::rejected("Restocked quantity exceeds inventory capacity"))?;
        batch.last_updated = now_str;
        set_batch_quantity(conn, &batch.id, batch.quantity, &batch.last_updated)?;
        return Ok(batch);
    }

    let batch_number = received.batch_number.clone().unwrap_or_else(|| {
        let prefix: String = order.id.chars().take(8).collect();
        format!("RESTOCK-{}", prefix)
    });
    let batch = InventoryItem {
        id: new_id(),
        pharmacy_id: order.pharmacy_id.clone(),
        medicine_id: order.medicine_id.clone(),
        batch_number,
        quantity: order.quantity_ordered,
        expiry_date: received.expiry_date.clone().unwrap_or(default_expiry),
        low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        last_updated: now_str,
    };
    insert_batch(conn, &batch)?;
    Ok(batch)
}

/// Notify the user behind the order's pharmacy, if the pharmacy has one.
fn notify_pharmacy(
    conn: &Connection,
    order: &RestockOrder,
    notification_type: NotificationType,
) -> rusqlite::Result<()> {
    let Some(user_id) = fetch_pharmacy(conn, &order.pharmacy_id)?.and_then(|p| p.user_id) else {
        return Ok(());
    };
    let medicine = fetch_medicine_name(conn, &order.medicine_id)?
        .unwrap_or_else(|| "medicine".to_string());
    let message = match notification_type {
        NotificationType::OrderShipped => format!(
            "Your restock order for {} ({} units) has been shipped.",
            medicine, order.quantity_ordered
        ),
        _ => format!(
            "Your restock order for {} ({} units) has been delivered and added to inventory.",
            medicine, order.quantity_ordered
        ),
    };
    insert_notification(conn, &NewNotification::new(user_id, notification_type, message))?;
    Ok(())
}

impl Database {
    pub fn create_restock_order(&self, input: &NewRestockOrder) -> DbResult<RestockOrder> {
        input.validate()?;
        Ok(insert_order(&self.conn, input, &timestamp(Utc::now()))?)
    }

    /// List restock orders, newest first.
    pub fn list_restock_orders(&self) -> DbResult<Vec<RestockOrder>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM restock_orders ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))?;
        let rows = stmt.query_map([], order_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_restock_order(&self, id: &str) -> DbResult<Option<RestockOrder>> {
        Ok(fetch_order(&self.conn, id)?)
    }

    /// Apply a status or quantity change now.
    pub fn update_restock_order(
        &mut self,
        id: &str,
        update: RestockOrderUpdate,
    ) -> DbResult<Option<RestockOrder>> {
        self.update_restock_order_at(id, update, Utc::now())
    }

    /// Apply a status or quantity change as of `now`. Completing an order
    /// credits inventory in the same transaction; shipping or completing it
    /// notifies the pharmacy.
    pub fn update_restock_order_at(
        &mut self,
        id: &str,
        update: RestockOrderUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<Option<RestockOrder>> {
        let tx = self.conn.transaction()?;
        let Some(mut order) = fetch_order(&tx, id)? else {
            return Ok(None);
        };
        let received = update.validate(&order)?;
        let previous = order.status;

        if let Some(status) = update.status {
            order.status = status;
        }
        if let Some(quantity) = update.quantity_ordered {
            order.quantity_ordered = quantity;
        }
        order.updated_at = timestamp(now);

        tx.execute(
            "UPDATE restock_orders SET quantity_ordered = ?2, status = ?3, updated_at = ?4 WHERE id = ?1",
            params![order.id, order.quantity_ordered, order.status, order.updated_at],
        )?;

        if order.status != previous {
            match order.status {
                RestockOrderStatus::Completed => {
                    let batch = credit_inventory(&tx, &order, &received, now)?;
                    notify_pharmacy(&tx, &order, NotificationType::OrderCompleted)?;
                    info!(
                        order = %order.id,
                        batch = %batch.batch_number,
                        quantity = order.quantity_ordered,
                        "Restock order completed"
                    );
                }
                RestockOrderStatus::Shipped => {
                    notify_pharmacy(&tx, &order, NotificationType::OrderShipped)?;
                    debug!(order = %order.id, "Restock order shipped");
                }
                _ => {}
            }
        }

        tx.commit()?;
        Ok(Some(order))
    }

    pub fn delete_restock_order(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM restock_orders WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
