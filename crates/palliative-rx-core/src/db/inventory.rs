//! Per-pharmacy inventory batch operations.

use rusqlite::{params, Connection, Row};

use super::{Database, DbError, DbResult};
use crate::models::{
    new_id, now_timestamp, InventoryItem, InventoryUpdate, NewInventoryItem,
    DEFAULT_LOW_STOCK_THRESHOLD,
};

pub(crate) const INVENTORY_COLUMNS: &str = "id, pharmacy_id, medicine_id, batch_number, quantity, expiry_date, low_stock_threshold, last_updated";

pub(crate) fn inventory_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        pharmacy_id: row.get(1)?,
        medicine_id: row.get(2)?,
        batch_number: row.get(3)?,
        quantity: row.get(4)?,
        expiry_date: row.get(5)?,
        low_stock_threshold: row.get(6)?,
        last_updated: row.get(7)?,
    })
}

/// All batches of one medicine at one pharmacy, earliest expiry first.
pub(crate) fn fetch_batches(
    conn: &Connection,
    pharmacy_id: &str,
    medicine_id: &str,
) -> rusqlite::Result<Vec<InventoryItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM inventory WHERE pharmacy_id = ?1 AND medicine_id = ?2 ORDER BY expiry_date, batch_number",
        INVENTORY_COLUMNS
    ))?;
    let rows = stmt.query_map(params![pharmacy_id, medicine_id], inventory_from_row)?;
    rows.collect()
}

pub(crate) fn insert_batch(conn: &Connection, item: &InventoryItem) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO inventory (
            id, pharmacy_id, medicine_id, batch_number, quantity,
            expiry_date, low_stock_threshold, last_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            item.id,
            item.pharmacy_id,
            item.medicine_id,
            item.batch_number,
            item.quantity,
            item.expiry_date,
            item.low_stock_threshold,
            item.last_updated,
        ],
    )?;
    Ok(())
}

pub(crate) fn set_batch_quantity(
    conn: &Connection,
    id: &str,
    quantity: i64,
    now: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE inventory SET quantity = ?2, last_updated = ?3 WHERE id = ?1",
        params![id, quantity, now],
    )?;
    Ok(())
}

impl Database {
    /// List a pharmacy's inventory, grouped by medicine then expiry.
    pub fn list_inventory(&self, pharmacy_id: &str) -> DbResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM inventory WHERE pharmacy_id = ? ORDER BY medicine_id, expiry_date",
            INVENTORY_COLUMNS
        ))?;
        let rows = stmt.query_map([pharmacy_id], inventory_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Add a batch to a pharmacy's inventory.
    pub fn add_inventory(&self, pharmacy_id: &str, input: &NewInventoryItem) -> DbResult<InventoryItem> {
        let expiry_date = input.validate()?;
        if self.get_pharmacy(pharmacy_id)?.is_none() {
            return Err(DbError::not_found("Pharmacy"));
        }
        let item = InventoryItem {
            id: new_id(),
            pharmacy_id: pharmacy_id.to_string(),
            medicine_id: input.medicine_id.clone(),
            batch_number: input.batch_number.clone(),
            quantity: input.quantity,
            expiry_date,
            low_stock_threshold: input
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            last_updated: now_timestamp(),
        };
        insert_batch(&self.conn, &item)?;
        Ok(item)
    }

    /// Update every batch of a medicine at a pharmacy, or only the named
    /// batch. Returns the updated rows; empty means nothing matched.
    pub fn update_inventory(
        &mut self,
        pharmacy_id: &str,
        medicine_id: &str,
        batch_number: Option<&str>,
        update: &InventoryUpdate,
    ) -> DbResult<Vec<InventoryItem>> {
        let tx = self.conn.transaction()?;
        let mut updated = Vec::new();
        let now = now_timestamp();

        for mut item in fetch_batches(&tx, pharmacy_id, medicine_id)? {
            if batch_number.is_some_and(|batch| batch != item.batch_number) {
                continue;
            }
            update.apply(&mut item)?;
            item.last_updated = now.clone();
            tx.execute(
                r#"
                UPDATE inventory SET
                    batch_number = ?2,
                    quantity = ?3,
                    expiry_date = ?4,
                    low_stock_threshold = ?5,
                    last_updated = ?6
                WHERE id = ?1
                "#,
                params![
                    item.id,
                    item.batch_number,
                    item.quantity,
                    item.expiry_date,
                    item.low_stock_threshold,
                    item.last_updated,
                ],
            )?;
            updated.push(item);
        }

        tx.commit()?;
        Ok(updated)
    }

    /// Remove every batch of a medicine at a pharmacy, or only the named
    /// batch. Returns the number of rows removed.
    pub fn delete_inventory(
        &self,
        pharmacy_id: &str,
        medicine_id: &str,
        batch_number: Option<&str>,
    ) -> DbResult<usize> {
        let rows_affected = match batch_number {
            Some(batch) => self.conn.execute(
                "DELETE FROM inventory WHERE pharmacy_id = ?1 AND medicine_id = ?2 AND batch_number = ?3",
                params![pharmacy_id, medicine_id, batch],
            )?,
            None => self.conn.execute(
                "DELETE FROM inventory WHERE pharmacy_id = ?1 AND medicine_id = ?2",
                params![pharmacy_id, medicine_id],
            )?,
        };
        Ok(rows_affected)
    }
}
