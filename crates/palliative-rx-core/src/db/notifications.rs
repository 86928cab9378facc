//! Notification storage.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{
    new_id, now_timestamp, NewNotification, Notification, NotificationFilter, NotificationType,
    NotificationUpdate,
};

const NOTIFICATION_COLUMNS: &str = "id, user_id, type, message, is_read, created_at";

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        notification_type: row.get(2)?,
        message: row.get(3)?,
        is_read: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn insert_notification(
    conn: &Connection,
    input: &NewNotification,
) -> rusqlite::Result<Notification> {
    let notification = Notification {
        id: new_id(),
        user_id: input.user_id.clone(),
        notification_type: input.notification_type,
        message: input.message.clone(),
        is_read: false,
        created_at: now_timestamp(),
    };
    conn.execute(
        r#"
        INSERT INTO notifications (id, user_id, type, message, is_read, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            notification.id,
            notification.user_id,
            notification.notification_type,
            notification.message,
            notification.is_read,
            notification.created_at,
        ],
    )?;
    Ok(notification)
}

/// Whether the user already has an unread notification with this exact text.
pub(crate) fn has_unread_duplicate(
    conn: &Connection,
    user_id: &str,
    notification_type: NotificationType,
    message: &str,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM notifications WHERE user_id = ?1 AND type = ?2 AND message = ?3 AND is_read = 0)",
        params![user_id, notification_type, message],
        |row| row.get(0),
    )
}

impl Database {
    pub fn create_notification(&self, input: &NewNotification) -> DbResult<Notification> {
        input.validate()?;
        Ok(insert_notification(&self.conn, input)?)
    }

    /// List notifications, newest first, optionally for one user and/or
    /// only unread ones.
    pub fn list_notifications(&self, filter: &NotificationFilter) -> DbResult<Vec<Notification>> {
        let mut sql = format!("SELECT {} FROM notifications WHERE 1 = 1", NOTIFICATION_COLUMNS);
        if filter.user_id.is_some() {
            sql.push_str(" AND user_id = ?1");
        }
        if filter.unread {
            sql.push_str(" AND is_read = 0");
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match &filter.user_id {
            Some(user_id) => stmt.query_map([user_id], notification_from_row)?,
            None => stmt.query_map([], notification_from_row)?,
        };
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_notification(&self, id: &str) -> DbResult<Option<Notification>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM notifications WHERE id = ?", NOTIFICATION_COLUMNS),
                [id],
                notification_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn update_notification(
        &self,
        id: &str,
        update: NotificationUpdate,
    ) -> DbResult<Option<Notification>> {
        let Some(mut notification) = self.get_notification(id)? else {
            return Ok(None);
        };
        update.apply(&mut notification)?;
        self.conn.execute(
            "UPDATE notifications SET message = ?2, is_read = ?3 WHERE id = ?1",
            params![notification.id, notification.message, notification.is_read],
        )?;
        Ok(Some(notification))
    }

    pub fn delete_notification(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM notifications WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
