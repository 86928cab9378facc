//! User account operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{new_id, now_timestamp, Credentials, NewUser, Role, User, UserUpdate};

/// bcrypt work factor for stored passwords.
pub const PASSWORD_HASH_COST: u32 = 10;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn hash_password(password: &str) -> DbResult<String> {
    Ok(bcrypt::hash(password, PASSWORD_HASH_COST)?)
}

impl Database {
    /// Validate, hash the password and insert a new user.
    pub fn create_user(&self, input: &NewUser) -> DbResult<User> {
        let valid = input.validate()?;
        let hash = hash_password(&valid.password)?;
        self.insert_user_with_hash(&valid.name, &valid.email, &hash, valid.role)
    }

    /// Insert a user whose password is already hashed.
    pub(crate) fn insert_user_with_hash(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> DbResult<User> {
        let user = User {
            id: new_id(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now_timestamp(),
        };
        self.conn.execute(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                user.role,
                user.created_at,
            ],
        )?;
        Ok(user)
    }

    /// List all users, oldest first.
    pub fn list_users(&self) -> DbResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY created_at, name",
            USER_COLUMNS
        ))?;
        let rows = stmt.query_map([], user_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                [id],
                user_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a user by email address.
    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                [email],
                user_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Apply a partial update. Returns `None` if the user does not exist.
    pub fn update_user(&self, id: &str, update: UserUpdate) -> DbResult<Option<User>> {
        let role = update.validate()?;
        let Some(mut user) = self.get_user(id)? else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password) = update.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(role) = role {
            user.role = role;
        }

        self.conn.execute(
            r#"
            UPDATE users SET
                name = ?2,
                email = ?3,
                password_hash = ?4,
                role = ?5
            WHERE id = ?1
            "#,
            params![user.id, user.name, user.email, user.password_hash, user.role],
        )?;
        Ok(Some(user))
    }

    /// Delete a user. Linked doctor/patient profiles cascade; pharmacies and
    /// distributors are unlinked.
    pub fn delete_user(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM users WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Check credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub fn authenticate(&self, credentials: &Credentials) -> DbResult<User> {
        let invalid = || DbError::rejected("Invalid email or password");
        let user = self
            .get_user_by_email(&credentials.email)?
            .ok_or_else(invalid)?;
        if user.verify_password(&credentials.password) {
            Ok(user)
        } else {
            Err(invalid())
        }
    }
}
