//! Database layer for palliative-rx.

mod schema;
mod users;
pub(crate) mod profiles;
pub(crate) mod medicines;
pub(crate) mod inventory;
mod prescriptions;
mod dispense;
pub(crate) mod restock;
pub(crate) mod notifications;
mod adherence;
mod seed;

pub use medicines::{name_similarity, MedicineMatch, MEDICINE_MATCH_THRESHOLD};
pub use restock::DEFAULT_SHELF_LIFE_DAYS;
pub use schema::*;
pub use seed::{SeedSummary, SEED_PASSWORD};
pub use users::PASSWORD_HASH_COST;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use thiserror::Error;

use crate::models::{MedicineType, NotificationType, PrescriptionStatus, RestockOrderStatus, Role};
use crate::validation::ValidationError;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(String),

    /// A business rule refused the operation (e.g. insufficient stock).
    #[error("{0}")]
    Rejected(String),
}

impl DbError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DbError::NotFound(what.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        DbError::Rejected(reason.into())
    }

    /// True for UNIQUE, FOREIGN KEY and CHECK violations reported by SQLite.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
        )
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

/// Text enums are stored as their upper-case names.
macro_rules! sql_text_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.as_str()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    value
                        .as_str()?
                        .parse()
                        .map_err(|e: ValidationError| FromSqlError::Other(Box::new(e)))
                }
            }
        )+
    };
}

sql_text_enum!(Role, MedicineType, PrescriptionStatus, RestockOrderStatus, NotificationType);
