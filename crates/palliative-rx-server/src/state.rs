//! Shared application state.

use std::sync::{Arc, Mutex, PoisonError};

use palliative_rx_core::{Database, DbResult, InventoryMonitor};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    monitor: InventoryMonitor,
}

impl AppState {
    pub fn new(db: Database, monitor: InventoryMonitor) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            monitor,
        }
    }

    pub fn monitor(&self) -> &InventoryMonitor {
        &self.monitor
    }

    /// Run database work on the blocking pool while holding the connection.
    pub async fn with_db<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Database) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            // A panicked closure's transaction has already rolled back.
            let mut guard = db.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *guard).map_err(ApiError::from)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("database task failed: {}", e)))?
    }
}
