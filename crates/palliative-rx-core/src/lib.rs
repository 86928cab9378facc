//! Palliative-Rx Core Library
//!
//! Pharmacy management for palliative care: prescriptions and their fills,
//! per-pharmacy stock batches, restocking from distributors, and the
//! notifications that tie them together.
//!
//! # Stock flow
//!
//! ```text
//!  Distributor ──restock order──▶ PENDING ─▶ SHIPPED ─▶ COMPLETED
//!                                                          │
//!                                              credit inventory batch
//!                                                          │
//!                                                          ▼
//!  Doctor ──prescription──▶ lines ──dispense (FEFO)──▶ Pharmacy inventory
//!                                                          │
//!                                          InventoryMonitor (periodic)
//!                                          low stock ─▶ restock order
//!                                          expiring  ─▶ notification
//! ```
//!
//! Dispensing, restock completion and each monitor pass each run inside a
//! single SQLite transaction.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer and transactional operations
//! - [`models`]: Domain types (Prescription, InventoryItem, RestockOrder, etc.)
//! - [`validation`]: Request field checks shared by the models
//! - [`monitor`]: Low-stock and expiry scanner
//! - [`demand`]: Opioid demand forecasting

pub mod db;
pub mod demand;
pub mod models;
pub mod monitor;
pub mod validation;

// Re-export commonly used types
pub use db::{Database, DbError, DbResult, SeedSummary};
pub use demand::DemandForecast;
pub use monitor::{InventoryMonitor, MonitorSettings, ScanReport};
pub use validation::ValidationError;
