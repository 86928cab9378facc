//! SQLite schema definition.

/// Complete database schema for palliative-rx.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Accounts & Profiles
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('ADMIN', 'DOCTOR', 'PHARMACIST', 'PATIENT', 'DISTRIBUTOR')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS doctors (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    specialization TEXT
);

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    user_id TEXT UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    contact_number TEXT,
    address TEXT
);

CREATE TABLE IF NOT EXISTS pharmacies (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    contact TEXT,
    user_id TEXT UNIQUE REFERENCES users(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS distributors (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    contact_number TEXT,
    email TEXT NOT NULL UNIQUE,
    user_id TEXT UNIQUE REFERENCES users(id) ON DELETE SET NULL
);

-- ============================================================================
-- Medicines & Inventory
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicines (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    manufacturer TEXT,
    type TEXT NOT NULL DEFAULT 'GENERAL' CHECK (type IN ('GENERAL', 'OPIOID', 'CONTROLLED')),
    dosage TEXT
);

CREATE INDEX IF NOT EXISTS idx_medicines_name ON medicines(name);

-- One row per stock batch; expiry_date uses the sortable UTC form.
CREATE TABLE IF NOT EXISTS inventory (
    id TEXT PRIMARY KEY,
    pharmacy_id TEXT NOT NULL REFERENCES pharmacies(id) ON DELETE CASCADE,
    medicine_id TEXT NOT NULL REFERENCES medicines(id) ON DELETE CASCADE,
    batch_number TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity >= 0),
    expiry_date TEXT NOT NULL,
    low_stock_threshold INTEGER NOT NULL DEFAULT 10,
    last_updated TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_inventory_pharmacy_medicine ON inventory(pharmacy_id, medicine_id);
CREATE INDEX IF NOT EXISTS idx_inventory_expiry ON inventory(expiry_date);

-- ============================================================================
-- Prescriptions
-- ============================================================================

CREATE TABLE IF NOT EXISTS prescriptions (
    id TEXT PRIMARY KEY,
    doctor_id TEXT NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'ACTIVE' CHECK (status IN ('ACTIVE', 'COMPLETED', 'CANCELLED')),
    created_at TEXT NOT NULL,
    notes TEXT
);

CREATE INDEX IF NOT EXISTS idx_prescriptions_patient ON prescriptions(patient_id);

CREATE TABLE IF NOT EXISTS prescription_medicines (
    id TEXT PRIMARY KEY,
    prescription_id TEXT NOT NULL REFERENCES prescriptions(id) ON DELETE CASCADE,
    medicine_id TEXT NOT NULL REFERENCES medicines(id) ON DELETE CASCADE,
    dosage TEXT NOT NULL,
    frequency TEXT NOT NULL,
    duration INTEGER NOT NULL,                   -- days
    quantity_prescribed INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_prescription_medicines_rx ON prescription_medicines(prescription_id);

CREATE TABLE IF NOT EXISTS prescription_fills (
    id TEXT PRIMARY KEY,
    pharmacy_id TEXT NOT NULL REFERENCES pharmacies(id) ON DELETE CASCADE,
    prescription_medicine_id TEXT NOT NULL REFERENCES prescription_medicines(id) ON DELETE CASCADE,
    quantity_dispensed INTEGER NOT NULL CHECK (quantity_dispensed > 0),
    dispensed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_fills_line ON prescription_fills(prescription_medicine_id);
CREATE INDEX IF NOT EXISTS idx_fills_pharmacy_time ON prescription_fills(pharmacy_id, dispensed_at);

-- ============================================================================
-- Restocking & Notifications
-- ============================================================================

CREATE TABLE IF NOT EXISTS restock_orders (
    id TEXT PRIMARY KEY,
    pharmacy_id TEXT NOT NULL REFERENCES pharmacies(id) ON DELETE CASCADE,
    distributor_id TEXT NOT NULL REFERENCES distributors(id) ON DELETE CASCADE,
    medicine_id TEXT NOT NULL REFERENCES medicines(id) ON DELETE CASCADE,
    quantity_ordered INTEGER NOT NULL CHECK (quantity_ordered > 0),
    status TEXT NOT NULL DEFAULT 'PENDING' CHECK (status IN ('PENDING', 'SHIPPED', 'COMPLETED', 'CANCELLED')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_restock_open ON restock_orders(pharmacy_id, medicine_id, status);

CREATE TABLE IF NOT EXISTS notifications (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    type TEXT NOT NULL CHECK (type IN ('LOW_STOCK', 'EXPIRY_WARNING', 'ORDER_SHIPPED', 'ORDER_COMPLETED')),
    message TEXT NOT NULL,
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read);

-- ============================================================================
-- Adherence
-- ============================================================================

CREATE TABLE IF NOT EXISTS adherence_logs (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    medicine_id TEXT NOT NULL REFERENCES medicines(id) ON DELETE CASCADE,
    taken_at TEXT NOT NULL,
    missed INTEGER NOT NULL DEFAULT 0,
    remarks TEXT,
    quantity_taken INTEGER
);

CREATE INDEX IF NOT EXISTS idx_adherence_patient ON adherence_logs(patient_id);
"#;
