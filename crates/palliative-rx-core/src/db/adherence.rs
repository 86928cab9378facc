//! Patient adherence logs.

use rusqlite::{params, Row};

use super::{Database, DbError, DbResult};
use crate::models::{new_id, now_timestamp, AdherenceLog, AdherenceLogDetail, NewAdherenceLog};

const DETAIL_QUERY: &str = r#"
    SELECT a.id, a.patient_id, a.medicine_id, a.taken_at, a.missed, a.remarks,
           a.quantity_taken, u.name, m.name
    FROM adherence_logs a
    JOIN medicines m ON m.id = a.medicine_id
    JOIN patients p ON p.id = a.patient_id
    LEFT JOIN users u ON u.id = p.user_id
"#;

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<AdherenceLog> {
    Ok(AdherenceLog {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        medicine_id: row.get(2)?,
        taken_at: row.get(3)?,
        missed: row.get(4)?,
        remarks: row.get(5)?,
        quantity_taken: row.get(6)?,
    })
}

fn detail_from_row(row: &Row<'_>) -> rusqlite::Result<AdherenceLogDetail> {
    Ok(AdherenceLogDetail {
        log: log_from_row(row)?,
        patient_name: row.get(7)?,
        medicine_name: row.get(8)?,
    })
}

impl Database {
    /// All adherence logs with patient and medicine names, newest first.
    pub fn list_adherence_logs(&self) -> DbResult<Vec<AdherenceLogDetail>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY a.taken_at DESC, a.rowid DESC", DETAIL_QUERY))?;
        let rows = stmt.query_map([], detail_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// One patient's logs, newest first.
    pub fn list_patient_adherence_logs(&self, patient_id: &str) -> DbResult<Vec<AdherenceLogDetail>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE a.patient_id = ? ORDER BY a.taken_at DESC, a.rowid DESC",
            DETAIL_QUERY
        ))?;
        let rows = stmt.query_map([patient_id], detail_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Record an adherence entry; `taken_at` defaults to now.
    pub fn add_adherence_log(&self, patient_id: &str, input: &NewAdherenceLog) -> DbResult<AdherenceLog> {
        let taken_at = input.validate()?;
        if self.get_patient(patient_id)?.is_none() {
            return Err(DbError::not_found("Patient"));
        }
        let log = AdherenceLog {
            id: new_id(),
            patient_id: patient_id.to_string(),
            medicine_id: input.medicine_id.clone(),
            taken_at: taken_at.unwrap_or_else(now_timestamp),
            missed: input.missed,
            remarks: input.remarks.clone(),
            quantity_taken: input.quantity_taken,
        };
        self.conn.execute(
            r#"
            INSERT INTO adherence_logs (
                id, patient_id, medicine_id, taken_at, missed, remarks, quantity_taken
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.id,
                log.patient_id,
                log.medicine_id,
                log.taken_at,
                log.missed,
                log.remarks,
                log.quantity_taken,
            ],
        )?;
        Ok(log)
    }
}
