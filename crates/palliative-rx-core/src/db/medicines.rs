//! Medicine catalog operations.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{Database, DbResult};
use crate::models::{new_id, Medicine, MedicineUpdate, NewMedicine};

/// Minimum Jaro-Winkler similarity for a name to count as a search hit.
pub const MEDICINE_MATCH_THRESHOLD: f64 = 0.8;

/// A search hit with its similarity score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineMatch {
    #[serde(flatten)]
    pub medicine: Medicine,
    pub score: f64,
}

fn medicine_from_row(row: &Row<'_>) -> rusqlite::Result<Medicine> {
    Ok(Medicine {
        id: row.get(0)?,
        name: row.get(1)?,
        manufacturer: row.get(2)?,
        medicine_type: row.get(3)?,
        dosage: row.get(4)?,
    })
}

pub(crate) fn fetch_medicine_name(conn: &Connection, id: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row("SELECT name FROM medicines WHERE id = ?", [id], |row| row.get(0))
        .optional()
}

/// Similarity of a query against a medicine name. Substring hits score 1.0
/// so "morph" finds "Morphine"; otherwise Jaro-Winkler tolerates typos
/// such as "morfine".
pub fn name_similarity(query: &str, name: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let name = name.to_lowercase();
    if query.is_empty() {
        return 0.0;
    }
    if name.contains(&query) {
        return 1.0;
    }
    strsim::jaro_winkler(&query, &name)
}

impl Database {
    pub fn create_medicine(&self, input: &NewMedicine) -> DbResult<Medicine> {
        input.validate()?;
        let medicine = Medicine {
            id: new_id(),
            name: input.name.clone(),
            manufacturer: input.manufacturer.clone(),
            medicine_type: input.medicine_type,
            dosage: input.dosage.clone(),
        };
        self.conn.execute(
            "INSERT INTO medicines (id, name, manufacturer, type, dosage) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                medicine.id,
                medicine.name,
                medicine.manufacturer,
                medicine.medicine_type,
                medicine.dosage
            ],
        )?;
        Ok(medicine)
    }

    pub fn list_medicines(&self) -> DbResult<Vec<Medicine>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, manufacturer, type, dosage FROM medicines ORDER BY name")?;
        let rows = stmt.query_map([], medicine_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_medicine(&self, id: &str) -> DbResult<Option<Medicine>> {
        self.conn
            .query_row(
                "SELECT id, name, manufacturer, type, dosage FROM medicines WHERE id = ?",
                [id],
                medicine_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Fuzzy name search, best match first.
    pub fn search_medicines(&self, query: &str) -> DbResult<Vec<MedicineMatch>> {
        let mut matches: Vec<MedicineMatch> = self
            .list_medicines()?
            .into_iter()
            .map(|medicine| MedicineMatch {
                score: name_similarity(query, &medicine.name),
                medicine,
            })
            .filter(|m| m.score >= MEDICINE_MATCH_THRESHOLD)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.medicine.name.cmp(&b.medicine.name))
        });
        Ok(matches)
    }

    pub fn update_medicine(&self, id: &str, update: MedicineUpdate) -> DbResult<Option<Medicine>> {
        let Some(mut medicine) = self.get_medicine(id)? else {
            return Ok(None);
        };
        update.apply(&mut medicine)?;
        self.conn.execute(
            r#"
            UPDATE medicines SET
                name = ?2,
                manufacturer = ?3,
                type = ?4,
                dosage = ?5
            WHERE id = ?1
            "#,
            params![
                medicine.id,
                medicine.name,
                medicine.manufacturer,
                medicine.medicine_type,
                medicine.dosage
            ],
        )?;
        Ok(Some(medicine))
    }

    pub fn delete_medicine(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM medicines WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicineType;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (name, medicine_type) in [
            ("Morphine", MedicineType::Opioid),
            ("Fentanyl", MedicineType::Opioid),
            ("Ibuprofen", MedicineType::General),
        ] {
            db.create_medicine(&NewMedicine {
                name: name.into(),
                manufacturer: Some("Pharma Inc.".into()),
                medicine_type,
                dosage: None,
            })
            .unwrap();
        }
        db
    }

    #[test]
    fn test_type_round_trip() {
        let db = setup_db();
        let all = db.list_medicines().unwrap();
        assert_eq!(all.len(), 3);
        let morphine = all.iter().find(|m| m.name == "Morphine").unwrap();
        assert_eq!(morphine.medicine_type, MedicineType::Opioid);
    }

    #[test]
    fn test_search_prefix_and_typo() {
        let db = setup_db();

        let hits = db.search_medicines("morph").unwrap();
        assert_eq!(hits[0].medicine.name, "Morphine");
        assert_eq!(hits[0].score, 1.0);

        let hits = db.search_medicines("morfine").unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].medicine.name, "Morphine");

        assert!(db.search_medicines("paracetamol").unwrap().is_empty());
        assert!(db.search_medicines("   ").unwrap().is_empty());
    }

    #[test]
    fn test_update_medicine_type() {
        let db = setup_db();
        let ibuprofen = db
            .list_medicines()
            .unwrap()
            .into_iter()
            .find(|m| m.name == "Ibuprofen")
            .unwrap();
        let updated = db
            .update_medicine(
                &ibuprofen.id,
                MedicineUpdate {
                    medicine_type: Some(MedicineType::Controlled),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.medicine_type, MedicineType::Controlled);
        assert_eq!(updated.manufacturer.as_deref(), Some("Pharma Inc."));
    }
}
