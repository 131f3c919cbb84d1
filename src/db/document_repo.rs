//! Document repository — CRUD operations for the `documents` table.

use rusqlite::{params, Row};

use crate::pipeline::DocumentStatus;

use super::{Database, StoreError};

/// A document row. `extracted_text`, once set, is reused on reprocessing.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub language: String,
    pub status: DocumentStatus,
    pub extracted_text: Option<String>,
    pub processing_time: Option<f64>,
    pub page_count: i64,
    pub uploaded_at: String,
    pub updated_at: String,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let status_raw: String = row.get("status")?;
        let status = DocumentStatus::parse(&status_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown document status '{}'", status_raw).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            file_path: row.get("file_path")?,
            file_type: row.get("file_type")?,
            language: row.get("language")?,
            status,
            extracted_text: row.get("extracted_text")?,
            processing_time: row.get("processing_time")?,
            page_count: row.get("page_count")?,
            uploaded_at: row.get("uploaded_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub fn insert(db: &Database, document: &DocumentRow) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO documents (id, title, file_path, file_type, language, status,
             extracted_text, processing_time, page_count, uploaded_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                document.id,
                document.title,
                document.file_path,
                document.file_type,
                document.language,
                document.status.as_str(),
                document.extracted_text,
                document.processing_time,
                document.page_count,
                document.uploaded_at,
                document.updated_at,
            ],
        )?;
        Ok(())
    })
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<DocumentRow>, StoreError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], DocumentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(StoreError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

pub fn set_status(db: &Database, id: &str, status: DocumentStatus) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE documents SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), now()],
        )?;
        Ok(())
    })
}

pub fn save_extracted_text(
    db: &Database,
    id: &str,
    text: &str,
    page_count: usize,
) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE documents SET extracted_text = ?2, page_count = ?3, updated_at = ?4
             WHERE id = ?1",
            params![id, text, page_count as i64, now()],
        )?;
        Ok(())
    })
}

pub fn set_processing_time(db: &Database, id: &str, seconds: f64) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE documents SET processing_time = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, seconds, now()],
        )?;
        Ok(())
    })
}

/// Removes the row; `analysis_results` and `entities` rows go with it
/// via `ON DELETE CASCADE`.
pub fn delete(db: &Database, id: &str) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(())
    })
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(id: &str) -> DocumentRow {
        DocumentRow {
            id: id.to_string(),
            title: "Quarterly report".to_string(),
            file_path: "/tmp/report.pdf".to_string(),
            file_type: Some("application/pdf".to_string()),
            language: "en".to_string(),
            status: DocumentStatus::Pending,
            extracted_text: None,
            processing_time: None,
            page_count: 0,
            uploaded_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample_row("d1")).unwrap();

        let found = find_by_id(&db, "d1").unwrap().unwrap();
        assert_eq!(found.title, "Quarterly report");
        assert_eq!(found.status, DocumentStatus::Pending);
        assert!(found.extracted_text.is_none());
    }

    #[test]
    fn test_find_missing_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(find_by_id(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn test_set_status() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample_row("d1")).unwrap();

        set_status(&db, "d1", DocumentStatus::Processing).unwrap();
        let found = find_by_id(&db, "d1").unwrap().unwrap();
        assert_eq!(found.status, DocumentStatus::Processing);
    }

    #[test]
    fn test_save_extracted_text() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample_row("d1")).unwrap();

        save_extracted_text(&db, "d1", "extracted body", 4).unwrap();
        let found = find_by_id(&db, "d1").unwrap().unwrap();
        assert_eq!(found.extracted_text.as_deref(), Some("extracted body"));
        assert_eq!(found.page_count, 4);
    }

    #[test]
    fn test_set_processing_time() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample_row("d1")).unwrap();

        set_processing_time(&db, "d1", 1.25).unwrap();
        let found = find_by_id(&db, "d1").unwrap().unwrap();
        assert_eq!(found.processing_time, Some(1.25));
    }

    #[test]
    fn test_delete() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &sample_row("d1")).unwrap();
        delete(&db, "d1").unwrap();
        assert!(find_by_id(&db, "d1").unwrap().is_none());
    }
}
