//! The storage collaborator interface the pipeline depends on, plus its
//! SQLite implementation.

use std::path::Path;

use super::analysis_repo::{self, AnalysisRecord, AnalysisRow};
use super::document_repo::{self, DocumentRow};
use super::entity_repo::{self, EntityRecord, EntityRow};
use super::{Database, StoreError};
use crate::pipeline::DocumentStatus;

/// Parameters for registering a new document. Creation is the upload
/// path's job; it lives here so tests and callers share one entry point.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub file_path: String,
    pub language: Option<String>,
}

/// CRUD over documents, analysis results, and entity mentions. The
/// analysis upsert is atomic per document key; entity replacement is
/// transactional delete-then-bulk-insert.
pub trait DocumentStore: Send + Sync {
    fn create_document(&self, document: NewDocument) -> Result<DocumentRow, StoreError>;
    fn fetch_document(&self, id: &str) -> Result<Option<DocumentRow>, StoreError>;
    fn set_status(&self, id: &str, status: DocumentStatus) -> Result<(), StoreError>;
    fn save_extracted_text(
        &self,
        id: &str,
        text: &str,
        page_count: usize,
    ) -> Result<(), StoreError>;
    fn set_processing_time(&self, id: &str, seconds: f64) -> Result<(), StoreError>;
    fn upsert_analysis(&self, record: &AnalysisRecord) -> Result<(), StoreError>;
    fn fetch_analysis(&self, document_id: &str) -> Result<Option<AnalysisRow>, StoreError>;
    fn replace_entities(
        &self,
        document_id: &str,
        entities: &[EntityRecord],
    ) -> Result<(), StoreError>;
    fn fetch_entities(&self, document_id: &str) -> Result<Vec<EntityRow>, StoreError>;
    fn count_entities(&self, document_id: &str) -> Result<u64, StoreError>;
    /// Deletes the document, its analysis and entities (cascade), and its
    /// underlying file blob (best-effort, logged).
    fn delete_document(&self, id: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Database::open_in_memory()?))
    }
}

impl DocumentStore for SqliteStore {
    fn create_document(&self, document: NewDocument) -> Result<DocumentRow, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        let file_type = mime_guess::from_path(&document.file_path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .or_else(|| Some("application/octet-stream".to_string()));

        let row = DocumentRow {
            id: uuid::Uuid::new_v4().to_string(),
            title: document.title,
            file_path: document.file_path,
            file_type,
            language: document.language.unwrap_or_else(|| "en".to_string()),
            status: DocumentStatus::Pending,
            extracted_text: None,
            processing_time: None,
            page_count: 0,
            uploaded_at: now.clone(),
            updated_at: now,
        };
        document_repo::insert(&self.db, &row)?;
        Ok(row)
    }

    fn fetch_document(&self, id: &str) -> Result<Option<DocumentRow>, StoreError> {
        document_repo::find_by_id(&self.db, id)
    }

    fn set_status(&self, id: &str, status: DocumentStatus) -> Result<(), StoreError> {
        document_repo::set_status(&self.db, id, status)
    }

    fn save_extracted_text(
        &self,
        id: &str,
        text: &str,
        page_count: usize,
    ) -> Result<(), StoreError> {
        document_repo::save_extracted_text(&self.db, id, text, page_count)
    }

    fn set_processing_time(&self, id: &str, seconds: f64) -> Result<(), StoreError> {
        document_repo::set_processing_time(&self.db, id, seconds)
    }

    fn upsert_analysis(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        analysis_repo::upsert(&self.db, record)
    }

    fn fetch_analysis(&self, document_id: &str) -> Result<Option<AnalysisRow>, StoreError> {
        analysis_repo::find_by_document(&self.db, document_id)
    }

    fn replace_entities(
        &self,
        document_id: &str,
        entities: &[EntityRecord],
    ) -> Result<(), StoreError> {
        entity_repo::replace_all(&self.db, document_id, entities)
    }

    fn fetch_entities(&self, document_id: &str) -> Result<Vec<EntityRow>, StoreError> {
        entity_repo::find_by_document(&self.db, document_id)
    }

    fn count_entities(&self, document_id: &str) -> Result<u64, StoreError> {
        entity_repo::count_by_document(&self.db, document_id)
    }

    fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        let Some(document) = document_repo::find_by_id(&self.db, id)? else {
            return Ok(());
        };
        document_repo::delete(&self.db, id)?;

        if let Err(e) = std::fs::remove_file(&document.file_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to remove file blob '{}': {}",
                    document.file_path,
                    e
                );
            }
        }
        Ok(())
    }
}
