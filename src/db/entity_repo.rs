//! Entity repository — entity mentions per document, replaced wholesale
//! on each successful processing run.

use rusqlite::{params, Row};

use crate::nlp::EntityType;

use super::{Database, StoreError};

/// Provenance of an entity mention: the base NLP tagger or the external
/// generative-language service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitySource {
    Base,
    External,
}

impl EntitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::External => "external",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "base" => Some(Self::Base),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

/// Fields written for one entity mention.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub text: String,
    pub entity_type: EntityType,
    pub confidence: f64,
    pub position_start: Option<i64>,
    pub position_end: Option<i64>,
    pub source: EntitySource,
}

/// A stored entity row.
#[derive(Debug, Clone)]
pub struct EntityRow {
    pub id: i64,
    pub document_id: String,
    pub text: String,
    pub entity_type: EntityType,
    pub confidence: f64,
    pub position_start: Option<i64>,
    pub position_end: Option<i64>,
    pub source: EntitySource,
    pub created_at: String,
}

impl EntityRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let type_raw: String = row.get("entity_type")?;
        let source_raw: String = row.get("source")?;
        let source = EntitySource::parse(&source_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown entity source '{}'", source_raw).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            document_id: row.get("document_id")?,
            text: row.get("text")?,
            entity_type: EntityType::parse(&type_raw),
            confidence: row.get("confidence")?,
            position_start: row.get("position_start")?,
            position_end: row.get("position_end")?,
            source,
            created_at: row.get("created_at")?,
        })
    }
}

/// Deletes every entity for the document and bulk-inserts the new set,
/// inside one transaction. After this call the stored set is exactly
/// `entities`, never a union with the previous run.
pub fn replace_all(
    db: &Database,
    document_id: &str,
    entities: &[EntityRecord],
) -> Result<(), StoreError> {
    let created_at = chrono::Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM entities WHERE document_id = ?1",
            params![document_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO entities (document_id, text, entity_type, confidence,
                 position_start, position_end, source, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for entity in entities {
                stmt.execute(params![
                    document_id,
                    entity.text,
                    entity.entity_type.as_str(),
                    entity.confidence,
                    entity.position_start,
                    entity.position_end,
                    entity.source.as_str(),
                    created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    })
}

pub fn find_by_document(db: &Database, document_id: &str) -> Result<Vec<EntityRow>, StoreError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM entities WHERE document_id = ?1 ORDER BY id")?;
        let rows: Vec<EntityRow> = stmt
            .query_map(params![document_id], EntityRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

pub fn count_by_document(db: &Database, document_id: &str) -> Result<u64, StoreError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE document_id = ?1",
            params![document_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
