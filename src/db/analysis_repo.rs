//! Analysis repository — the single analysis result per document.

use rusqlite::{params, Row};

use super::{Database, StoreError};

/// Fields written on each processing run. Exactly one row exists per
/// document; writes go through an upsert keyed on `document_id`.
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub document_id: String,
    pub language: String,
    pub sentiment_score: f64,
    pub keyword_summary: String,
    pub summary: String,
    pub insight_analysis: Option<String>,
    pub insight_text: Option<String>,
    pub model_used: Option<String>,
    pub is_advanced: bool,
}

/// A stored analysis row.
#[derive(Debug, Clone)]
pub struct AnalysisRow {
    pub id: i64,
    pub document_id: String,
    pub language: Option<String>,
    pub sentiment_score: f64,
    pub keyword_summary: String,
    pub summary: String,
    pub insight_analysis: Option<String>,
    pub insight_text: Option<String>,
    pub model_used: Option<String>,
    pub is_advanced: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl AnalysisRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            document_id: row.get("document_id")?,
            language: row.get("language")?,
            sentiment_score: row.get("sentiment_score")?,
            keyword_summary: row.get("keyword_summary")?,
            summary: row.get("summary")?,
            insight_analysis: row.get("insight_analysis")?,
            insight_text: row.get("insight_text")?,
            model_used: row.get("model_used")?,
            is_advanced: row.get("is_advanced")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts or fully overwrites the analysis for the record's document.
/// Overwrite semantics: every analysis column is replaced, never merged.
pub fn upsert(db: &Database, record: &AnalysisRecord) -> Result<(), StoreError> {
    let now = chrono::Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO analysis_results (document_id, language, sentiment_score,
             keyword_summary, summary, insight_analysis, insight_text, model_used,
             is_advanced, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             ON CONFLICT(document_id) DO UPDATE SET
                language = excluded.language,
                sentiment_score = excluded.sentiment_score,
                keyword_summary = excluded.keyword_summary,
                summary = excluded.summary,
                insight_analysis = excluded.insight_analysis,
                insight_text = excluded.insight_text,
                model_used = excluded.model_used,
                is_advanced = excluded.is_advanced,
                updated_at = excluded.updated_at",
            params![
                record.document_id,
                record.language,
                record.sentiment_score,
                record.keyword_summary,
                record.summary,
                record.insight_analysis,
                record.insight_text,
                record.model_used,
                record.is_advanced,
                now,
            ],
        )?;
        Ok(())
    })
}

pub fn find_by_document(
    db: &Database,
    document_id: &str,
) -> Result<Option<AnalysisRow>, StoreError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM analysis_results WHERE document_id = ?1")?;
        let mut rows = stmt.query_map(params![document_id], AnalysisRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(StoreError::Sqlite(e)),
            None => Ok(None),
        }
    })
}
