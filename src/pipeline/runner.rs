use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info_span, warn};

use crate::config::PipelineSettings;
use crate::db::{
    AnalysisRecord, DocumentRow, DocumentStore, EntityRecord, EntitySource,
};
use crate::extract::{DocumentFormat, ExtractorRegistry};
use crate::insight::{DocumentInsight, InsightClient, InsightEntities, InsightError};
use crate::nlp::NlpAnalyzer;

use super::error::PipelineError;
use super::status::DocumentStatus;

/// Keyword summary written with a failure record.
const FAILURE_KEYWORDS: &str = "error, failed, processing";

/// Success payload returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutcome {
    pub document_id: String,
    pub summary: String,
    pub sentiment_score: f64,
    pub keywords: Vec<(String, usize)>,
    pub entity_count: usize,
    pub advanced: bool,
    /// Enrichment model actually used; None when enrichment was disabled
    /// or failed.
    pub model_used: Option<String>,
    pub processing_time: f64,
}

/// Everything the enrichment stage produced. Dropped wholesale when any
/// of its calls fail.
struct Enrichment {
    analysis: DocumentInsight,
    entities: InsightEntities,
    insights: Option<DocumentInsight>,
}

/// Sequences extraction, analysis, optional enrichment, and persistence
/// for one document at a time. Callers must guarantee at most one
/// in-flight run per document id; the pipeline does not serialize
/// concurrent runs itself.
pub struct Pipeline {
    settings: PipelineSettings,
    extractors: ExtractorRegistry,
    analyzer: NlpAnalyzer,
    insight: Option<InsightClient>,
    store: Arc<dyn DocumentStore>,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings, store: Arc<dyn DocumentStore>) -> Self {
        let extractors = ExtractorRegistry::new(&settings.ocr);

        let insight = if settings.enrichment.enabled {
            match InsightClient::new(&settings.enrichment) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("Enrichment unavailable, continuing without it: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            settings,
            extractors,
            analyzer: NlpAnalyzer::new(),
            insight,
            store,
        }
    }

    /// Runs the full pipeline for one document. On failure a Failed-state
    /// analysis record is persisted best-effort and the original error is
    /// returned.
    pub fn process(
        &self,
        document_id: &str,
        advanced: bool,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let start = Instant::now();
        let _span = info_span!("pipeline", document_id = %document_id, advanced).entered();

        let document = self
            .store
            .fetch_document(document_id)?
            .ok_or_else(|| PipelineError::UnknownDocument(document_id.to_string()))?;

        match self.run(&document, advanced, start) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.record_failure(&document, &err);
                Err(err)
            }
        }
    }

    fn run(
        &self,
        document: &DocumentRow,
        advanced: bool,
        start: Instant,
    ) -> Result<ProcessingOutcome, PipelineError> {
        self.transition(&document.id, document.status, DocumentStatus::Processing)?;

        // Extracted text is computed once and reused on reprocessing.
        let text = match document.extracted_text.as_deref() {
            Some(cached) if !cached.is_empty() => cached.to_string(),
            _ => {
                let _step = info_span!("extract").entered();
                let path = Path::new(&document.file_path);
                let format = DocumentFormat::from_path(path)?;
                let extraction = self.extractors.extract(path, format)?;
                self.store
                    .save_extracted_text(&document.id, &extraction.text, extraction.page_count)?;
                extraction.text
            }
        };

        let trimmed_length = text.trim().chars().count();
        if trimmed_length < self.settings.min_text_length {
            return Err(PipelineError::InsufficientText {
                length: trimmed_length,
            });
        }

        let _analysis_span = info_span!("analyze").entered();
        let entities = self.analyzer.extract_entities(&text);
        let keywords = self
            .analyzer
            .extract_keywords(&text, self.settings.keyword_count);
        let sentiment_score = self.analyzer.analyze_sentiment(&text);
        let summary = self
            .analyzer
            .summarize(&text, self.settings.summary_sentences);
        drop(_analysis_span);

        let enrichment = self.insight.as_ref().and_then(|client| {
            let _step = info_span!("enrich").entered();
            match enrich(client, &text, advanced) {
                Ok(enrichment) => Some(enrichment),
                Err(e) => {
                    warn!(
                        "Enrichment failed for document {}, continuing with base analysis: {}",
                        document.id, e
                    );
                    None
                }
            }
        });

        let record = AnalysisRecord {
            document_id: document.id.clone(),
            language: document.language.clone(),
            sentiment_score,
            keyword_summary: keywords
                .iter()
                .map(|(word, _)| word.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            summary: summary.clone(),
            insight_analysis: enrichment.as_ref().map(|e| e.analysis.text.clone()),
            insight_text: enrichment
                .as_ref()
                .and_then(|e| e.insights.as_ref().map(|i| i.text.clone())),
            model_used: enrichment.as_ref().map(|e| e.analysis.model.clone()),
            is_advanced: advanced,
        };
        self.store.upsert_analysis(&record)?;

        let mut rows: Vec<EntityRecord> = entities
            .iter()
            .map(|entity| EntityRecord {
                text: entity.text.clone(),
                entity_type: entity.entity_type,
                confidence: entity.confidence,
                position_start: Some(entity.start as i64),
                position_end: Some(entity.end as i64),
                source: EntitySource::Base,
            })
            .collect();
        if let Some(ref enrichment) = enrichment {
            for remote in &enrichment.entities.entities {
                // The service sometimes emits entries with no surface text.
                if remote.text.is_empty() {
                    continue;
                }
                rows.push(EntityRecord {
                    text: remote.text.clone(),
                    entity_type: remote.entity_type(),
                    confidence: 1.0,
                    position_start: None,
                    position_end: None,
                    source: EntitySource::External,
                });
            }
        }
        self.store.replace_entities(&document.id, &rows)?;

        let processing_time = start.elapsed().as_secs_f64();
        self.store
            .set_processing_time(&document.id, processing_time)?;
        self.transition(
            &document.id,
            DocumentStatus::Processing,
            DocumentStatus::Completed,
        )?;

        Ok(ProcessingOutcome {
            document_id: document.id.clone(),
            summary,
            sentiment_score,
            keywords,
            entity_count: rows.len(),
            advanced,
            model_used: enrichment.map(|e| e.analysis.model),
            processing_time,
        })
    }

    fn transition(
        &self,
        document_id: &str,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> Result<(), PipelineError> {
        if !from.can_transition(to) {
            return Err(PipelineError::InvalidTransition { from, to });
        }
        self.store.set_status(document_id, to)?;
        Ok(())
    }

    /// Best-effort Failed-state record. Persistence problems here are
    /// logged, never raised; the caller gets the original error.
    fn record_failure(&self, document: &DocumentRow, error: &PipelineError) {
        let record = AnalysisRecord {
            document_id: document.id.clone(),
            language: document.language.clone(),
            sentiment_score: 0.0,
            keyword_summary: FAILURE_KEYWORDS.to_string(),
            summary: format!("Processing failed: {}", error),
            insight_analysis: None,
            insight_text: None,
            model_used: None,
            is_advanced: false,
        };
        if let Err(e) = self.store.upsert_analysis(&record) {
            warn!(
                "Failed to persist failure record for document {}: {}",
                document.id, e
            );
        }
        if let Err(e) = self.store.set_status(&document.id, DocumentStatus::Failed) {
            warn!(
                "Failed to mark document {} as failed: {}",
                document.id, e
            );
        }
    }
}

/// Runs the enrichment calls as one unit: consolidated analysis, entity
/// extraction, and (in advanced mode) deeper insights. Any transport or
/// API error drops the whole stage.
fn enrich(
    client: &InsightClient,
    text: &str,
    advanced: bool,
) -> Result<Enrichment, InsightError> {
    let analysis = client.analyze(text, advanced)?;
    let entities = client.extract_entities(text, advanced)?;
    let insights = if advanced {
        Some(client.generate_insights(text, true)?)
    } else {
        None
    };

    Ok(Enrichment {
        analysis,
        entities,
        insights,
    })
}
