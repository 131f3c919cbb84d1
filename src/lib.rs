pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod insight;
pub mod nlp;
pub mod pipeline;

pub use config::{EnrichmentSettings, OcrSettings, PipelineSettings};
pub use db::{
    AnalysisRecord, AnalysisRow, Database, DocumentRow, DocumentStore, EntityRecord, EntityRow,
    EntitySource, NewDocument, SqliteStore, StoreError,
};
pub use error::{DocsenseError, ExtractError, Result};
pub use extract::{DocumentFormat, Extraction, ExtractorRegistry, OcrEngine, TextExtractor};
pub use insight::{DocumentInsight, InsightClient, InsightEntities, InsightError, RemoteEntity};
pub use nlp::{Entity, EntityType, NlpAnalyzer};
pub use pipeline::{DocumentStatus, Pipeline, PipelineError, ProcessingOutcome};
