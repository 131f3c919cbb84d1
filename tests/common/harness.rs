//! Test harness for isolated pipeline execution.
//!
//! Provides a temp directory for document blobs, an in-memory SQLite
//! store, and a pipeline with OCR and enrichment disabled (overridable
//! per test).

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use docsense::{
    DocumentRow, DocumentStore, EnrichmentSettings, NewDocument, OcrSettings, Pipeline,
    PipelineSettings, SqliteStore,
};

pub struct TestHarness {
    temp_dir: TempDir,
    pub store: Arc<SqliteStore>,
    pub pipeline: Pipeline,
}

impl TestHarness {
    /// Default harness: OCR off, enrichment off.
    pub fn new() -> Self {
        Self::with_settings(Self::base_settings())
    }

    /// Harness whose enrichment client points at an unroutable endpoint,
    /// so every enrichment call fails with a transport error.
    pub fn with_unreachable_enrichment() -> Self {
        let mut settings = Self::base_settings();
        settings.enrichment = EnrichmentSettings {
            enabled: true,
            api_key: Some("test-key".to_string()),
            base_url: "http://127.0.0.1:9/v1".to_string(),
            ..EnrichmentSettings::default()
        };
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: PipelineSettings) -> Self {
        // First call wins; later harnesses reuse the subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(SqliteStore::open_in_memory().expect("Failed to open store"));
        let pipeline = Pipeline::new(settings, store.clone());

        Self {
            temp_dir,
            store,
            pipeline,
        }
    }

    pub fn base_settings() -> PipelineSettings {
        PipelineSettings {
            ocr: OcrSettings {
                enabled: false,
                ..OcrSettings::default()
            },
            ..PipelineSettings::default()
        }
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `bytes` under the harness temp dir and registers a Pending
    /// document pointing at it.
    pub fn create_document_from_bytes(&self, file_name: &str, bytes: &[u8]) -> DocumentRow {
        let path = self.write_file(file_name, bytes);
        self.store
            .create_document(NewDocument {
                title: file_name.to_string(),
                file_path: path.to_string_lossy().to_string(),
                language: None,
            })
            .expect("Failed to create document")
    }

    pub fn create_text_document(&self, file_name: &str, content: &str) -> DocumentRow {
        self.create_document_from_bytes(file_name, content.as_bytes())
    }

    fn write_file(&self, file_name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(file_name);
        std::fs::write(&path, bytes).expect("Failed to write fixture file");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
