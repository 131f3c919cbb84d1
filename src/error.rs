use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocsenseError {
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Storage error: {0}")]
    Store(#[from] crate::db::StoreError),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract PDF text: {0}")]
    PdfExtraction(String),

    #[error("Failed to extract DOCX text: {0}")]
    DocxExtraction(String),

    #[error("Failed to process image: {0}")]
    ImageExtraction(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),
}

pub type Result<T> = std::result::Result<T, DocsenseError>;
