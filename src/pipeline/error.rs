use thiserror::Error;

use crate::db::StoreError;
use crate::error::ExtractError;

use super::status::DocumentStatus;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unknown document: {0}")]
    UnknownDocument(String),

    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error(
        "Insufficient text extracted from document ({length} characters); check the file format"
    )]
    InsufficientText { length: usize },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),
}
