use std::path::Path;

use crate::error::ExtractError;
use crate::extract::{DocumentFormat, Extraction, TextExtractor};

pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        // UTF-8 first; fall back to Latin-1, which maps every byte.
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => decode_latin1(e.as_bytes()),
        };

        Ok(Extraction {
            text,
            page_count: 0,
        })
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Text)
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
