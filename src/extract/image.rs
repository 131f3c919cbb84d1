use std::path::Path;

use crate::error::ExtractError;
use crate::extract::ocr::OcrEngine;
use crate::extract::{DocumentFormat, Extraction, TextExtractor};

pub struct ImageExtractor {
    ocr: Option<OcrEngine>,
}

impl ImageExtractor {
    pub fn new(ocr: OcrEngine) -> Self {
        Self { ocr: Some(ocr) }
    }

    pub fn without_ocr() -> Self {
        Self { ocr: None }
    }
}

impl TextExtractor for ImageExtractor {
    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let _span = tracing::info_span!("extract.image").entered();

        let image_data = std::fs::read(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        // An image without OCR has no text to extract; failing beats
        // returning an empty string that masks the misconfiguration.
        let ocr = self.ocr.as_ref().ok_or_else(|| {
            ExtractError::OcrFailed(format!(
                "OCR is disabled; cannot extract text from image '{}'",
                path.display()
            ))
        })?;

        let text = ocr.recognize_bytes(&image_data)?;

        Ok(Extraction {
            text,
            page_count: 1,
        })
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_image_format() {
        let extractor = ImageExtractor::without_ocr();
        assert!(extractor.supports(DocumentFormat::Image));
        assert!(!extractor.supports(DocumentFormat::Pdf));
        assert!(!extractor.supports(DocumentFormat::Text));
        assert!(!extractor.supports(DocumentFormat::Docx));
    }

    #[test]
    fn test_without_ocr_fails_rather_than_returning_empty() {
        let temp_file = tempfile::NamedTempFile::with_suffix(".png").unwrap();
        std::fs::write(temp_file.path(), b"fake image bytes").unwrap();

        let extractor = ImageExtractor::without_ocr();
        let result = extractor.extract(temp_file.path());

        match result {
            Err(ExtractError::OcrFailed(msg)) => assert!(msg.contains("OCR is disabled")),
            _ => panic!("Expected OcrFailed when OCR is unavailable"),
        }
    }

    #[test]
    fn test_missing_file_error() {
        let extractor = ImageExtractor::without_ocr();
        let result = extractor.extract(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(ExtractError::ReadDocument { .. })));
    }
}
