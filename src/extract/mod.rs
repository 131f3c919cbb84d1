pub mod docx;
pub mod image;
pub mod ocr;
pub mod pdf;
pub mod text;

use std::path::Path;

use crate::config::OcrSettings;
use crate::error::ExtractError;

pub use ocr::OcrEngine;

/// Document format, resolved once from the file extension at ingestion.
/// Dispatch never sniffs file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
    Image,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" | "text" | "md" => Some(Self::Text),
            "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(extension)
            .ok_or_else(|| ExtractError::UnsupportedFormat(extension.to_string()))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Text => "txt",
            Self::Image => "png",
        }
    }
}

/// Result of running an extractor over a document file.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    /// Page count where the format has the notion of pages; 0 otherwise.
    pub page_count: usize,
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn new(settings: &OcrSettings) -> Self {
        let mut extractors: Vec<Box<dyn TextExtractor>> =
            vec![Box::new(text::PlainTextExtractor::new())];

        if settings.enabled {
            let engine = OcrEngine::new(
                &settings.language,
                settings.data_path.as_deref(),
                settings.dpi,
            );
            extractors.push(Box::new(image::ImageExtractor::new(engine.clone())));
            extractors.push(Box::new(pdf::PdfExtractor::new(Some(engine))));
        } else {
            extractors.push(Box::new(image::ImageExtractor::without_ocr()));
            extractors.push(Box::new(pdf::PdfExtractor::new(None)));
        }
        extractors.push(Box::new(docx::DocxExtractor::new()));

        Self { extractors }
    }

    /// Extract with a pre-resolved format.
    pub fn extract(&self, path: &Path, format: DocumentFormat) -> Result<Extraction, ExtractError> {
        for extractor in &self.extractors {
            if extractor.supports(format) {
                return extractor.extract(path);
            }
        }
        Err(ExtractError::UnsupportedFormat(
            format.extension().to_string(),
        ))
    }

    /// Resolve the format from the path's extension, then extract.
    pub fn extract_path(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let format = DocumentFormat::from_path(path)?;
        self.extract(path, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OcrSettings;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn registry_without_ocr() -> ExtractorRegistry {
        ExtractorRegistry::new(&OcrSettings {
            enabled: false,
            ..OcrSettings::default()
        })
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("txt"), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::from_extension("jpeg"), Some(DocumentFormat::Image));
        assert_eq!(DocumentFormat::from_extension("tif"), Some(DocumentFormat::Image));
        assert_eq!(DocumentFormat::from_extension("xyz"), None);
        assert_eq!(DocumentFormat::from_extension(""), None);
    }

    #[test]
    fn test_registry_routes_text_format() {
        let registry = registry_without_ocr();

        let mut temp_file = NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(temp_file, "Test content").unwrap();

        let extraction = registry.extract_path(temp_file.path()).unwrap();
        assert!(extraction.text.contains("Test content"));
    }

    #[test]
    fn test_unsupported_extension_error() {
        let registry = registry_without_ocr();

        let temp_file = NamedTempFile::with_suffix(".xyz").unwrap();
        std::fs::write(temp_file.path(), b"some content").unwrap();

        match registry.extract_path(temp_file.path()) {
            Err(ExtractError::UnsupportedFormat(ext)) => assert_eq!(ext, "xyz"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other.map(|e| e.text)),
        }
    }

    #[test]
    fn test_no_extension_error() {
        let registry = registry_without_ocr();

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("noextension");
        std::fs::write(&file_path, b"some content").unwrap();

        match registry.extract_path(&file_path) {
            Err(ExtractError::UnsupportedFormat(ext)) => assert_eq!(ext, ""),
            other => panic!("Expected UnsupportedFormat, got {:?}", other.map(|e| e.text)),
        }
    }

    #[test]
    fn test_missing_file_error() {
        let registry = registry_without_ocr();
        let result = registry.extract_path(Path::new("/nonexistent/path/file.txt"));
        assert!(matches!(result, Err(ExtractError::ReadDocument { .. })));
    }
}
