use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::error::ExtractError;

/// Tesseract OCR engine handle. Cloning is cheap (inner `Arc`).
#[derive(Clone)]
pub struct OcrEngine {
    inner: Arc<OcrEngineInner>,
}

struct OcrEngineInner {
    language: String,
    data_path: Option<String>,
    dpi: u32,
}

impl OcrEngine {
    pub fn new(language: &str, data_path: Option<&str>, dpi: u32) -> Self {
        let language = if language.is_empty() {
            "eng".to_string()
        } else {
            language.to_string()
        };

        Self {
            inner: Arc::new(OcrEngineInner {
                language,
                data_path: data_path.map(str::to_string),
                dpi,
            }),
        }
    }

    pub fn dpi(&self) -> u32 {
        self.inner.dpi
    }

    pub fn language(&self) -> &str {
        &self.inner.language
    }

    pub fn recognize_file(&self, image_path: &Path) -> Result<String, ExtractError> {
        let data = std::fs::read(image_path).map_err(|e| ExtractError::ReadDocument {
            path: image_path.to_path_buf(),
            source: e,
        })?;
        self.recognize_bytes(&data)
    }

    pub fn recognize_bytes(&self, image_data: &[u8]) -> Result<String, ExtractError> {
        let _span = tracing::info_span!("extract.ocr").entered();

        let img = image::load_from_memory(image_data)
            .map_err(|e| ExtractError::OcrFailed(format!("Failed to load image: {}", e)))?;

        // Normalize to PNG in memory for leptess.
        let mut png_data = Vec::new();
        let mut cursor = Cursor::new(&mut png_data);
        img.write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|e| ExtractError::OcrFailed(format!("Failed to convert image: {}", e)))?;

        let mut engine = leptess::LepTess::new(self.inner.data_path.as_deref(), &self.inner.language)
            .map_err(|e| {
                ExtractError::OcrFailed(format!("Failed to initialize Tesseract: {}", e))
            })?;

        engine
            .set_image_from_mem(&png_data)
            .map_err(|e| ExtractError::OcrFailed(format!("Failed to set image for OCR: {}", e)))?;

        engine
            .get_utf8_text()
            .map_err(|e| ExtractError::OcrFailed(format!("Text recognition failed: {}", e)))
    }
}
