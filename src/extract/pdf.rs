use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ExtractError;
use crate::extract::ocr::OcrEngine;
use crate::extract::{DocumentFormat, Extraction, TextExtractor};

pub struct PdfExtractor {
    ocr: Option<OcrEngine>,
}

impl PdfExtractor {
    pub fn new(ocr: Option<OcrEngine>) -> Self {
        Self { ocr }
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let _span = tracing::info_span!("extract.pdf").entered();

        let pdf_bytes = std::fs::read(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let doc = lopdf::Document::load_mem(&pdf_bytes)
            .map_err(|e| ExtractError::PdfExtraction(format!("Failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        let page_count = pages.len();

        // Text layer, page order, blank line between pages.
        let mut text = String::new();
        for (page_num, _) in &pages {
            let page_text = doc.extract_text(&[*page_num]).map_err(|e| {
                ExtractError::PdfExtraction(format!(
                    "Failed to extract text from page {}: {}",
                    page_num, e
                ))
            })?;
            text.push_str(&page_text);
            text.push_str("\n\n");
        }

        // Scanned PDFs have no usable text layer. If an OCR engine is
        // configured, rasterize the pages and recognize them instead.
        if text_layer_unusable(&text) {
            if let Some(ref ocr) = self.ocr {
                let _ocr_span = tracing::info_span!("extract.pdf_ocr_fallback").entered();
                text = ocr_pages(&pdf_bytes, ocr)?;
            }
        }

        Ok(Extraction { text, page_count })
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Pdf)
    }
}

/// Marker lopdf emits for CID fonts it cannot decode.
const IDENTITY_H_PATTERN: &str = "?Identity-H Unimplemented?";

/// Below this many characters the alphanumeric-ratio check does not apply.
const MIN_TOTAL_CHARS: usize = 50;

/// Minimum percentage of alphanumeric characters for a text layer to count
/// as usable.
const MIN_ALPHANUMERIC_PERCENT: usize = 10;

/// A text layer is unusable when it is empty, consists only of font
/// decoding markers, or is overwhelmingly non-alphanumeric garbage.
fn text_layer_unusable(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }

    let cleaned = trimmed
        .replace(IDENTITY_H_PATTERN, "")
        .replace(['\n', ' '], "");
    if cleaned.is_empty() {
        return true;
    }

    let total_chars = trimmed.chars().count();
    let alphanumeric_chars = trimmed.chars().filter(|c| c.is_alphanumeric()).count();

    total_chars > MIN_TOTAL_CHARS
        && alphanumeric_chars * 100 < total_chars * MIN_ALPHANUMERIC_PERCENT
}

fn ocr_pages(pdf_bytes: &[u8], ocr: &OcrEngine) -> Result<String, ExtractError> {
    let page_images = rasterize_pages(pdf_bytes, ocr.dpi())?;

    let mut text = String::new();
    let mut result = Ok(());
    for image_path in &page_images {
        match ocr.recognize_file(image_path) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    for image_path in &page_images {
        let _ = std::fs::remove_file(image_path);
    }

    result.map(|_| text)
}

/// Renders every page to a PNG via pdftoppm (poppler-utils). Returns the
/// rendered files in page order; the caller removes them.
fn rasterize_pages(pdf_bytes: &[u8], dpi: u32) -> Result<Vec<PathBuf>, ExtractError> {
    let temp_dir = std::env::temp_dir();
    let token = uuid::Uuid::new_v4();
    let pdf_path = temp_dir.join(format!("docsense_{}.pdf", token));
    let prefix = temp_dir.join(format!("docsense_{}_page", token));

    std::fs::write(&pdf_path, pdf_bytes)
        .map_err(|e| ExtractError::PdfExtraction(format!("Failed to write temp PDF: {}", e)))?;

    let output = Command::new("pdftoppm")
        .arg("-png")
        .arg("-r")
        .arg(dpi.to_string())
        .arg(&pdf_path)
        .arg(&prefix)
        .output()
        .map_err(|e| {
            let _ = std::fs::remove_file(&pdf_path);
            ExtractError::PdfExtraction(format!(
                "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                e
            ))
        })?;

    let _ = std::fs::remove_file(&pdf_path);

    if !output.status.success() {
        return Err(ExtractError::PdfExtraction(format!(
            "pdftoppm failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    // pdftoppm appends zero-padded page numbers of a uniform width, so a
    // lexicographic sort restores page order.
    let prefix_name = prefix
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let entries = std::fs::read_dir(&temp_dir).map_err(|e| {
        ExtractError::PdfExtraction(format!("Failed to list rendered pages: {}", e))
    })?;

    let mut pages: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix_name) && n.ends_with(".png"))
        })
        .collect();
    pages.sort();

    if pages.is_empty() {
        return Err(ExtractError::PdfExtraction(
            "pdftoppm produced no page images".to_string(),
        ));
    }

    Ok(pages)
}
