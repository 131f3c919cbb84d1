use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ExtractError;
use crate::extract::{DocumentFormat, Extraction, TextExtractor};

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocxExtractor {
    fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let _span = tracing::info_span!("extract.docx").entered();

        let file = std::fs::File::open(path).map_err(|e| ExtractError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ExtractError::DocxExtraction(format!("Failed to open DOCX: {}", e)))?;

        let text = extract_document_xml(&mut archive)?;

        Ok(Extraction {
            text,
            page_count: 0,
        })
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Docx)
    }
}

fn extract_document_xml<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, ExtractError> {
    let mut document_xml = archive.by_name("word/document.xml").map_err(|e| {
        ExtractError::DocxExtraction(format!("Failed to find document.xml: {}", e))
    })?;

    let mut xml_content = String::new();
    document_xml.read_to_string(&mut xml_content).map_err(|e| {
        ExtractError::DocxExtraction(format!("Failed to read document.xml: {}", e))
    })?;

    parse_paragraphs(&xml_content)
}

/// Collects `<w:t>` runs; each `<w:p>` paragraph becomes one line.
fn parse_paragraphs(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut text = String::new();
    let mut in_text_run = false;
    let mut in_paragraph = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = true,
                b"p" => in_paragraph = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    if in_paragraph {
                        text.push('\n');
                        in_paragraph = false;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_run {
                    let decoded = e
                        .decode()
                        .ok()
                        .and_then(|d| quick_xml::escape::unescape(&d).ok().map(|u| u.into_owned()))
                        .unwrap_or_default();
                    text.push_str(&decoded);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::DocxExtraction(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(text)
}
