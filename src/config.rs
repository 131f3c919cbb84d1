use serde::{Deserialize, Serialize};

/// Settings for a pipeline instance. Passed explicitly to
/// [`Pipeline::new`](crate::pipeline::Pipeline::new) — pipeline code never
/// reads process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Minimum number of non-whitespace characters required after
    /// extraction before analysis is attempted.
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Number of keywords reported per document.
    #[serde(default = "default_keyword_count")]
    pub keyword_count: usize,

    /// Number of sentences in the extractive summary.
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,

    #[serde(default)]
    pub ocr: OcrSettings,

    #[serde(default)]
    pub enrichment: EnrichmentSettings,
}

fn default_min_text_length() -> usize {
    10
}

fn default_keyword_count() -> usize {
    10
}

fn default_summary_sentences() -> usize {
    3
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            keyword_count: default_keyword_count(),
            summary_sentences: default_summary_sentences(),
            ocr: OcrSettings::default(),
            enrichment: EnrichmentSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Tesseract recognition language, e.g. "eng" or "eng+deu".
    #[serde(default = "default_ocr_language")]
    pub language: String,

    /// Optional tessdata directory for the Tesseract engine.
    #[serde(default)]
    pub data_path: Option<String>,

    /// Rendering resolution used when rasterizing PDF pages for OCR.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_true() -> bool {
    true
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_dpi() -> u32 {
    300
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_ocr_language(),
            data_path: None,
            dpi: default_dpi(),
        }
    }
}

/// Settings for the optional external generative-language stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentSettings {
    #[serde(default)]
    pub enabled: bool,

    /// API credential. Wrapped in a `SecretString` as soon as it reaches
    /// the client; never logged.
    #[serde(default)]
    pub api_key: Option<String>,

    /// OpenAI-compatible endpoint root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when advanced mode is not requested.
    #[serde(default = "default_fast_model")]
    pub fast_model: String,

    /// Candidate models for advanced mode; the first entry is used.
    #[serde(default = "default_advanced_models")]
    pub advanced_models: Vec<String>,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_fast_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_advanced_models() -> Vec<String> {
    vec![
        "llama3-70b-8192".to_string(),
        "mixtral-8x7b-32768".to_string(),
        "gemma-7b-it".to_string(),
    ]
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: default_base_url(),
            fast_model: default_fast_model(),
            advanced_models: default_advanced_models(),
        }
    }
}
