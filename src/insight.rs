//! Client for the external generative-language service (an
//! OpenAI-compatible chat-completions endpoint). The pipeline treats every
//! error from this module as non-fatal.

use std::time::Duration;

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EnrichmentSettings;
use crate::nlp::EntityType;

/// Input text is cut to this many characters before transmission; long
/// documents are never sent in full.
const PROMPT_CHAR_BUDGET: usize = 4000;

/// Maximum length for error bodies carried in `InsightError::Api`, to keep
/// sensitive or huge responses out of logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const ANALYZE_TEMPERATURE: f32 = 0.3;
const ENTITY_TEMPERATURE: f32 = 0.2;
const INSIGHT_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("API credential is not configured")]
    MissingCredential,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Service returned no completion choices")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Free-form analysis (or insights) text with the model that produced it.
#[derive(Debug, Clone)]
pub struct DocumentInsight {
    pub model: String,
    pub text: String,
    pub advanced: bool,
    pub usage: Option<TokenUsage>,
}

/// Structured entities returned by the service.
#[derive(Debug, Clone)]
pub struct InsightEntities {
    pub model: String,
    pub entities: Vec<RemoteEntity>,
    pub advanced: bool,
    pub usage: Option<TokenUsage>,
}

/// One entity as described by the service. Fields default rather than
/// fail: model output is not trusted to be well-formed.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntity {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RemoteEntity {
    pub fn entity_type(&self) -> EntityType {
        EntityType::parse(self.kind.as_deref().unwrap_or("other"))
    }
}

#[derive(Debug, Default, Deserialize)]
struct EntityEnvelope {
    #[serde(default)]
    entities: Vec<RemoteEntity>,
}

pub struct InsightClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    fast_model: String,
    advanced_model: String,
}

impl InsightClient {
    pub fn new(settings: &EnrichmentSettings) -> Result<Self, InsightError> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(InsightError::MissingCredential)?;

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let advanced_model = settings
            .advanced_models
            .first()
            .cloned()
            .unwrap_or_else(|| settings.fast_model.clone());

        Ok(Self {
            http,
            api_key: SecretString::from(api_key.to_string()),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            fast_model: settings.fast_model.clone(),
            advanced_model,
        })
    }

    fn model_for(&self, advanced: bool) -> &str {
        if advanced {
            &self.advanced_model
        } else {
            &self.fast_model
        }
    }

    /// Consolidated analysis: summary, themes, entities, sentiment, facts.
    pub fn analyze(&self, text: &str, advanced: bool) -> Result<DocumentInsight, InsightError> {
        let model = self.model_for(advanced);
        let prompt = format!(
            "Analyze the following document text and provide a comprehensive analysis including:\n\
             1. A concise summary (max 100 words)\n\
             2. Main themes and topics\n\
             3. Key entities (people, organizations, locations, dates)\n\
             4. The overall sentiment (positive, neutral, negative)\n\
             5. Important facts extracted from the document\n\n\
             Text:\n{}",
            truncate_chars(text, PROMPT_CHAR_BUDGET)
        );

        let (content, usage) = self.chat(
            model,
            "You are an AI assistant that specializes in document analysis.",
            &prompt,
            ANALYZE_TEMPERATURE,
        )?;

        Ok(DocumentInsight {
            model: model.to_string(),
            text: content,
            advanced,
            usage,
        })
    }

    /// Structured entity extraction. Malformed model output degrades to an
    /// empty entity list; only transport/API problems are errors.
    pub fn extract_entities(
        &self,
        text: &str,
        advanced: bool,
    ) -> Result<InsightEntities, InsightError> {
        let model = self.model_for(advanced);
        let prompt = format!(
            "Extract all named entities from the following text. For each entity, provide:\n\
             1. The entity text\n\
             2. Entity type (person, organization, location, date, event, product, etc.)\n\
             3. A brief description of the entity if possible\n\n\
             Format the response as a JSON object with an \"entities\" array.\n\n\
             Text:\n{}",
            truncate_chars(text, PROMPT_CHAR_BUDGET)
        );

        let (content, usage) = self.chat(
            model,
            "You are an AI assistant that specializes in named entity recognition.",
            &prompt,
            ENTITY_TEMPERATURE,
        )?;

        Ok(InsightEntities {
            model: model.to_string(),
            entities: parse_entities(&content),
            advanced,
            usage,
        })
    }

    /// Free-form deeper analysis; the pipeline only requests this in
    /// advanced mode.
    pub fn generate_insights(
        &self,
        text: &str,
        advanced: bool,
    ) -> Result<DocumentInsight, InsightError> {
        let model = self.model_for(advanced);
        let prompt = format!(
            "Generate valuable insights from the following document text. Include:\n\
             1. Unexpected connections or patterns\n\
             2. Important implications\n\
             3. Potential action items\n\
             4. Questions that should be explored further\n\n\
             Text:\n{}",
            truncate_chars(text, PROMPT_CHAR_BUDGET)
        );

        let (content, usage) = self.chat(
            model,
            "You are an AI assistant that specializes in analyzing documents and generating valuable insights.",
            &prompt,
            INSIGHT_TEMPERATURE,
        )?;

        Ok(DocumentInsight {
            model: model.to_string(),
            text: content,
            advanced,
            usage,
        })
    }

    fn chat(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<(String, Option<TokenUsage>), InsightError> {
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InsightError::Api {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: ChatResponse = response.json()?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(InsightError::EmptyResponse)?;

        Ok((content, parsed.usage))
    }
}

/// Cuts at a character boundary, never mid-codepoint.
fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let cut = truncate_chars(body, MAX_ERROR_BODY_LENGTH);
        format!("{}... (truncated)", cut)
    } else {
        body.to_string()
    }
}

/// Pulls the first `{` .. last `}` span out of the completion and tries to
/// parse it. Anything that fails to parse yields an empty list.
fn parse_entities(content: &str) -> Vec<RemoteEntity> {
    let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    serde_json::from_str::<EntityEnvelope>(&content[start..=end])
        .map(|envelope| envelope.entities)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> EnrichmentSettings {
        EnrichmentSettings {
            enabled: true,
            api_key: Some("test-key".to_string()),
            ..EnrichmentSettings::default()
        }
    }

    #[test]
    fn test_missing_credential() {
        let settings = EnrichmentSettings {
            enabled: true,
            api_key: None,
            ..EnrichmentSettings::default()
        };
        assert!(matches!(
            InsightClient::new(&settings),
            Err(InsightError::MissingCredential)
        ));

        let settings = EnrichmentSettings {
            api_key: Some(String::new()),
            ..settings
        };
        assert!(matches!(
            InsightClient::new(&settings),
            Err(InsightError::MissingCredential)
        ));
    }

    #[test]
    fn test_model_selection() {
        let client = InsightClient::new(&test_settings()).unwrap();
        assert_eq!(client.model_for(false), "llama3-8b-8192");
        assert_eq!(client.model_for(true), "llama3-70b-8192");
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let settings = EnrichmentSettings {
            base_url: "https://example.test/v1/".to_string(),
            ..test_settings()
        };
        let client = InsightClient::new(&settings).unwrap();
        assert_eq!(client.base_url, "https://example.test/v1");
    }

    #[test]
    fn test_truncate_chars_within_budget() {
        assert_eq!(truncate_chars("short", 4000), "short");
    }

    #[test]
    fn test_truncate_chars_multibyte_boundary() {
        let text = "é".repeat(10);
        let cut = truncate_chars(&text, 4);
        assert_eq!(cut.chars().count(), 4);
        assert_eq!(cut, "éééé");
    }

    #[test]
    fn test_parse_entities_clean_json() {
        let content = r#"{"entities": [{"text": "Alice", "type": "person"}]}"#;
        let entities = parse_entities(content);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Alice");
        assert_eq!(entities[0].entity_type(), EntityType::Person);
    }

    #[test]
    fn test_parse_entities_json_wrapped_in_prose() {
        let content = "Sure! Here are the entities:\n\
                       {\"entities\": [{\"text\": \"Acme Corp\", \"type\": \"organization\"}]}\n\
                       Let me know if you need more.";
        let entities = parse_entities(content);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_type(), EntityType::Organization);
    }

    #[test]
    fn test_parse_entities_malformed_returns_empty() {
        assert!(parse_entities("no json here at all").is_empty());
        assert!(parse_entities("{broken json").is_empty());
        assert!(parse_entities("} reversed {").is_empty());
        assert!(parse_entities("").is_empty());
    }

    #[test]
    fn test_parse_entities_missing_fields_default() {
        let content = r#"{"entities": [{"type": "person"}, {"text": "Paris"}]}"#;
        let entities = parse_entities(content);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "");
        assert_eq!(entities[1].entity_type(), EntityType::Other);
    }

    #[test]
    fn test_unknown_remote_type_maps_to_other() {
        let entity = RemoteEntity {
            text: "thing".to_string(),
            kind: Some("whatsit".to_string()),
            description: None,
        };
        assert_eq!(entity.entity_type(), EntityType::Other);
    }

    #[test]
    fn test_truncate_body() {
        let short = "brief error";
        assert_eq!(truncate_body(short), short);

        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("... (truncated)"));
        assert!(truncated.len() < 250);
    }
}
