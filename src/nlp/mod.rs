pub mod entities;
pub mod keywords;
pub mod sentiment;
pub mod summary;

pub use entities::{Entity, EntityType};

/// Facade over the analysis primitives. One instance is shared across
/// pipeline runs; all operations are deterministic for identical input.
pub struct NlpAnalyzer;

impl NlpAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_entities(&self, text: &str) -> Vec<Entity> {
        entities::tag(text)
    }

    /// Top `limit` keywords as (token, count), most frequent first.
    pub fn extract_keywords(&self, text: &str, limit: usize) -> Vec<(String, usize)> {
        keywords::extract(text, limit)
    }

    /// Compound sentiment score in [-1.0, 1.0].
    pub fn analyze_sentiment(&self, text: &str) -> f64 {
        sentiment::compound_score(text)
    }

    /// Extractive summary of at most `limit` sentences.
    pub fn summarize(&self, text: &str, limit: usize) -> String {
        summary::summarize(text, limit)
    }
}

impl Default for NlpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_end_to_end() {
        let analyzer = NlpAnalyzer::new();
        let text = "Alice works at Acme Corp in Paris since 2020.";

        let entities = analyzer.extract_entities(text);
        assert!(!entities.is_empty());

        let keywords = analyzer.extract_keywords(text, 10);
        assert!(keywords.iter().any(|(w, _)| w == "works"));

        let sentiment = analyzer.analyze_sentiment(text);
        assert!((-1.0..=1.0).contains(&sentiment));

        // Single sentence: identity case.
        assert_eq!(analyzer.summarize(text, 3), text);
    }
}
