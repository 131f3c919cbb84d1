//! Property-style tests for the analysis primitives through the public API.

use docsense::NlpAnalyzer;

#[test]
fn test_keyword_extraction_properties() {
    let analyzer = NlpAnalyzer::new();
    let text = "Contract renewal terms: the contract covers renewal of the service contract \
                and renewal schedules for every service region.";

    let keywords = analyzer.extract_keywords(text, 10);

    // Bounded, ordered by descending count.
    assert!(keywords.len() <= 10);
    for pair in keywords.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }

    // Case-insensitive counting, stopwords excluded.
    assert_eq!(keywords[0].0, "contract");
    assert_eq!(keywords[0].1, 3);
    assert!(keywords.iter().all(|(w, _)| w != "the" && w != "and"));

    // Short tokens are dropped.
    assert!(keywords.iter().all(|(w, _)| w.chars().count() > 2));

    // Deterministic.
    assert_eq!(analyzer.extract_keywords(text, 10), keywords);
}

#[test]
fn test_summary_identity_law() {
    let analyzer = NlpAnalyzer::new();

    let one = "A single sentence stays untouched.";
    assert_eq!(analyzer.summarize(one, 3), one);

    let three = "First point. Second point. Third point.";
    assert_eq!(analyzer.summarize(three, 3), three);
}

#[test]
fn test_summary_truncation_preserves_document_order() {
    let analyzer = NlpAnalyzer::new();
    let text = "Filler one. Budget approval review totals outcome. Filler two. \
                Budget forecast revenue margin growth. Filler three.";

    let summary = analyzer.summarize(text, 2);

    let first = summary.find("Budget approval").expect("first budget sentence");
    let second = summary.find("Budget forecast").expect("second budget sentence");
    assert!(first < second);
    assert!(!summary.contains("Filler one"));
}

#[test]
fn test_sentiment_bounds_hold_for_arbitrary_inputs() {
    let analyzer = NlpAnalyzer::new();
    let samples = [
        "",
        " ",
        "completely neutral sentence about scheduling",
        "wonderful amazing excellent fantastic superb outstanding",
        "terrible awful horrible disaster failure tragedy",
        "not good not bad",
        "1234 5678 !@#$",
    ];
    for sample in samples {
        let score = analyzer.analyze_sentiment(sample);
        assert!(
            (-1.0..=1.0).contains(&score),
            "score {} out of bounds for {:?}",
            score,
            sample
        );
    }
    assert_eq!(analyzer.analyze_sentiment(""), 0.0);
}

#[test]
fn test_entity_extraction_is_deterministic() {
    let analyzer = NlpAnalyzer::new();
    let text = "Dr. Chen joined Globex Corporation in Tokyo on June 10, 2023 with a 15% raise.";

    let first = analyzer.extract_entities(text);
    assert!(!first.is_empty());
    for _ in 0..5 {
        assert_eq!(analyzer.extract_entities(text), first);
    }
}
