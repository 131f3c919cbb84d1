use crate::nlp::keywords;

pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

/// How many top keywords participate in sentence scoring.
const SCORING_KEYWORDS: usize = 20;

/// Extractive summary: pick the `limit` highest-scoring sentences, then
/// put the selection back into document order before joining. When the
/// text has at most `limit` sentences it is returned unchanged.
pub fn summarize(text: &str, limit: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= limit {
        return text.to_string();
    }

    let keywords: Vec<String> = keywords::extract(text, SCORING_KEYWORDS)
        .into_iter()
        .map(|(word, _)| word)
        .collect();

    // Score = number of top keywords present (case-insensitive substring).
    let mut scored: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let lowered = sentence.to_lowercase();
            let score = keywords
                .iter()
                .filter(|keyword| lowered.contains(keyword.as_str()))
                .count();
            (index, score)
        })
        .collect();

    // Stable sort: equal scores keep document order within the selection.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let mut selected: Vec<usize> = scored.iter().take(limit).map(|(index, _)| *index).collect();
    selected.sort_unstable();

    selected
        .iter()
        .map(|&index| sentences[index].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits on sentence-terminal punctuation followed by whitespace (or end
/// of input). Terminators stay attached to their sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let boundary = match chars.peek() {
                Some(next) => next.is_whitespace(),
                None => true,
            };
            if boundary {
                let sentence = current.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                current.clear();
            }
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}
