/// Lexicon-based sentiment scoring. Token valences are summed (with a sign
/// flip after a nearby negator) and normalized into a compound score in
/// [-1.0, 1.0].

/// Normalization constant for the compound score.
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Dampened sign flip applied to a valence in negated context.
const NEGATION_SCALAR: f64 = -0.74;

/// How many preceding tokens are checked for a negator.
const NEGATION_WINDOW: usize = 3;

const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "neither", "nor", "cannot", "without", "hardly", "scarcely",
    "aint", "cant", "couldnt", "didnt", "doesnt", "dont", "isnt", "shouldnt", "wasnt", "werent",
    "wont", "wouldnt",
];

/// Word polarity lexicon, valences on a -4..4 scale.
const LEXICON: &[(&str, f64)] = &[
    ("abandon", -2.0),
    ("abuse", -3.0),
    ("admire", 2.0),
    ("adore", 3.0),
    ("afraid", -2.0),
    ("amazing", 3.0),
    ("anger", -3.0),
    ("angry", -3.0),
    ("annoy", -2.0),
    ("annoying", -2.0),
    ("anxious", -2.0),
    ("appreciate", 2.0),
    ("arrogant", -2.0),
    ("awesome", 3.0),
    ("awful", -3.0),
    ("bad", -2.5),
    ("beautiful", 3.0),
    ("benefit", 2.0),
    ("best", 3.0),
    ("betray", -3.0),
    ("boring", -2.0),
    ("breakthrough", 3.0),
    ("brilliant", 3.0),
    ("broken", -2.0),
    ("calm", 1.5),
    ("careless", -2.0),
    ("celebrate", 3.0),
    ("charming", 2.0),
    ("cheerful", 2.0),
    ("clean", 1.5),
    ("clever", 2.0),
    ("comfort", 2.0),
    ("complain", -2.0),
    ("confident", 2.0),
    ("confuse", -2.0),
    ("crash", -2.0),
    ("creative", 2.0),
    ("crisis", -3.0),
    ("cruel", -3.0),
    ("damage", -2.0),
    ("danger", -2.5),
    ("dead", -3.0),
    ("defeat", -2.0),
    ("delight", 3.0),
    ("depressed", -3.0),
    ("despair", -3.0),
    ("destroy", -3.0),
    ("dirty", -2.0),
    ("disappoint", -2.5),
    ("disaster", -3.0),
    ("dishonest", -2.5),
    ("dislike", -2.0),
    ("doubt", -1.5),
    ("dread", -2.5),
    ("dull", -1.5),
    ("eager", 2.0),
    ("easy", 1.5),
    ("efficient", 2.0),
    ("elegant", 2.0),
    ("embarrass", -2.0),
    ("encourage", 2.0),
    ("enjoy", 2.0),
    ("enthusiastic", 2.5),
    ("error", -2.0),
    ("evil", -3.0),
    ("excellent", 3.0),
    ("excited", 2.5),
    ("exciting", 2.5),
    ("fail", -2.5),
    ("failure", -2.5),
    ("fantastic", 3.0),
    ("fault", -2.0),
    ("favorite", 2.0),
    ("fear", -2.5),
    ("fine", 1.0),
    ("flawless", 3.0),
    ("fool", -2.0),
    ("fortunate", 2.0),
    ("fraud", -3.0),
    ("fresh", 1.5),
    ("friendly", 2.0),
    ("frustrate", -2.5),
    ("fun", 2.0),
    ("generous", 2.0),
    ("gentle", 1.5),
    ("glad", 2.0),
    ("gloomy", -2.0),
    ("good", 2.0),
    ("great", 2.5),
    ("greed", -2.5),
    ("grief", -3.0),
    ("happy", 2.5),
    ("harm", -2.5),
    ("hate", -3.0),
    ("hazard", -2.0),
    ("healthy", 2.0),
    ("helpful", 2.0),
    ("hero", 2.5),
    ("honest", 2.0),
    ("hope", 1.5),
    ("hopeful", 2.0),
    ("horrible", -3.0),
    ("hurt", -2.5),
    ("ideal", 2.5),
    ("impressive", 2.5),
    ("improve", 2.0),
    ("inferior", -2.0),
    ("innovative", 2.0),
    ("inspire", 2.5),
    ("insult", -2.5),
    ("intelligent", 2.0),
    ("interesting", 1.5),
    ("jealous", -2.0),
    ("joy", 3.0),
    ("kind", 2.0),
    ("lazy", -1.5),
    ("liar", -3.0),
    ("like", 1.5),
    ("lose", -2.0),
    ("loss", -2.0),
    ("lost", -2.0),
    ("love", 3.0),
    ("lovely", 2.5),
    ("loyal", 2.0),
    ("lucky", 2.0),
    ("mad", -2.5),
    ("magnificent", 3.0),
    ("mediocre", -1.5),
    ("miserable", -3.0),
    ("mistake", -2.0),
    ("motivated", 2.0),
    ("negative", -1.5),
    ("nice", 2.0),
    ("optimistic", 2.0),
    ("outstanding", 3.0),
    ("pain", -2.5),
    ("panic", -2.5),
    ("peaceful", 2.0),
    ("perfect", 3.0),
    ("pessimistic", -2.0),
    ("pleasant", 2.0),
    ("pleased", 2.0),
    ("pleasure", 2.5),
    ("poor", -2.0),
    ("positive", 2.0),
    ("praise", 2.5),
    ("pretty", 1.5),
    ("problem", -2.0),
    ("productive", 2.0),
    ("profit", 2.0),
    ("progress", 2.0),
    ("promising", 2.0),
    ("proud", 2.0),
    ("punish", -2.5),
    ("quit", -1.5),
    ("regret", -2.0),
    ("reject", -2.0),
    ("relax", 2.0),
    ("reliable", 2.0),
    ("relief", 2.0),
    ("remarkable", 2.5),
    ("rescue", 2.0),
    ("resent", -2.0),
    ("rich", 2.0),
    ("risk", -1.5),
    ("robust", 2.0),
    ("rude", -2.0),
    ("sad", -2.5),
    ("safe", 2.0),
    ("satisfied", 2.0),
    ("scam", -3.0),
    ("scare", -2.5),
    ("secure", 2.0),
    ("selfish", -2.0),
    ("shame", -2.5),
    ("sick", -2.0),
    ("smart", 2.0),
    ("smile", 2.0),
    ("smooth", 1.5),
    ("solid", 1.5),
    ("sorry", -1.0),
    ("splendid", 3.0),
    ("stable", 1.5),
    ("steal", -3.0),
    ("stress", -2.0),
    ("strong", 2.0),
    ("struggle", -2.0),
    ("stupid", -2.5),
    ("succeed", 2.5),
    ("success", 2.5),
    ("successful", 2.5),
    ("suffer", -2.5),
    ("superb", 3.0),
    ("superior", 2.0),
    ("support", 2.0),
    ("terrible", -3.0),
    ("terrific", 3.0),
    ("thank", 2.0),
    ("thankful", 2.5),
    ("threat", -2.5),
    ("thrilled", 3.0),
    ("tired", -1.5),
    ("tragedy", -3.0),
    ("triumph", 3.0),
    ("trouble", -2.0),
    ("trust", 2.0),
    ("ugly", -2.5),
    ("unfair", -2.0),
    ("unfortunate", -2.0),
    ("unhappy", -2.5),
    ("unreliable", -2.0),
    ("upset", -2.0),
    ("useful", 2.0),
    ("useless", -2.0),
    ("valuable", 2.0),
    ("victory", 3.0),
    ("violent", -3.0),
    ("warm", 1.5),
    ("waste", -2.0),
    ("weak", -2.0),
    ("wealth", 2.0),
    ("welcome", 2.0),
    ("win", 2.5),
    ("winner", 2.5),
    ("wonderful", 3.0),
    ("worry", -2.0),
    ("worse", -2.5),
    ("worst", -3.0),
    ("wrong", -2.0),
];

fn valence(token: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, value)| *value)
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token)
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Compound sentiment score in [-1.0, 1.0]. Defined for every input;
/// text with no lexicon hits (including the empty string) scores 0.0.
pub fn compound_score(text: &str) -> f64 {
    let tokens = tokenize(text);

    let mut total = 0.0;
    for (i, token) in tokens.iter().enumerate() {
        let Some(mut value) = valence(token) else {
            continue;
        };

        let window_start = i.saturating_sub(NEGATION_WINDOW);
        if tokens[window_start..i].iter().any(|t| is_negator(t)) {
            value *= NEGATION_SCALAR;
        }
        total += value;
    }

    if total == 0.0 {
        return 0.0;
    }

    let compound = total / (total * total + NORMALIZATION_ALPHA).sqrt();
    compound.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_scores_zero() {
        assert_eq!(compound_score(""), 0.0);
        assert_eq!(compound_score("   \n\t  "), 0.0);
    }

    #[test]
    fn test_neutral_text_scores_zero() {
        assert_eq!(compound_score("The meeting starts at noon on Tuesday."), 0.0);
    }

    #[test]
    fn test_positive_text_is_positive() {
        let score = compound_score("This is a wonderful, excellent product. I love it.");
        assert!(score > 0.0, "score = {}", score);
    }

    #[test]
    fn test_negative_text_is_negative() {
        let score = compound_score("A terrible, horrible failure. I hate it.");
        assert!(score < 0.0, "score = {}", score);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let plain = compound_score("The results were good.");
        let negated = compound_score("The results were not good.");
        assert!(plain > 0.0);
        assert!(negated < 0.0, "negated score = {}", negated);
    }

    #[test]
    fn test_contraction_negation() {
        let score = compound_score("This isn't good at all.");
        assert!(score < 0.0, "score = {}", score);
    }

    #[test]
    fn test_score_bounded_for_all_inputs() {
        let samples = [
            "",
            "neutral words only",
            "love love love love love love love love love love love love",
            "hate hate hate hate hate hate hate hate hate hate hate hate",
            "good bad good bad good bad",
            "ünïcödé and 日本語のテキスト",
            "!!!???...",
        ];
        for sample in samples {
            let score = compound_score(sample);
            assert!(
                (-1.0..=1.0).contains(&score),
                "score {} out of bounds for {:?}",
                score,
                sample
            );
        }
    }

    #[test]
    fn test_repeated_positive_words_approach_but_stay_within_one() {
        let text = "great ".repeat(200);
        let score = compound_score(&text);
        assert!(score > 0.9);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_deterministic() {
        let text = "A good day with some bad news and a great outcome.";
        let first = compound_score(text);
        for _ in 0..10 {
            assert_eq!(compound_score(text), first);
        }
    }
}
