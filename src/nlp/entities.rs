use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Closed entity taxonomy. Any native label a tagger emits is normalized
/// into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Date,
    Money,
    Percentage,
    Product,
    Event,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Location => "location",
            Self::Date => "date",
            Self::Money => "money",
            Self::Percentage => "percentage",
            Self::Product => "product",
            Self::Event => "event",
            Self::Other => "other",
        }
    }

    /// Parses a taxonomy name (as stored, or as returned by the external
    /// service). Anything unrecognized is `Other`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "person" => Self::Person,
            "organization" => Self::Organization,
            "location" => Self::Location,
            "date" => Self::Date,
            "money" => Self::Money,
            "percentage" => Self::Percentage,
            "product" => Self::Product,
            "event" => Self::Event,
            _ => Self::Other,
        }
    }

    /// Maps a tagger's native label into the taxonomy.
    pub fn from_label(label: &str) -> Self {
        match label {
            "PERSON" => Self::Person,
            "ORG" => Self::Organization,
            "GPE" | "LOC" => Self::Location,
            "DATE" | "TIME" => Self::Date,
            "MONEY" => Self::Money,
            "PERCENT" => Self::Percentage,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity mention found in a text. Offsets are character offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub text: String,
    pub entity_type: EntityType,
    pub confidence: f64,
    pub start: usize,
    pub end: usize,
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").unwrap());
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s?%").unwrap());
static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[$€£]\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:thousand|million|billion))?\b|\b\d[\d,]*(?:\.\d+)?\s(?:dollars|euros|pounds|cents|usd|eur|gbp)\b",
    )
    .unwrap()
});
static CALENDAR_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?\b",
    )
    .unwrap()
});
static NUMERIC_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").unwrap());
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:1[89]\d{2}|20\d{2})\b").unwrap());

/// Trailing tokens that mark a capitalized span as an organization.
const ORG_SUFFIXES: &[&str] = &[
    "Corp", "Corporation", "Inc", "Incorporated", "Ltd", "Limited", "LLC", "LLP", "PLC", "Co",
    "Company", "GmbH", "AG", "SA", "NV", "Group", "Holdings", "Partners", "Ventures", "Capital",
    "Bank", "University", "Institute", "Laboratories", "Labs", "Technologies", "Systems",
    "Solutions", "Industries", "Enterprises", "Agency", "Association", "Foundation", "Society",
    "Committee", "Council", "Department", "Ministry", "Bureau", "Commission",
];

/// Known place names recognized as geopolitical entities.
const GAZETTEER: &[&str] = &[
    "Amsterdam", "Athens", "Atlanta", "Auckland", "Austin", "Bangkok", "Barcelona", "Beijing",
    "Berlin", "Boston", "Brussels", "Budapest", "Cairo", "Chicago", "Copenhagen", "Dallas",
    "Delhi", "Denver", "Detroit", "Dubai", "Dublin", "Frankfurt", "Geneva", "Hamburg",
    "Helsinki", "Houston", "Istanbul", "Jakarta", "Johannesburg", "Kyoto", "Lagos", "Lisbon",
    "London", "Madrid", "Melbourne", "Miami", "Milan", "Montreal", "Moscow", "Mumbai", "Munich",
    "Nairobi", "Naples", "Osaka", "Oslo", "Paris", "Philadelphia", "Phoenix", "Prague", "Rome",
    "Seattle", "Seoul", "Shanghai", "Singapore", "Stockholm", "Sydney", "Tokyo", "Toronto",
    "Vancouver", "Vienna", "Warsaw", "Zurich",
    "Hong Kong", "Las Vegas", "Los Angeles", "Mexico City", "New Orleans", "New York",
    "San Francisco", "Cape Town",
    "America", "Argentina", "Australia", "Austria", "Belgium", "Brazil", "Britain", "Canada",
    "Chile", "China", "Denmark", "Egypt", "England", "Finland", "France", "Germany", "Greece",
    "India", "Ireland", "Italy", "Japan", "Kenya", "Mexico", "Netherlands", "Nigeria", "Norway",
    "Poland", "Portugal", "Russia", "Scotland", "Spain", "Sweden", "Switzerland", "Turkey",
    "Wales",
    "New Zealand", "Saudi Arabia", "South Africa", "South Korea", "United Kingdom",
    "United States",
    "Africa", "Antarctica", "Asia", "Europe", "North America", "South America",
    "UK", "US", "USA",
];

/// Capitalized words that start sentences or clauses without naming
/// anything; trimmed from the front of a span before classification.
const SPAN_STARTERS: &[&str] = &[
    "A", "About", "After", "Again", "Against", "All", "Already", "Also", "An", "And", "Another",
    "Any", "Are", "As", "At", "Be", "Been", "Before", "Being", "Between", "Both", "But", "By",
    "Can", "Could", "Dear", "Did", "Do", "Does", "During", "Each", "Even", "Every", "Few",
    "Finally", "First", "For", "From", "Furthermore", "Had", "Has", "Have", "He", "Hello",
    "Her", "Here", "Hi", "His", "How", "However", "I", "If", "In", "Into", "Is", "It", "Its",
    "Just", "Last", "Less", "May", "Meanwhile", "Might", "More", "Moreover", "Most", "Must",
    "My", "Next", "No", "Nor", "Not", "Now", "On", "Once", "Only", "Or", "Other", "Our",
    "Over", "Please", "Second", "Several", "Shall", "She", "Should", "Since", "So", "Some",
    "Still", "Such", "That", "The", "Their", "Then", "There", "Therefore", "These", "They",
    "Third", "This", "Those", "Through", "Thus", "To", "Today", "Tomorrow", "Under", "Until",
    "Was", "We", "Were", "What", "When", "Where", "Which", "While", "Who", "Whom", "Whose",
    "Why", "Will", "With", "Without", "Would", "Yes", "Yesterday", "Yet", "You", "Your",
];

/// Longest span still plausible as a personal name.
const MAX_PERSON_SPAN_WORDS: usize = 3;

#[derive(Debug)]
struct Candidate {
    start: usize,
    end: usize,
    label: &'static str,
}

#[derive(Debug)]
struct Word<'a> {
    core: &'a str,
    start: usize,
    end: usize,
    sentence_end: bool,
}

/// Runs the rule-based tagger over the text. Spans carry native labels
/// (PERSON, ORG, GPE, DATE, MONEY, PERCENT) which are normalized through
/// [`EntityType::from_label`]; the tagger exposes no real confidence, so
/// every mention reports 1.0.
pub fn tag(text: &str) -> Vec<Entity> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    let recognizers: [(&Regex, &'static str); 5] = [
        (&*PERCENT_RE, "PERCENT"),
        (&*MONEY_RE, "MONEY"),
        (&*CALENDAR_DATE_RE, "DATE"),
        (&*NUMERIC_DATE_RE, "DATE"),
        (&*YEAR_RE, "DATE"),
    ];

    for (regex, label) in recognizers {
        for found in regex.find_iter(text) {
            if overlaps_any(&claimed, found.start(), found.end()) {
                continue;
            }
            claimed.push((found.start(), found.end()));
            candidates.push(Candidate {
                start: found.start(),
                end: found.end(),
                label,
            });
        }
    }

    for run in capitalized_runs(text) {
        let Some((start, end, label)) = classify_run(&run) else {
            continue;
        };
        if overlaps_any(&claimed, start, end) {
            continue;
        }
        claimed.push((start, end));
        candidates.push(Candidate { start, end, label });
    }

    candidates.sort_by_key(|c| (c.start, c.end));

    // Convert byte offsets to character offsets in one forward pass.
    let mut cursor = OffsetCursor::new(text);
    candidates
        .into_iter()
        .map(|c| {
            let start = cursor.char_index(c.start);
            let end = cursor.char_index(c.end);
            Entity {
                text: text[c.start..c.end].to_string(),
                entity_type: EntityType::from_label(c.label),
                confidence: 1.0,
                start,
                end,
            }
        })
        .collect()
}

fn overlaps_any(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
    claimed.iter().any(|&(s, e)| start < e && s < end)
}

/// Groups consecutive capitalized tokens. A token ending a sentence closes
/// its run.
fn capitalized_runs(text: &str) -> Vec<Vec<Word<'_>>> {
    let mut runs = Vec::new();
    let mut current: Vec<Word<'_>> = Vec::new();

    for token in TOKEN_RE.find_iter(text) {
        let word = trim_token(token.as_str(), token.start());
        match word {
            Some(word) if is_capitalized(word.core) => {
                let ends_sentence = word.sentence_end;
                current.push(word);
                if ends_sentence && !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Strips surrounding punctuation, keeping byte offsets of the core.
fn trim_token(token: &str, offset: usize) -> Option<Word<'_>> {
    let sentence_end = token.ends_with(['.', '!', '?']);

    let mut start = 0;
    for (i, c) in token.char_indices() {
        if c.is_alphanumeric() {
            start = i;
            break;
        }
        start = i + c.len_utf8();
    }

    let core_tail = &token[start..];
    let mut end = start;
    for (i, c) in core_tail.char_indices() {
        if c.is_alphanumeric() || c == '\'' || c == '-' || c == '&' {
            end = start + i + c.len_utf8();
        }
    }

    if end <= start {
        return None;
    }

    Some(Word {
        core: &token[start..end],
        start: offset + start,
        end: offset + end,
        sentence_end,
    })
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Classifies a capitalized run, returning its byte span and native label.
fn classify_run(run: &[Word<'_>]) -> Option<(usize, usize, &'static str)> {
    // Sentence-initial filler ("The", "However", ...) is not part of a name.
    let mut words = run;
    while let Some(first) = words.first() {
        if SPAN_STARTERS.contains(&first.core) {
            words = &words[1..];
        } else {
            break;
        }
    }
    let (first, last) = match (words.first(), words.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return None,
    };
    let span = (first.start, last.end);

    if ORG_SUFFIXES.contains(&last.core) {
        return Some((span.0, span.1, "ORG"));
    }

    let joined = words
        .iter()
        .map(|w| w.core)
        .collect::<Vec<_>>()
        .join(" ");
    if GAZETTEER.contains(&joined.as_str()) {
        return Some((span.0, span.1, "GPE"));
    }

    if words.len() <= MAX_PERSON_SPAN_WORDS {
        return Some((span.0, span.1, "PERSON"));
    }

    None
}

struct OffsetCursor<'a> {
    text: &'a str,
    byte_pos: usize,
    char_pos: usize,
}

impl<'a> OffsetCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte_pos: 0,
            char_pos: 0,
        }
    }

    /// Character index for a byte index. Queries must be non-decreasing.
    fn char_index(&mut self, byte: usize) -> usize {
        while self.byte_pos < byte {
            match self.text[self.byte_pos..].chars().next() {
                Some(c) => {
                    self.byte_pos += c.len_utf8();
                    self.char_pos += 1;
                }
                None => break,
            }
        }
        self.char_pos
    }
}
