use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One candidate extraction for a target field, ranked by `confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub value: String,
    pub confidence: f32,
    pub pattern_name: &'static str,
}

impl FieldMatch {
    fn new(value: impl Into<String>, confidence: f32, pattern_name: &'static str) -> Self {
        Self {
            value: value.into(),
            confidence,
            pattern_name,
        }
    }
}

/// Highest-confidence entry, or `None` on an empty candidate list.
pub fn best_match(matches: &[FieldMatch]) -> Option<&FieldMatch> {
    matches
        .iter()
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
}

/// Deduplicate by lowercased value, keeping the highest-confidence instance
/// and preserving descending-confidence order.
fn dedup_by_lowercase(mut matches: Vec<FieldMatch>) -> Vec<FieldMatch> {
    matches.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    let mut seen = BTreeSet::new();
    matches.retain(|m| seen.insert(m.value.to_lowercase()));
    matches
}

struct Pattern {
    regex: &'static LazyLock<Regex>,
    name: &'static str,
    confidence: f32,
    /// When true, the match value is capture group 1; otherwise the whole match.
    use_group: bool,
}

macro_rules! pattern_set {
    ($($name:ident => $lit:literal),+ $(,)?) => {
        $(static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($lit).unwrap());)+
    };
}

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

pattern_set! {
    TITLE_HEADING => r"(?m)^\s*#{1,3}\s+(.{8,120})\s*$",
    TITLE_LABELED => r"(?im)^\s*(?:grant\s+title|program\s+name|opportunity)\s*:\s*(.{8,120})\s*$",
    TITLE_QUOTED => r#"(?m)["“]([A-Z][^"”]{7,119})["”]"#,
    TITLE_FIRST_LINE => r"(?m)^\s*([A-Z][^\n]{7,119})\s*$",
}

/// Candidate grant titles, highest confidence from explicit headings down to
/// a bare first-line heuristic.
pub fn extract_title(text: &str) -> Vec<FieldMatch> {
    let patterns = [
        Pattern { regex: &TITLE_HEADING, name: "heading", confidence: 0.9, use_group: true },
        Pattern { regex: &TITLE_LABELED, name: "labeled_field", confidence: 0.85, use_group: true },
        Pattern { regex: &TITLE_QUOTED, name: "quoted_phrase", confidence: 0.6, use_group: true },
        Pattern { regex: &TITLE_FIRST_LINE, name: "first_line", confidence: 0.3, use_group: true },
    ];
    run_patterns(text, &patterns)
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

pattern_set! {
    DEADLINE_LABELED => r"(?im)(?:deadline|due\s+date|applications?\s+(?:are\s+)?due|closes?)\s*:?\s*([A-Za-z]+\s+\d{1,2},?\s+\d{4}|\d{1,2}/\d{1,2}/\d{2,4}|\d{4}-\d{2}-\d{2})",
    DEADLINE_ISO => r"\b(\d{4}-\d{2}-\d{2})\b",
    DEADLINE_US_SLASH => r"\b(\d{1,2}/\d{1,2}/\d{2,4})\b",
    DEADLINE_MONTH_NAME => r"\b([A-Z][a-z]+\s+\d{1,2},?\s+\d{4})\b",
}

pub fn extract_deadline(text: &str) -> Vec<FieldMatch> {
    let patterns = [
        Pattern { regex: &DEADLINE_LABELED, name: "labeled_field", confidence: 0.9, use_group: true },
        Pattern { regex: &DEADLINE_ISO, name: "iso_date", confidence: 0.7, use_group: true },
        Pattern { regex: &DEADLINE_MONTH_NAME, name: "month_name", confidence: 0.55, use_group: true },
        Pattern { regex: &DEADLINE_US_SLASH, name: "slash_date", confidence: 0.4, use_group: true },
    ];
    run_patterns(text, &patterns)
}

// ---------------------------------------------------------------------------
// Funding amount
// ---------------------------------------------------------------------------

pattern_set! {
    FUNDING_RANGE => r"\$\s?[\d,]+(?:\.\d+)?\s*(?:-|to|–)\s*\$?\s?[\d,]+(?:\.\d+)?",
    FUNDING_LABELED => r"(?im)(?:award|grant|funding)\s+amount\s*:?\s*(\$[\d,]+(?:\.\d+)?)",
    FUNDING_DOLLAR => r"\$\s?[\d,]+(?:\.\d+)?(?:\s*(?:million|k|thousand))?",
    FUNDING_UP_TO => r"(?i)up\s+to\s+\$\s?[\d,]+(?:\.\d+)?",
}

pub fn extract_funding(text: &str) -> Vec<FieldMatch> {
    let patterns = [
        Pattern { regex: &FUNDING_RANGE, name: "range", confidence: 0.9, use_group: false },
        Pattern { regex: &FUNDING_LABELED, name: "labeled_field", confidence: 0.85, use_group: true },
        Pattern { regex: &FUNDING_UP_TO, name: "up_to", confidence: 0.6, use_group: false },
        Pattern { regex: &FUNDING_DOLLAR, name: "bare_dollar", confidence: 0.4, use_group: false },
    ];
    run_patterns(text, &patterns)
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

pattern_set! {
    ELIGIBILITY_LABELED => r"(?im)^\s*eligibilit(?:y|ies)\s*:?\s*(.{10,400})\s*$",
    ELIGIBILITY_WHO_CAN => r"(?im)who\s+(?:can|may)\s+apply\s*:?\s*(.{10,400})",
    ELIGIBILITY_OPEN_TO => r"(?i)open\s+to\s+(.{5,200}?)(?:\.|\n|$)",
    ELIGIBILITY_MUST_BE => r"(?i)(?:applicants?|organizations?)\s+must\s+be\s+(.{5,200}?)(?:\.|\n|$)",
}

pub fn extract_eligibility(text: &str) -> Vec<FieldMatch> {
    let patterns = [
        Pattern { regex: &ELIGIBILITY_LABELED, name: "labeled_field", confidence: 0.9, use_group: true },
        Pattern { regex: &ELIGIBILITY_WHO_CAN, name: "who_can_apply", confidence: 0.7, use_group: true },
        Pattern { regex: &ELIGIBILITY_MUST_BE, name: "must_be", confidence: 0.5, use_group: true },
        Pattern { regex: &ELIGIBILITY_OPEN_TO, name: "open_to", confidence: 0.45, use_group: true },
    ];
    run_patterns(text, &patterns)
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

pattern_set! {
    DESCRIPTION_LABELED => r"(?im)(?:description|overview|about\s+this\s+grant)\s*:?\s*(.{30,2000})",
    DESCRIPTION_PARAGRAPH => r"(?m)^([A-Z][^\n]{60,2000})$",
}

pub fn extract_description(text: &str) -> Vec<FieldMatch> {
    let patterns = [
        Pattern { regex: &DESCRIPTION_LABELED, name: "labeled_field", confidence: 0.85, use_group: true },
        Pattern { regex: &DESCRIPTION_PARAGRAPH, name: "long_paragraph", confidence: 0.4, use_group: true },
    ];
    run_patterns(text, &patterns)
}

// ---------------------------------------------------------------------------
// URL
// ---------------------------------------------------------------------------

pattern_set! {
    URL_APPLY_LABELED => r"(?i)(?:apply\s+(?:here|now|online|at)|application\s+link)\s*:?\s*(https?://\S+)",
    URL_BARE => r"https?://[^\s<>""']+",
}

pub fn extract_url(text: &str) -> Vec<FieldMatch> {
    let patterns = [
        Pattern { regex: &URL_APPLY_LABELED, name: "apply_labeled", confidence: 0.9, use_group: true },
        Pattern { regex: &URL_BARE, name: "bare_url", confidence: 0.5, use_group: false },
    ];
    run_patterns(text, &patterns)
}

fn run_patterns(text: &str, patterns: &[Pattern]) -> Vec<FieldMatch> {
    let mut matches = Vec::new();
    for pattern in patterns {
        for caps in pattern.regex.captures_iter(text) {
            let raw = if pattern.use_group {
                caps.get(1).map(|g| g.as_str())
            } else {
                caps.get(0).map(|g| g.as_str())
            };
            if let Some(raw) = raw {
                let value = raw.trim().trim_end_matches(['.', ',']).to_string();
                if !value.is_empty() {
                    matches.push(FieldMatch::new(value, pattern.confidence, pattern.name));
                }
            }
        }
    }
    dedup_by_lowercase(matches)
}
