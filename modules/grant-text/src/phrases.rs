use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]{3,}").unwrap());

static STOP_WORDS: LazyLock<std::collections::HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "and", "for", "are", "with", "this", "that", "from", "will", "all",
        "can", "has", "have", "been", "was", "were", "their", "its", "may", "such",
        "who", "which", "any", "these", "those", "per", "not", "also", "into",
        "you", "your", "our", "more", "than", "each", "other", "about",
    ]
    .into_iter()
    .collect()
});

static GRANT_DOMAIN_TERMS: &[&str] = &[
    "grant", "funding", "award", "eligibility", "applicant", "deadline",
    "nonprofit", "proposal", "foundation", "scholarship", "fellowship",
    "budget", "research", "community", "program",
];

/// Top `k` frequency-ranked words, stop-worded, with domain terms weighted
/// 2x. Ties break by first occurrence.
pub fn key_phrases(text: &str, k: usize) -> Vec<String> {
    let mut counts: HashMap<String, (f32, usize)> = HashMap::new();
    for (position, mat) in WORD.find_iter(text).enumerate() {
        let word = mat.as_str().to_lowercase();
        if STOP_WORDS.contains(word.as_str()) {
            continue;
        }
        let weight = if GRANT_DOMAIN_TERMS.contains(&word.as_str()) {
            2.0
        } else {
            1.0
        };
        let entry = counts.entry(word).or_insert((0.0, position));
        entry.0 += weight;
    }

    let mut ranked: Vec<(String, f32, usize)> =
        counts.into_iter().map(|(w, (score, pos))| (w, score, pos)).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.2.cmp(&b.2)));
    ranked.into_iter().take(k).map(|(w, _, _)| w).collect()
}
