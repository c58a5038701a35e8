use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+\s").unwrap());
static SPECIAL_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s.,]").unwrap());

const GRANT_KEYWORDS: &[&str] = &[
    "grant", "funding", "award", "eligib", "applicant", "deadline", "nonprofit",
    "proposal", "foundation", "scholarship", "fellowship",
];

/// Score in `[0, 1]` combining a length band, sentence count, grant-keyword
/// density, and special-character ratio — a cheap signal for whether scraped
/// text is real prose versus boilerplate or garbage.
pub fn text_quality(text: &str) -> f32 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let len = text.len() as f32;
    let length_score = match text.len() {
        0..=29 => text.len() as f32 / 30.0,
        30..=2000 => 1.0,
        _ => 0.6,
    } * 0.3;

    let sentence_count = SENTENCE_BOUNDARY.find_iter(text).count() + 1;
    let sentence_score = (sentence_count as f32 / 10.0).min(1.0) * 0.15;

    let lowered = text.to_lowercase();
    let keyword_hits: usize = GRANT_KEYWORDS
        .iter()
        .map(|kw| lowered.matches(kw).count())
        .sum();
    let word_count = text.split_whitespace().count().max(1);
    let keyword_density = keyword_hits as f32 / word_count as f32;
    let keyword_score = (keyword_density * 5.0).min(1.0) * 0.25;

    let special_count = SPECIAL_CHAR.find_iter(text).count() as f32;
    let special_ratio = special_count / len;
    let special_score = (1.0 - special_ratio.min(1.0)) * 0.3;

    (length_score + sentence_score + keyword_score + special_score).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(text_quality(""), 0.0);
    }

    #[test]
    fn grant_prose_scores_higher_than_noise() {
        let grant_text = "This grant program provides funding for eligible nonprofit \
            applicants. The deadline for proposals is in March. Foundation staff \
            review every application.";
        let noise = "!@#$%^&*()_+ asdf qwer zxcv !@#$ 1234 !@#$ junk junk junk";
        assert!(text_quality(grant_text) > text_quality(noise));
    }

    #[test]
    fn score_stays_within_unit_interval() {
        let text = "x".repeat(5000);
        let score = text_quality(&text);
        assert!((0.0..=1.0).contains(&score));
    }
}
