use grant_common::types::Grant;

const TITLE_WEIGHT: f32 = 0.4;
const FUNDER_WEIGHT: f32 = 0.3;
const DEADLINE_WEIGHT: f32 = 0.2;
const AMOUNT_WEIGHT: f32 = 0.1;
const MATCH_THRESHOLD: f32 = 0.8;
const DEADLINE_PROXIMITY_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct MatchScore {
    pub score: f32,
    pub reasons: Vec<String>,
}

/// Weighted cross-batch similarity score between a candidate grant and a
/// known grant (spec §4.6): title similarity, funder match, deadline
/// proximity, amount ratio.
pub fn score(candidate: &Grant, known: &Grant) -> MatchScore {
    let mut reasons = Vec::new();

    let title_similarity = normalized_title_similarity(&candidate.title, &known.title);
    if title_similarity > 0.5 {
        reasons.push(format!("title similarity {title_similarity:.2}"));
    }

    let funder_match = candidate.funder.name.trim().eq_ignore_ascii_case(known.funder.name.trim());
    if funder_match {
        reasons.push("same funder name".to_string());
    }

    let deadline_close = match (candidate.deadline, known.deadline) {
        (Some(a), Some(b)) => (a - b).num_days().abs() <= DEADLINE_PROXIMITY_DAYS,
        (None, None) => true,
        _ => false,
    };
    if deadline_close {
        reasons.push("deadlines within 7 days of each other".to_string());
    }

    let amount_ratio = amount_similarity(candidate, known);
    if amount_ratio > 0.8 {
        reasons.push(format!("amount ratio {amount_ratio:.2}"));
    }

    let total = title_similarity * TITLE_WEIGHT
        + (funder_match as u8 as f32) * FUNDER_WEIGHT
        + (deadline_close as u8 as f32) * DEADLINE_WEIGHT
        + amount_ratio * AMOUNT_WEIGHT;

    MatchScore { score: total, reasons }
}

/// Grants scoring at or above the match threshold, each paired with its
/// score and reasons.
pub fn find_matches<'a>(candidate: &Grant, known: &'a [Grant]) -> Vec<(&'a Grant, MatchScore)> {
    known
        .iter()
        .map(|g| (g, score(candidate, g)))
        .filter(|(_, s)| s.score >= MATCH_THRESHOLD)
        .collect()
}

fn normalized_title_similarity(a: &str, b: &str) -> f32 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    if a_lower.is_empty() && b_lower.is_empty() {
        return 1.0;
    }
    let distance = strsim::levenshtein(&a_lower, &b_lower) as f32;
    let max_len = a_lower.chars().count().max(b_lower.chars().count()).max(1) as f32;
    (1.0 - distance / max_len).max(0.0)
}

fn amount_similarity(candidate: &Grant, known: &Grant) -> f32 {
    match (reference_amount(candidate), reference_amount(known)) {
        (Some(a), Some(b)) if a > 0 && b > 0 => {
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            lo as f32 / hi as f32
        }
        (None, None) => 1.0,
        _ => 0.0,
    }
}

fn reference_amount(grant: &Grant) -> Option<u64> {
    grant.amount_max.or(grant.amount_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use grant_common::types::{Funder, GrantCategory, SourceType};
    use std::collections::BTreeSet;

    fn grant(title: &str, funder: &str, deadline: Option<NaiveDate>, amount_max: Option<u64>) -> Grant {
        Grant {
            title: title.to_string(),
            description: "Description".to_string(),
            deadline,
            amount_min: amount_max,
            amount_max,
            eligibility_criteria: String::new(),
            application_url: None,
            funder: Funder {
                name: funder.to_string(),
                website: None,
                contact_email: None,
                funder_type: SourceType::Foundation,
            },
            category: GrantCategory::CommunityDevelopment,
            location_eligibility: BTreeSet::new(),
            confidence_score: 50,
            content_hash: "a".repeat(64),
            duplicate_hash: "b".repeat(32),
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn identical_grants_score_at_the_maximum() {
        let deadline = NaiveDate::from_ymd_opt(2027, 1, 1);
        let a = grant("Community Health Grant", "Example Foundation", deadline, Some(50_000));
        let b = grant("Community Health Grant", "Example Foundation", deadline, Some(50_000));
        let result = score(&a, &b);
        assert!(result.score >= 0.99);
    }

    #[test]
    fn unrelated_grants_score_low() {
        let a = grant("Community Health Grant", "Example Foundation", None, Some(50_000));
        let b = grant("Technology Startup Accelerator", "Other Corp", None, Some(2_000_000));
        let result = score(&a, &b);
        assert!(result.score < 0.5);
    }

    #[test]
    fn find_matches_filters_by_threshold() {
        let deadline = NaiveDate::from_ymd_opt(2027, 1, 1);
        let candidate = grant("Community Health Grant", "Example Foundation", deadline, Some(50_000));
        let known = vec![
            grant("Community Health Grant", "Example Foundation", deadline, Some(50_000)),
            grant("Totally Unrelated Opportunity", "Nobody", None, Some(1)),
        ];
        let matches = find_matches(&candidate, &known);
        assert_eq!(matches.len(), 1);
    }
}
