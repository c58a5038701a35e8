mod summary;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use grant_common::types::{Grant, ValidationError, ValidationReport, ValidationWarning};

pub use summary::{summarize, ValidationSummary};

const AMOUNT_RANGE_FLAG_MULTIPLIER: u64 = 10;
const MIN_DESCRIPTION_WORDS: usize = 10;
const DEADLINE_LOOKAHEAD_DAYS: i64 = 365;
const TITLE_MIN_CHARS: usize = 5;
const TITLE_MAX_CHARS: usize = 300;
const DESCRIPTION_MIN_CHARS: usize = 20;
const DESCRIPTION_MAX_CHARS: usize = 5000;
/// Cap per spec §3: confidence-score <= 50 if any validation error was
/// emitted for this record.
const MAX_CONFIDENCE_WITH_ERRORS: u8 = 50;

static LOREM_IPSUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)lorem ipsum|dolor sit amet").unwrap());

/// Validate a single Grant against the declarative rule set in spec §4.4.
/// Wraps [`validate_at`] with the real clock.
pub fn validate(grant: &mut Grant) -> ValidationReport {
    validate_at(grant, Utc::now())
}

/// Same as [`validate`] but with an injectable "now", for deterministic
/// deadline-bound tests. Clamps `grant.confidence_score` per the §3 record
/// invariant when errors are emitted.
pub fn validate_at(grant: &mut Grant, now: DateTime<Utc>) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let title_len = grant.title.trim().chars().count();
    if grant.title.trim().is_empty() {
        errors.push(field_error("title", "title is required"));
    } else if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
        errors.push(field_error(
            "title",
            &format!("title must be {TITLE_MIN_CHARS}-{TITLE_MAX_CHARS} characters, got {title_len}"),
        ));
    }

    let description_len = grant.description.trim().chars().count();
    if grant.description.trim().is_empty() {
        errors.push(field_error("description", "description is required"));
    } else if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&description_len) {
        errors.push(field_error(
            "description",
            &format!("description must be {DESCRIPTION_MIN_CHARS}-{DESCRIPTION_MAX_CHARS} characters, got {description_len}"),
        ));
    }
    if grant.funder.name.trim().is_empty() {
        errors.push(field_error("funder.name", "funder name is required"));
    }
    if grant.confidence_score > 100 {
        errors.push(field_error("confidence_score", "confidence score must be within 0..=100"));
    }

    if let (Some(min), Some(max)) = (grant.amount_min, grant.amount_max) {
        if min > max {
            errors.push(field_error("amount_min", "amount_min must be <= amount_max"));
        } else if max > 0 && min > 0 && max > min * AMOUNT_RANGE_FLAG_MULTIPLIER {
            warnings.push(field_warning(
                "amount_max",
                "amount range spans more than 10x from minimum to maximum",
                Some("double-check the scraped funding amount text".to_string()),
            ));
        }
    }

    if let Some(deadline) = grant.deadline {
        let today = now.date_naive();
        if deadline < today {
            warnings.push(field_warning("deadline", "deadline is in the past", None));
        } else if (deadline - today).num_days() > DEADLINE_LOOKAHEAD_DAYS {
            warnings.push(field_warning("deadline", "deadline is more than a year away", None));
        }
    }

    let word_count = grant.description.split_whitespace().count();
    if word_count < MIN_DESCRIPTION_WORDS {
        warnings.push(field_warning(
            "description",
            "description is fewer than 10 words",
            Some("scrape likely captured a fragment, not the full description".to_string()),
        ));
    }

    if LOREM_IPSUM.is_match(&grant.title) || LOREM_IPSUM.is_match(&grant.description) {
        warnings.push(field_warning("description", "placeholder text detected", Some("looks like lorem ipsum boilerplate".to_string())));
    }

    if grant.confidence_score >= 90 && !errors.is_empty() {
        warnings.push(field_warning(
            "confidence_score",
            "confidence score is high despite validation errors",
            None,
        ));
    }

    if !errors.is_empty() && grant.confidence_score > MAX_CONFIDENCE_WITH_ERRORS {
        grant.confidence_score = MAX_CONFIDENCE_WITH_ERRORS;
    }

    let valid = errors.is_empty();
    let quality_score = 100u32
        .saturating_sub(errors.len() as u32 * 25)
        .saturating_sub(warnings.len() as u32 * 10)
        .min(100) as u8;

    ValidationReport {
        valid,
        errors,
        warnings,
        quality_score,
    }
}

fn field_error(field: &str, message: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn field_warning(field: &str, message: &str, suggestion: Option<String>) -> ValidationWarning {
    ValidationWarning {
        field: field.to_string(),
        message: message.to_string(),
        suggestion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use grant_common::types::{Funder, GrantCategory, SourceType};
    use std::collections::BTreeSet;

    fn sample_grant() -> Grant {
        Grant {
            title: "Community Health Grant".to_string(),
            description: "This grant supports clinics serving low income neighborhoods across the region.".to_string(),
            deadline: NaiveDate::from_ymd_opt(2027, 3, 15),
            amount_min: Some(5_000),
            amount_max: Some(50_000),
            eligibility_criteria: "Nonprofits only".to_string(),
            application_url: Some("https://example.org/apply".to_string()),
            funder: Funder {
                name: "Example Foundation".to_string(),
                website: None,
                contact_email: None,
                funder_type: SourceType::Foundation,
            },
            category: GrantCategory::HealthcarePublicHealth,
            location_eligibility: BTreeSet::new(),
            confidence_score: 80,
            content_hash: "0".repeat(64),
            duplicate_hash: "0".repeat(32),
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn a_well_formed_grant_validates_clean() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc();
        let mut grant = sample_grant();
        let report = validate_at(&mut grant, now);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn missing_title_is_an_error() {
        let mut grant = sample_grant();
        grant.title = String::new();
        let report = validate(&mut grant);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn short_title_is_an_error() {
        let mut grant = sample_grant();
        grant.title = "Hi".to_string();
        let report = validate(&mut grant);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.field == "title" && e.message.contains("5-300")));
    }

    #[test]
    fn short_description_is_an_error() {
        let mut grant = sample_grant();
        grant.description = "Too short".to_string();
        let report = validate(&mut grant);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.field == "description" && e.message.contains("20-5000")));
    }

    #[test]
    fn amount_min_greater_than_max_is_an_error() {
        let mut grant = sample_grant();
        grant.amount_min = Some(100);
        grant.amount_max = Some(50);
        let report = validate(&mut grant);
        assert!(!report.valid);
    }

    #[test]
    fn amount_range_over_10x_is_flagged() {
        let mut grant = sample_grant();
        grant.amount_min = Some(1_000);
        grant.amount_max = Some(50_000);
        let report = validate(&mut grant);
        assert!(report.valid);
        assert!(report.warnings.iter().any(|w| w.field == "amount_max"));
    }

    #[test]
    fn past_deadline_is_a_warning_not_an_error() {
        let mut grant = sample_grant();
        grant.deadline = NaiveDate::from_ymd_opt(2020, 1, 1);
        let now = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc();
        let report = validate_at(&mut grant, now);
        assert!(report.valid);
        assert!(report.warnings.iter().any(|w| w.field == "deadline"));
    }

    #[test]
    fn far_future_deadline_is_flagged() {
        let mut grant = sample_grant();
        let now = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc();
        grant.deadline = Some(now.date_naive() + Duration::days(400));
        let report = validate_at(&mut grant, now);
        assert!(report.warnings.iter().any(|w| w.field == "deadline"));
    }

    #[test]
    fn short_description_is_flagged_for_word_count_too() {
        let mut grant = sample_grant();
        grant.description = "A short grant description text here now".to_string();
        let report = validate(&mut grant);
        assert!(report.valid);
        assert!(report.warnings.iter().any(|w| w.field == "description" && w.message.contains("10 words")));
    }

    #[test]
    fn lorem_ipsum_placeholder_is_flagged() {
        let mut grant = sample_grant();
        grant.description = "Lorem ipsum dolor sit amet consectetur adipiscing elit.".to_string();
        let report = validate(&mut grant);
        assert!(report.warnings.iter().any(|w| w.message.contains("placeholder")));
    }

    #[test]
    fn high_confidence_with_errors_is_flagged() {
        let mut grant = sample_grant();
        grant.title = String::new();
        grant.confidence_score = 95;
        let report = validate(&mut grant);
        assert!(report.warnings.iter().any(|w| w.field == "confidence_score"));
    }

    #[test]
    fn confidence_score_is_clamped_to_50_when_errors_are_present() {
        let mut grant = sample_grant();
        grant.title = String::new();
        grant.confidence_score = 95;
        validate(&mut grant);
        assert_eq!(grant.confidence_score, 50);
    }

    #[test]
    fn confidence_score_is_untouched_when_already_below_the_cap() {
        let mut grant = sample_grant();
        grant.title = String::new();
        grant.confidence_score = 30;
        validate(&mut grant);
        assert_eq!(grant.confidence_score, 30);
    }
}
