use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use sha2::{Digest, Sha256};

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static ORG_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(inc|llc|ltd|corp|corporation|co|foundation|fund|trust)\.?\b").unwrap());

fn strip_punctuation_lowercase(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical fields going into `content_hash`: lowercased/punctuation-
/// stripped title, description, and funder name; deadline as a calendar
/// date; amount bounds; application URL; category; sorted location list.
pub struct ContentFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub funder_name: &'a str,
    pub deadline: Option<NaiveDate>,
    pub amount_min: Option<u64>,
    pub amount_max: Option<u64>,
    pub application_url: Option<&'a str>,
    pub category: &'a str,
    pub locations: &'a [String],
}

/// SHA-256 over a canonical record, used for change detection (spec §4.3).
pub fn content_hash(fields: &ContentFields) -> String {
    let mut sorted_locations: Vec<String> = fields.locations.to_vec();
    sorted_locations.sort();

    let canonical = format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}",
        strip_punctuation_lowercase(fields.title),
        strip_punctuation_lowercase(fields.description),
        strip_punctuation_lowercase(fields.funder_name),
        fields.deadline.map(|d| d.to_string()).unwrap_or_default(),
        fields.amount_min.map(|v| v.to_string()).unwrap_or_default(),
        fields.amount_max.map(|v| v.to_string()).unwrap_or_default(),
        fields.application_url.unwrap_or_default(),
        fields.category,
        sorted_locations.join(","),
    );

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// MD5 over a looser canonical form: org suffixes removed from the funder
/// name, deadline truncated to calendar day, amounts bucketed to the
/// nearest thousand (spec §4.3).
pub fn duplicate_hash(fields: &ContentFields) -> String {
    let funder_no_suffix = ORG_SUFFIX.replace_all(&strip_punctuation_lowercase(fields.funder_name), "");
    let bucket = |amount: Option<u64>| amount.map(|v| (v / 1000) * 1000);

    let canonical = format!(
        "{}|{}|{}|{}|{}",
        strip_punctuation_lowercase(fields.title),
        funder_no_suffix.trim(),
        fields.deadline.map(|d| d.to_string()).unwrap_or_default(),
        bucket(fields.amount_min).map(|v| v.to_string()).unwrap_or_default(),
        bucket(fields.amount_max).map(|v| v.to_string()).unwrap_or_default(),
    );

    format!("{:x}", md5::compute(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields(title: &str) -> ContentFields<'_> {
        ContentFields {
            title,
            description: "Supports local nonprofits doing good work.",
            funder_name: "Example Foundation",
            deadline: NaiveDate::from_ymd_opt(2027, 3, 15),
            amount_min: Some(5_000),
            amount_max: Some(50_000),
            application_url: Some("https://example.org/apply"),
            category: "community_development",
            locations: &["california".to_string(), "oregon".to_string()],
        }
    }

    #[test]
    fn content_hash_is_deterministic() {
        let fields = sample_fields("Community Grant");
        assert_eq!(content_hash(&fields), content_hash(&fields));
    }

    #[test]
    fn content_hash_changes_with_title() {
        let a = sample_fields("Community Grant");
        let b = sample_fields("Community Grant Updated");
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn duplicate_hash_ignores_org_suffix_and_amount_precision() {
        let mut a = sample_fields("Community Grant");
        a.amount_min = Some(5_400);
        a.amount_max = Some(50_900);
        a.funder_name = "Example Foundation Inc.";
        let mut b = sample_fields("Community Grant");
        b.amount_min = Some(5_100);
        b.amount_max = Some(50_100);
        b.funder_name = "Example Foundation";
        assert_eq!(duplicate_hash(&a), duplicate_hash(&b));
    }

    #[test]
    fn duplicate_hash_is_32_hex_chars() {
        let fields = sample_fields("Community Grant");
        assert_eq!(duplicate_hash(&fields).len(), 32);
    }

    #[test]
    fn content_hash_is_64_hex_chars() {
        let fields = sample_fields("Community Grant");
        assert_eq!(content_hash(&fields).len(), 64);
    }
}
