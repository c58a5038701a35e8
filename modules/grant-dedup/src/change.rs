use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use grant_common::types::{ChangeRecord, ChangeType, Grant};

const CRITICAL_FIELDS: &[&str] = &["deadline", "amount_min", "amount_max", "application_url"];
const MAJOR_FIELDS: &[&str] = &["title", "eligibility_criteria", "category", "funder"];

/// Diffs two revisions of the same logical grant and classifies the change
/// (spec §4.6). Returns `None` if the content hash is unchanged.
pub fn classify_change(grant_id: Uuid, previous: &Grant, current: &Grant) -> Option<ChangeRecord> {
    if previous.content_hash == current.content_hash {
        return None;
    }

    let changed_fields = changed_field_names(previous, current);

    let change_type = if changed_fields.iter().any(|f| CRITICAL_FIELDS.contains(&f.as_str())) {
        ChangeType::Critical
    } else if changed_fields.iter().any(|f| MAJOR_FIELDS.contains(&f.as_str())) {
        ChangeType::Major
    } else {
        ChangeType::Minor
    };

    Some(ChangeRecord {
        grant_id,
        previous_hash: previous.content_hash.clone(),
        current_hash: current.content_hash.clone(),
        changed_fields,
        change_type,
        detected_at: Utc::now(),
    })
}

fn changed_field_names(previous: &Grant, current: &Grant) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();

    if previous.title != current.title {
        fields.insert("title".to_string());
    }
    if previous.description != current.description {
        fields.insert("description".to_string());
    }
    if previous.deadline != current.deadline {
        fields.insert("deadline".to_string());
    }
    if previous.amount_min != current.amount_min {
        fields.insert("amount_min".to_string());
    }
    if previous.amount_max != current.amount_max {
        fields.insert("amount_max".to_string());
    }
    if previous.eligibility_criteria != current.eligibility_criteria {
        fields.insert("eligibility_criteria".to_string());
    }
    if normalize_url(&previous.application_url) != normalize_url(&current.application_url) {
        fields.insert("application_url".to_string());
    }
    if previous.funder.name != current.funder.name {
        fields.insert("funder".to_string());
    }
    if previous.category != current.category {
        fields.insert("category".to_string());
    }
    if previous.location_eligibility != current.location_eligibility {
        fields.insert("location_eligibility".to_string());
    }

    fields
}

/// Empty/absent URLs are treated as equal, per the dedup edge-case rule.
fn normalize_url(url: &Option<String>) -> &str {
    url.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use grant_common::types::{Funder, GrantCategory, SourceType};
    use std::collections::BTreeSet as Set;

    fn base_grant() -> Grant {
        Grant {
            title: "Community Grant".to_string(),
            description: "Description".to_string(),
            deadline: None,
            amount_min: Some(1_000),
            amount_max: Some(5_000),
            eligibility_criteria: "Nonprofits".to_string(),
            application_url: Some("https://example.org/apply".to_string()),
            funder: Funder {
                name: "Example Foundation".to_string(),
                website: None,
                contact_email: None,
                funder_type: SourceType::Foundation,
            },
            category: GrantCategory::CommunityDevelopment,
            location_eligibility: Set::new(),
            confidence_score: 80,
            content_hash: "a".repeat(64),
            duplicate_hash: "b".repeat(32),
            tags: Set::new(),
        }
    }

    #[test]
    fn unchanged_hash_yields_no_change_record() {
        let grant = base_grant();
        assert!(classify_change(Uuid::new_v4(), &grant, &grant).is_none());
    }

    #[test]
    fn deadline_change_is_critical() {
        let previous = base_grant();
        let mut current = previous.clone();
        current.deadline = chrono::NaiveDate::from_ymd_opt(2027, 1, 1);
        current.content_hash = "c".repeat(64);
        let record = classify_change(Uuid::new_v4(), &previous, &current).unwrap();
        assert_eq!(record.change_type, ChangeType::Critical);
        assert!(record.changed_fields.contains("deadline"));
    }

    #[test]
    fn title_change_alone_is_major() {
        let previous = base_grant();
        let mut current = previous.clone();
        current.title = "Community Grant Updated".to_string();
        current.content_hash = "c".repeat(64);
        let record = classify_change(Uuid::new_v4(), &previous, &current).unwrap();
        assert_eq!(record.change_type, ChangeType::Major);
    }

    #[test]
    fn description_only_change_is_minor() {
        let previous = base_grant();
        let mut current = previous.clone();
        current.description = "Updated description text.".to_string();
        current.content_hash = "c".repeat(64);
        let record = classify_change(Uuid::new_v4(), &previous, &current).unwrap();
        assert_eq!(record.change_type, ChangeType::Minor);
    }
}
