use grant_common::types::{Grant, SourceType};
use grant_processor::ContentFields;

/// Merges a confirmed cross-batch match (spec §4.6): longer title and
/// description win, the later deadline wins, maxima grow and minima shrink
/// to cover both records, locations union, confidence takes the higher
/// value, and the content hash is regenerated over the merged record.
pub fn merge_grants(existing: &Grant, incoming: &Grant) -> Grant {
    let title = longer(&existing.title, &incoming.title);
    let description = longer(&existing.description, &incoming.description);
    let deadline = later_deadline(existing.deadline, incoming.deadline);
    let amount_min = smaller_or_present(existing.amount_min, incoming.amount_min);
    let amount_max = larger_or_present(existing.amount_max, incoming.amount_max);
    let eligibility_criteria = longer(&existing.eligibility_criteria, &incoming.eligibility_criteria);
    let application_url = preferred_url(existing, incoming);
    let funder = if existing.confidence_score >= incoming.confidence_score {
        existing.funder.clone()
    } else {
        incoming.funder.clone()
    };
    let category = if existing.confidence_score >= incoming.confidence_score {
        existing.category
    } else {
        incoming.category
    };
    let confidence_score = existing.confidence_score.max(incoming.confidence_score);

    let mut location_eligibility = existing.location_eligibility.clone();
    location_eligibility.extend(incoming.location_eligibility.iter().cloned());

    let locations_vec: Vec<String> = location_eligibility.iter().cloned().collect();
    let fields = ContentFields {
        title: &title,
        description: &description,
        funder_name: &funder.name,
        deadline,
        amount_min,
        amount_max,
        application_url: application_url.as_deref(),
        category: &category.to_string(),
        locations: &locations_vec,
    };
    let content_hash = grant_processor::content_hash(&fields);
    let duplicate_hash = grant_processor::duplicate_hash(&fields);

    let mut tags = existing.tags.clone();
    tags.extend(incoming.tags.iter().cloned());

    Grant {
        title,
        description,
        deadline,
        amount_min,
        amount_max,
        eligibility_criteria,
        application_url,
        funder,
        category,
        location_eligibility,
        confidence_score,
        content_hash,
        duplicate_hash,
        tags,
    }
}

fn longer(a: &str, b: &str) -> String {
    if b.len() > a.len() { b.to_string() } else { a.to_string() }
}

fn later_deadline(a: Option<chrono::NaiveDate>, b: Option<chrono::NaiveDate>) -> Option<chrono::NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn larger_or_present(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn smaller_or_present(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn preferred_url(existing: &Grant, incoming: &Grant) -> Option<String> {
    match (&existing.application_url, &incoming.application_url) {
        (Some(a), Some(b)) => {
            let a_is_gov = existing.funder.funder_type == SourceType::Gov;
            let b_is_gov = incoming.funder.funder_type == SourceType::Gov;
            if a_is_gov && !b_is_gov {
                Some(a.clone())
            } else if b_is_gov && !a_is_gov {
                Some(b.clone())
            } else if a.len() <= b.len() {
                Some(a.clone())
            } else {
                Some(b.clone())
            }
        }
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grant_common::types::{Funder, GrantCategory};
    use std::collections::BTreeSet;

    fn grant(title: &str, description: &str, funder_type: SourceType, url: &str, confidence: u8) -> Grant {
        Grant {
            title: title.to_string(),
            description: description.to_string(),
            deadline: None,
            amount_min: Some(1_000),
            amount_max: Some(10_000),
            eligibility_criteria: "Nonprofits".to_string(),
            application_url: Some(url.to_string()),
            funder: Funder {
                name: "Example Foundation".to_string(),
                website: None,
                contact_email: None,
                funder_type,
            },
            category: GrantCategory::CommunityDevelopment,
            location_eligibility: BTreeSet::new(),
            confidence_score: confidence,
            content_hash: "a".repeat(64),
            duplicate_hash: "b".repeat(32),
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn merge_prefers_longer_title_and_description() {
        let a = grant("Grant", "Short", SourceType::Foundation, "https://a.example.org", 60);
        let b = grant("Grant Full Title", "A much longer description text", SourceType::Foundation, "https://b.example.org", 60);
        let merged = merge_grants(&a, &b);
        assert_eq!(merged.title, "Grant Full Title");
        assert_eq!(merged.description, "A much longer description text");
    }

    #[test]
    fn merge_prefers_government_application_url() {
        let a = grant("Grant", "Description here", SourceType::Foundation, "https://foundation.example.org/apply", 50);
        let b = grant("Grant", "Description here", SourceType::Gov, "https://agency.gov/apply", 50);
        let merged = merge_grants(&a, &b);
        assert_eq!(merged.application_url.as_deref(), Some("https://agency.gov/apply"));
    }

    #[test]
    fn merge_unions_locations_and_widens_amount_bounds() {
        let mut a = grant("Grant", "Description here", SourceType::Foundation, "https://a.example.org", 50);
        a.amount_min = Some(500);
        a.amount_max = Some(5_000);
        a.location_eligibility.insert("california".to_string());
        let mut b = grant("Grant", "Description here", SourceType::Foundation, "https://b.example.org", 50);
        b.amount_min = Some(1_000);
        b.amount_max = Some(10_000);
        b.location_eligibility.insert("oregon".to_string());

        let merged = merge_grants(&a, &b);
        assert_eq!(merged.amount_min, Some(500));
        assert_eq!(merged.amount_max, Some(10_000));
        assert!(merged.location_eligibility.contains("california"));
        assert!(merged.location_eligibility.contains("oregon"));
    }

    #[test]
    fn merge_regenerates_content_hash() {
        let a = grant("Grant", "Description here", SourceType::Foundation, "https://a.example.org", 50);
        let b = grant("Grant Updated", "Description here, now longer", SourceType::Foundation, "https://b.example.org", 50);
        let merged = merge_grants(&a, &b);
        assert_ne!(merged.content_hash, a.content_hash);
        assert_eq!(merged.content_hash.len(), 64);
    }
}
