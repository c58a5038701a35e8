mod tags;

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};

use grant_common::types::{Grant, GrantCategory};
use grant_text::GrantTypeTag;

pub use tags::{audience_tags, region_tags, size_tag, thematic_tags, urgency_tag};

const MAX_TAGS: usize = 15;
const LOW_CONFIDENCE_THRESHOLD: f32 = 0.5;
/// Minimum keyword-score margin before the classifier overrides the
/// processor's preliminary category guess.
const OVERRIDE_MARGIN: usize = 2;

#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub category: GrantCategory,
    pub tags: BTreeSet<String>,
    pub confidence: f32,
    pub reasoning: Vec<String>,
}

/// Refine a processed Grant's category and attach a tag set, per spec §4.5.
/// Wraps [`classify_at`] with the real clock for the urgency-tag window.
pub fn classify(grant: &Grant) -> ClassificationResult {
    classify_at(grant, Utc::now().date_naive())
}

pub fn classify_at(grant: &Grant, today: NaiveDate) -> ClassificationResult {
    let combined_text = format!(
        "{} {} {}",
        grant.title, grant.description, grant.eligibility_criteria
    );

    let (category, mut reasoning, category_confidence) = refine_category(grant, &combined_text);

    let mut tag_set: Vec<String> = Vec::new();

    if let Some(tag) = size_tag(grant) {
        tag_set.push(tag.to_string());
    }
    if let Some(tag) = urgency_tag(grant, today) {
        tag_set.push(tag.to_string());
        reasoning.push("deadline falls within the next 30 days".to_string());
    }
    let audiences = audience_tags(grant);
    if !audiences.is_empty() {
        reasoning.push(format!("eligibility text indicates audience: {}", audiences.join(", ")));
    }
    tag_set.extend(audiences.into_iter().map(str::to_string));

    let regions = region_tags(grant);
    if !regions.is_empty() {
        reasoning.push(format!("location eligibility maps to region tags: {}", regions.join(", ")));
    }
    tag_set.extend(regions);

    let themes = thematic_tags(&combined_text);
    if !themes.is_empty() {
        reasoning.push(format!("thematic keywords detected: {}", themes.join(", ")));
    }
    tag_set.extend(themes.into_iter().map(str::to_string));

    let detected_types = grant_text::detect_grant_type(&combined_text);
    tag_set.extend(tags::grant_type_tags(&detected_types));

    let mut tags: BTreeSet<String> = tag_set.into_iter().collect();
    if tags.len() > MAX_TAGS {
        reasoning.push(format!("tag set truncated from {} to {MAX_TAGS}", tags.len()));
        tags = tags.into_iter().take(MAX_TAGS).collect();
    }

    if category_confidence < LOW_CONFIDENCE_THRESHOLD {
        reasoning.push(format!(
            "category confidence {category_confidence:.2} is below the triage threshold; recorded, not rejected"
        ));
    }

    ClassificationResult {
        category,
        tags,
        confidence: category_confidence,
        reasoning,
    }
}

fn refine_category(grant: &Grant, combined_text: &str) -> (GrantCategory, Vec<String>, f32) {
    let scores = grant_processor::category_scores(combined_text);
    let current_score = scores
        .iter()
        .find(|(c, _)| *c == grant.category)
        .map(|(_, s)| *s)
        .unwrap_or(0);

    let detected_types = grant_text::detect_grant_type(combined_text);
    let type_backed_best = scores
        .iter()
        .filter(|(category, _)| detected_types.iter().any(|t| grant_type_maps_to(*t, *category)))
        .max_by_key(|(_, score)| *score)
        .copied();

    let total_score: usize = scores.iter().map(|(_, s)| s).sum::<usize>().max(1);

    match type_backed_best {
        Some((candidate, score)) if candidate != grant.category && score >= current_score + OVERRIDE_MARGIN => {
            let confidence = (score as f32 / total_score as f32).min(1.0);
            let reasoning = vec![format!(
                "overrode category {} -> {candidate} (keyword score {score} vs {current_score}, corroborated by text-analyzer grant-type signal)",
                grant.category
            )];
            (candidate, reasoning, confidence)
        }
        _ => {
            let confidence = if current_score == 0 {
                0.3
            } else {
                (current_score as f32 / total_score as f32).min(1.0)
            };
            let reasoning = vec![format!("retained processor category {} (keyword score {current_score})", grant.category)];
            (grant.category, reasoning, confidence)
        }
    }
}

fn grant_type_maps_to(tag: GrantTypeTag, category: GrantCategory) -> bool {
    matches!(
        (tag, category),
        (GrantTypeTag::Research, GrantCategory::ResearchDevelopment)
            | (GrantTypeTag::Education, GrantCategory::EducationTraining)
            | (GrantTypeTag::Health, GrantCategory::HealthcarePublicHealth)
            | (GrantTypeTag::Community, GrantCategory::CommunityDevelopment)
            | (GrantTypeTag::Environment, GrantCategory::EnvironmentSustainability)
            | (GrantTypeTag::Arts, GrantCategory::ArtsCulture)
            | (GrantTypeTag::Technology, GrantCategory::TechnologyInnovation)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use grant_common::types::{Funder, SourceType};
    use std::collections::BTreeSet as Set;

    fn base_grant() -> Grant {
        Grant {
            title: "Rural Health Clinic Expansion Grant".to_string(),
            description: "Funds medical equipment and clinic staff for rural health clinics serving uninsured patients.".to_string(),
            deadline: None,
            amount_min: Some(10_000),
            amount_max: Some(40_000),
            eligibility_criteria: "Open to 501(c)(3) nonprofits operating health clinics.".to_string(),
            application_url: Some("https://example.org/apply".to_string()),
            funder: Funder {
                name: "Example Foundation".to_string(),
                website: None,
                contact_email: None,
                funder_type: SourceType::Foundation,
            },
            category: GrantCategory::CommunityDevelopment,
            location_eligibility: Set::new(),
            confidence_score: 70,
            content_hash: "0".repeat(64),
            duplicate_hash: "0".repeat(32),
            tags: Set::new(),
        }
    }

    #[test]
    fn overrides_weak_category_with_stronger_health_signal() {
        let result = classify(&base_grant());
        assert_eq!(result.category, GrantCategory::HealthcarePublicHealth);
        assert!(result.reasoning.iter().any(|r| r.contains("overrode")));
    }

    #[test]
    fn tags_include_size_and_nonprofit_audience() {
        let result = classify(&base_grant());
        assert!(result.tags.contains("small-grant"));
        assert!(result.tags.contains("nonprofit"));
    }

    #[test]
    fn tag_set_never_exceeds_cap() {
        let mut grant = base_grant();
        grant.location_eligibility = [
            "california", "texas", "new york", "florida", "africa", "asia", "latin america", "global",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        let result = classify(&grant);
        assert!(result.tags.len() <= MAX_TAGS);
    }

    #[test]
    fn low_confidence_is_recorded_not_rejected() {
        let mut grant = base_grant();
        grant.title = "Generic Funding Opportunity".to_string();
        grant.description = "A funding opportunity with no particular theme.".to_string();
        grant.eligibility_criteria = String::new();
        let result = classify(&grant);
        assert!(result.confidence < LOW_CONFIDENCE_THRESHOLD || result.reasoning.iter().any(|r| r.contains("triage")));
    }
}
