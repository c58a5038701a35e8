use grant_common::types::GrantCategory;

const KEYWORDS: &[(GrantCategory, &[&str])] = &[
    (GrantCategory::HealthcarePublicHealth, &["health", "medical", "clinic", "disease", "wellness"]),
    (GrantCategory::EducationTraining, &["education", "school", "student", "curriculum", "training"]),
    (GrantCategory::EnvironmentSustainability, &["environment", "climate", "sustainab", "conservation"]),
    (GrantCategory::SocialServices, &["social services", "housing", "welfare", "food security"]),
    (GrantCategory::ArtsCulture, &["art", "culture", "museum", "theater", "theatre", "music"]),
    (GrantCategory::TechnologyInnovation, &["technology", "software", "digital", "innovation"]),
    (GrantCategory::ResearchDevelopment, &["research", "laboratory", "scientific", "study"]),
    (GrantCategory::CommunityDevelopment, &["community", "neighborhood", "civic", "local"]),
];

/// Preliminary keyword-weighted categorization over title+description+
/// eligibility text (spec §4.3). Falls back to community-development.
pub fn infer_category(text: &str) -> GrantCategory {
    category_scores(text)
        .into_iter()
        .filter(|(_, score)| *score > 0)
        .max_by_key(|(_, score)| *score)
        .map(|(category, _)| category)
        .unwrap_or(GrantCategory::CommunityDevelopment)
}

/// Keyword hit counts per category, exposed so the classifier can compare
/// its own signal strength against the processor's preliminary guess
/// before deciding whether to override it.
pub fn category_scores(text: &str) -> Vec<(GrantCategory, usize)> {
    let lowered = text.to_lowercase();
    KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let score: usize = keywords.iter().map(|kw| lowered.matches(kw).count()).sum();
            (*category, score)
        })
        .collect()
}
