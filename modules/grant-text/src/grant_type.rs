use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrantTypeTag {
    Research,
    Education,
    Health,
    Community,
    Environment,
    Arts,
    Technology,
}

impl std::fmt::Display for GrantTypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Research => "research",
            Self::Education => "education",
            Self::Health => "health",
            Self::Community => "community",
            Self::Environment => "environment",
            Self::Arts => "arts",
            Self::Technology => "technology",
        };
        write!(f, "{s}")
    }
}

const KEYWORDS: &[(GrantTypeTag, &[&str])] = &[
    (GrantTypeTag::Research, &["research", "study", "scientific", "laboratory", "investigator"]),
    (GrantTypeTag::Education, &["education", "school", "student", "curriculum", "teacher", "scholarship"]),
    (GrantTypeTag::Health, &["health", "medical", "clinic", "patient", "wellness", "disease"]),
    (GrantTypeTag::Community, &["community", "neighborhood", "civic", "local residents", "outreach"]),
    (GrantTypeTag::Environment, &["environment", "climate", "sustainab", "conservation", "renewable"]),
    (GrantTypeTag::Arts, &["art", "culture", "museum", "theater", "theatre", "music"]),
    (GrantTypeTag::Technology, &["technology", "software", "digital", "innovation", "startup"]),
];

/// Every grant-type category whose keywords appear in `text`, in a stable
/// deterministic order.
pub fn detect_grant_type(text: &str) -> BTreeSet<GrantTypeTag> {
    let lowered = text.to_lowercase();
    KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(tag, _)| *tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_multiple_overlapping_categories() {
        let text = "This research grant supports climate science and renewable energy study.";
        let tags = detect_grant_type(text);
        assert!(tags.contains(&GrantTypeTag::Research));
        assert!(tags.contains(&GrantTypeTag::Environment));
    }

    #[test]
    fn empty_text_yields_no_tags() {
        assert!(detect_grant_type("").is_empty());
    }
}
