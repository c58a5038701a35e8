use chrono::NaiveDate;

use grant_common::types::Grant;
use grant_text::GrantTypeTag;

const SMALL_GRANT_CEILING: u64 = 50_000;
const MEDIUM_GRANT_CEILING: u64 = 1_000_000;
const URGENT_DEADLINE_DAYS: i64 = 30;

const NONPROFIT_MARKERS: &[&str] = &["nonprofit", "non-profit", "501(c)(3)", "501c3", "ngo", "charity"];
const UNIVERSITY_MARKERS: &[&str] = &["university", "college", "academic institution", "higher education"];
const GOVERNMENT_MARKERS: &[&str] = &["municipal", "county", "state agency", "government entity", "public agency"];
const SMALL_BUSINESS_MARKERS: &[&str] = &["small business", "for-profit", "startup", "entrepreneur"];
const INDIVIDUAL_MARKERS: &[&str] = &["individual applicant", "individual artist", "sole proprietor"];

const THEMATIC_MARKERS: &[(&str, &[&str])] = &[
    ("emergency-relief", &["emergency", "disaster relief", "crisis response", "humanitarian"]),
    ("capacity-building", &["capacity building", "organizational development", "capacity-building"]),
    ("youth-focused", &["youth", "children", "adolescent", "after-school"]),
    ("workforce-development", &["workforce", "job training", "employment skills"]),
    ("infrastructure", &["infrastructure", "facility construction", "capital project"]),
];

const US_STATE_SLUGS: &[&str] = &[
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado", "connecticut",
    "delaware", "florida", "georgia", "hawaii", "idaho", "illinois", "indiana", "iowa",
    "kansas", "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan",
    "minnesota", "mississippi", "missouri", "montana", "nebraska", "nevada",
    "new hampshire", "new jersey", "new mexico", "new york", "north carolina",
    "north dakota", "ohio", "oklahoma", "oregon", "pennsylvania", "rhode island",
    "south carolina", "south dakota", "tennessee", "texas", "utah", "vermont",
    "virginia", "washington", "west virginia", "wisconsin", "wyoming",
];

/// Size tag from the larger of the two amount bounds, per spec §4.5.
pub fn size_tag(grant: &Grant) -> Option<&'static str> {
    let reference = grant.amount_max.or(grant.amount_min)?;
    Some(if reference <= SMALL_GRANT_CEILING {
        "small-grant"
    } else if reference <= MEDIUM_GRANT_CEILING {
        "medium-grant"
    } else {
        "large-grant"
    })
}

/// Urgency tag if the deadline falls within 30 days of `today`.
pub fn urgency_tag(grant: &Grant, today: NaiveDate) -> Option<&'static str> {
    let deadline = grant.deadline?;
    let days_out = (deadline - today).num_days();
    (0..=URGENT_DEADLINE_DAYS).contains(&days_out).then_some("urgent-deadline")
}

/// Audience tags inferred from eligibility-criteria wording.
pub fn audience_tags(grant: &Grant) -> Vec<&'static str> {
    let lowered = grant.eligibility_criteria.to_lowercase();
    let mut tags = Vec::new();
    if NONPROFIT_MARKERS.iter().any(|m| lowered.contains(m)) {
        tags.push("nonprofit");
    }
    if UNIVERSITY_MARKERS.iter().any(|m| lowered.contains(m)) {
        tags.push("university");
    }
    if GOVERNMENT_MARKERS.iter().any(|m| lowered.contains(m)) {
        tags.push("government-entity");
    }
    if SMALL_BUSINESS_MARKERS.iter().any(|m| lowered.contains(m)) {
        tags.push("small-business");
    }
    if INDIVIDUAL_MARKERS.iter().any(|m| lowered.contains(m)) {
        tags.push("individual");
    }
    tags
}

/// Region tags from the already-extracted location-eligibility set, folding
/// US states/cities into a single `us-state` or `global` signal.
pub fn region_tags(grant: &Grant) -> Vec<String> {
    let mut tags = Vec::new();
    for location in &grant.location_eligibility {
        if location == "global" {
            tags.push("global".to_string());
        } else if location == "africa" || location == "asia" || location == "latin america" {
            tags.push(location.replace(' ', "-"));
        } else if US_STATE_SLUGS.contains(&location.as_str()) {
            tags.push(format!("us-{}", location.replace(' ', "-")));
        }
    }
    tags.sort();
    tags.dedup();
    tags
}

/// Thematic tags from keyword presence across the combined grant text.
pub fn thematic_tags(combined_text: &str) -> Vec<&'static str> {
    let lowered = combined_text.to_lowercase();
    THEMATIC_MARKERS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| lowered.contains(m)))
        .map(|(tag, _)| *tag)
        .collect()
}

/// Maps detected [`GrantTypeTag`]s onto the thematic tag vocabulary, adding
/// a modest confidence bump for each distinct type that agrees.
pub fn grant_type_tags(types: &std::collections::BTreeSet<GrantTypeTag>) -> Vec<String> {
    types.iter().map(|t| t.to_string()).collect()
}
