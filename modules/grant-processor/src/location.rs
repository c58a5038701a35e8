use std::collections::BTreeSet;

const US_STATES: &[&str] = &[
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado", "connecticut",
    "delaware", "florida", "georgia", "hawaii", "idaho", "illinois", "indiana", "iowa",
    "kansas", "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan",
    "minnesota", "mississippi", "missouri", "montana", "nebraska", "nevada",
    "new hampshire", "new jersey", "new mexico", "new york", "north carolina",
    "north dakota", "ohio", "oklahoma", "oregon", "pennsylvania", "rhode island",
    "south carolina", "south dakota", "tennessee", "texas", "utah", "vermont",
    "virginia", "washington", "west virginia", "wisconsin", "wyoming",
];

const MAJOR_CITIES: &[&str] = &[
    "new york city", "los angeles", "chicago", "houston", "phoenix", "philadelphia",
    "san antonio", "san diego", "dallas", "austin", "london", "nairobi", "lagos",
    "mumbai", "delhi", "sao paulo", "mexico city", "toronto",
];

const COUNTRIES: &[&str] = &[
    "united states", "canada", "mexico", "united kingdom", "kenya", "nigeria", "india",
    "brazil", "south africa", "germany", "france", "australia", "japan",
];

const REGIONS: &[&str] = &["africa", "asia", "latin america", "europe", "middle east", "oceania", "global"];

/// Every configured place name found in `text`, case-insensitively. Intended
/// to run against eligibility/description text, not titles.
pub fn extract_locations(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    US_STATES
        .iter()
        .chain(MAJOR_CITIES)
        .chain(COUNTRIES)
        .chain(REGIONS)
        .filter(|place| lowered.contains(*place))
        .map(|place| place.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_us_state_and_a_region() {
        let locations = extract_locations("Open to applicants in California and across Africa.");
        assert!(locations.contains("california"));
        assert!(locations.contains("africa"));
    }

    #[test]
    fn finds_nothing_in_unrelated_text() {
        assert!(extract_locations("No geographic restriction mentioned.").is_empty());
    }
}
