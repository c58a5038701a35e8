use grant_common::types::SourceType;

const NGO_MARKERS: &[&str] = &["who.int", "world bank", "red cross", "unicef", ".ngo"];
const BUSINESS_SUFFIXES: &[&str] = &["inc.", "inc", "corp", "corporation", "llc", "ltd", "co.", "plc"];

/// Infer the funder's type from its URL and name, per spec §4.3's TLD/name
/// heuristics. Defaults to foundation when nothing else matches.
pub fn infer_funder_type(source_url: &str, funder_name: &str) -> SourceType {
    let url_lower = source_url.to_lowercase();
    let name_lower = funder_name.to_lowercase();

    if url_lower.contains(".gov") || name_lower.contains("department of") {
        return SourceType::Gov;
    }
    if NGO_MARKERS.iter().any(|m| url_lower.contains(m) || name_lower.contains(m)) {
        return SourceType::Ngo;
    }
    if BUSINESS_SUFFIXES.iter().any(|suffix| name_lower.ends_with(suffix) || name_lower.contains(&format!(" {suffix}"))) {
        return SourceType::Business;
    }
    SourceType::Foundation
}
