use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap()
});
static WEBSITE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s<>\"']+").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub websites: Vec<String>,
}

/// Every email, phone number, and URL found in `text`, each deduplicated and
/// in first-seen order.
pub fn extract_contact_info(text: &str) -> ContactInfo {
    ContactInfo {
        emails: dedup_ordered(EMAIL.find_iter(text).map(|m| m.as_str().to_string())),
        phones: dedup_ordered(PHONE.find_iter(text).map(|m| m.as_str().to_string())),
        websites: dedup_ordered(
            WEBSITE
                .find_iter(text)
                .map(|m| m.as_str().trim_end_matches(['.', ',']).to_string()),
        ),
    }
}

fn dedup_ordered(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_email_phone_and_website() {
        let text = "Contact grants@example.org or call (555) 123-4567. Visit https://example.org/grants.";
        let info = extract_contact_info(text);
        assert_eq!(info.emails, vec!["grants@example.org"]);
        assert_eq!(info.phones, vec!["(555) 123-4567"]);
        assert_eq!(info.websites, vec!["https://example.org/grants".to_string()]);
    }

    #[test]
    fn deduplicates_repeated_contacts() {
        let text = "Email us: a@b.com. Again: a@b.com.";
        let info = extract_contact_info(text);
        assert_eq!(info.emails.len(), 1);
    }
}
