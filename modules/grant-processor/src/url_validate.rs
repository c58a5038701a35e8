use url::Url;

/// Accepts a bare `host/path`, prepending `https://`; rejects anything
/// without a parsable host. Returns `None` with an implicit warning (the
/// caller records it) when the input can't be salvaged.
pub fn validate_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(trimmed) {
        if url.host_str().is_some() {
            return Some(url.to_string());
        }
        return None;
    }

    let with_scheme = format!("https://{trimmed}");
    let url = Url::parse(&with_scheme).ok()?;
    url.host_str()?;
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_absolute_url() {
        assert_eq!(
            validate_url("https://example.org/apply"),
            Some("https://example.org/apply".to_string())
        );
    }

    #[test]
    fn prepends_https_to_a_bare_host() {
        assert_eq!(validate_url("example.org/apply"), Some("https://example.org/apply".to_string()));
    }

    #[test]
    fn rejects_unparseable_input() {
        assert_eq!(validate_url("not a url at all!!"), None);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(validate_url(""), None);
    }
}
