use url::Url;

use grant_common::types::Source;

const HIGH_REQUEST_RATE_THRESHOLD: u32 = 100;

#[derive(Debug, Clone, Default)]
pub struct ConfigValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates a Source configuration before it is persisted (spec §4.7).
pub fn validate_config(source: &Source) -> ConfigValidation {
    let mut result = ConfigValidation::default();

    match Url::parse(&source.url) {
        Ok(parsed) if parsed.host().is_some() => {}
        Ok(_) => result.errors.push("url must be absolute with a host".to_string()),
        Err(e) => result.errors.push(format!("url is not parsable: {e}")),
    }

    if source.requires_selectors() && source.selectors.container.is_none() {
        result.errors.push(format!(
            "engine {:?} requires a container selector",
            source.engine
        ));
    }

    if source.rate_limit.requests_per_minute == 0 && source.rate_limit.min_delay_ms == 0 {
        result.errors.push("rate_limit must specify a positive requests_per_minute or min_delay_ms".to_string());
    }
    if source.rate_limit.requests_per_minute > HIGH_REQUEST_RATE_THRESHOLD {
        result.warnings.push(format!(
            "requests_per_minute {} exceeds the {HIGH_REQUEST_RATE_THRESHOLD}/min guideline",
            source.rate_limit.requests_per_minute
        ));
    }

    if let Some(auth) = &source.authentication {
        if let Err(message) = validate_authentication(auth) {
            result.errors.push(message);
        }
    }

    result
}

fn validate_authentication(auth: &grant_common::types::Authentication) -> Result<(), String> {
    use grant_common::types::Authentication::*;
    match auth {
        Bearer { token } if token.trim().is_empty() => Err("bearer authentication requires a token".to_string()),
        Basic { username, password } if username.trim().is_empty() || password.trim().is_empty() => {
            Err("basic authentication requires both username and password".to_string())
        }
        ApiKey { header, key } if header.trim().is_empty() || key.trim().is_empty() => {
            Err("api-key authentication requires both header and key".to_string())
        }
        OAuth2 {
            client_id,
            client_secret,
            token_url,
        } if client_id.trim().is_empty() || client_secret.trim().is_empty() || token_url.trim().is_empty() => {
            Err("oauth2 authentication requires client_id, client_secret, and token_url".to_string())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grant_common::types::{RateLimit, ScrapeEngineKind, Selectors, Source, SourceStatus, SourceType, Frequency};
    use uuid::Uuid;

    fn base_source() -> Source {
        Source {
            id: Uuid::new_v4(),
            url: "https://example.org/grants".to_string(),
            source_type: SourceType::Foundation,
            engine: ScrapeEngineKind::Static,
            selectors: Selectors {
                container: Some(".grant".to_string()),
                ..Default::default()
            },
            rate_limit: RateLimit::default(),
            headers: Default::default(),
            authentication: None,
            pagination: None,
            status: SourceStatus::Active,
            frequency: Frequency::Daily,
            metrics: Default::default(),
        }
    }

    #[test]
    fn a_well_formed_static_source_validates_clean() {
        let result = validate_config(&base_source());
        assert!(result.is_valid());
    }

    #[test]
    fn relative_url_is_rejected() {
        let mut source = base_source();
        source.url = "/grants".to_string();
        let result = validate_config(&source);
        assert!(!result.is_valid());
    }

    #[test]
    fn static_engine_without_container_selector_is_rejected() {
        let mut source = base_source();
        source.selectors.container = None;
        let result = validate_config(&source);
        assert!(!result.is_valid());
    }

    #[test]
    fn high_request_rate_is_a_warning_not_an_error() {
        let mut source = base_source();
        source.rate_limit.requests_per_minute = 500;
        let result = validate_config(&source);
        assert!(result.is_valid());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn empty_bearer_token_is_rejected() {
        let mut source = base_source();
        source.authentication = Some(grant_common::types::Authentication::Bearer { token: String::new() });
        let result = validate_config(&source);
        assert!(!result.is_valid());
    }
}
