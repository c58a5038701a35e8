use serde::{Deserialize, Serialize};

/// Closed error-category taxonomy used for metrics and alerting (spec §4.9, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Network,
    Parsing,
    Validation,
    RateLimit,
    Authentication,
    Captcha,
    Database,
    ContentChanged,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Network => "NETWORK",
            Self::Parsing => "PARSING",
            Self::Validation => "VALIDATION",
            Self::RateLimit => "RATE_LIMIT",
            Self::Authentication => "AUTHENTICATION",
            Self::Captcha => "CAPTCHA",
            Self::Database => "DATABASE",
            Self::ContentChanged => "CONTENT_CHANGED",
        };
        write!(f, "{s}")
    }
}

/// Single error type shared across every component boundary, mirroring the
/// teacher's one-enum-per-workspace convention rather than splitting by crate.
#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parsing error: {0}")]
    Parsing(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("captcha encountered: {0}")]
    Captcha(String),

    #[error("datastore error: {0}")]
    Database(String),

    #[error("content changed mid-fetch: {0}")]
    ContentChanged(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl GrantError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) | Self::Io(_) | Self::Http(_) => ErrorCategory::Network,
            Self::Parsing(_) => ErrorCategory::Parsing,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::RateLimit(_) => ErrorCategory::RateLimit,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Captcha(_) => ErrorCategory::Captcha,
            Self::Database(_) => ErrorCategory::Database,
            Self::ContentChanged(_) => ErrorCategory::ContentChanged,
            Self::Config(_) => ErrorCategory::Validation,
            Self::NotFound(_) => ErrorCategory::Database,
            Self::Anyhow(_) => ErrorCategory::Network,
        }
    }

    /// Whether the orchestrator should retry the job that produced this error
    /// (spec §4.9: network/rate-limit are transient, the rest are not).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::RateLimit
        )
    }
}

pub type Result<T> = std::result::Result<T, GrantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_display_matches_spec_constants() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::ContentChanged.to_string(), "CONTENT_CHANGED");
    }

    #[test]
    fn retryable_categories_are_network_and_rate_limit_only() {
        assert!(GrantError::Network("x".into()).is_retryable());
        assert!(GrantError::RateLimit("x".into()).is_retryable());
        assert!(!GrantError::Validation("x".into()).is_retryable());
        assert!(!GrantError::Authentication("x".into()).is_retryable());
    }
}
