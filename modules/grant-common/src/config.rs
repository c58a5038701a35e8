use std::collections::BTreeMap;
use std::env;

use crate::error::{GrantError, Result};

/// Process-wide tunables, loaded once at startup from the environment.
///
/// Mirrors `rootsignal-common::config::Config`: one struct, one `from_env`
/// constructor, defaults baked in rather than scattered across call sites.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_concurrent_jobs: usize,
    pub max_concurrent_sources: usize,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub health_check_interval_sec: u64,
    pub stuck_job_timeout_sec: u64,
    pub job_retention_sec: u64,
    pub static_timeout_sec: u64,
    pub browser_timeout_sec: u64,
    pub api_timeout_sec: u64,
    pub pdf_timeout_sec: u64,
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub slack_webhook_url: Option<String>,
    /// ISO 4217 code -> USD per one unit of that currency.
    pub currency_rates: BTreeMap<String, f64>,
}

fn default_currency_rates() -> BTreeMap<String, f64> {
    let mut rates = BTreeMap::new();
    rates.insert("USD".to_string(), 1.0);
    rates.insert("EUR".to_string(), 1.10);
    rates.insert("GBP".to_string(), 1.27);
    rates.insert("CAD".to_string(), 0.73);
    rates.insert("AUD".to_string(), 0.65);
    rates.insert("JPY".to_string(), 0.0067);
    rates.insert("CHF".to_string(), 1.14);
    rates
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 5,
            max_concurrent_sources: 5,
            retry_attempts: 3,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 300_000,
            health_check_interval_sec: 60,
            stuck_job_timeout_sec: 1_800,
            job_retention_sec: 86_400,
            static_timeout_sec: 30,
            browser_timeout_sec: 60,
            api_timeout_sec: 30,
            pdf_timeout_sec: 90,
            browserless_url: None,
            browserless_token: None,
            slack_webhook_url: None,
            currency_rates: default_currency_rates(),
        }
    }
}

impl Config {
    /// Load from the environment, falling back to [`Config::default`] values
    /// for anything unset. Parse failures on numeric vars are configuration
    /// errors, not panics.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_concurrent_jobs: parse_env_or("MAX_CONCURRENT_JOBS", defaults.max_concurrent_jobs)?,
            max_concurrent_sources: parse_env_or(
                "MAX_CONCURRENT_SOURCES",
                defaults.max_concurrent_sources,
            )?,
            retry_attempts: parse_env_or("RETRY_ATTEMPTS", defaults.retry_attempts)?,
            retry_base_delay_ms: parse_env_or(
                "GRANT_RETRY_BASE_DELAY_MS",
                defaults.retry_base_delay_ms,
            )?,
            retry_max_delay_ms: parse_env_or(
                "GRANT_RETRY_MAX_DELAY_MS",
                defaults.retry_max_delay_ms,
            )?,
            health_check_interval_sec: parse_env_or(
                "HEALTH_CHECK_INTERVAL_SEC",
                defaults.health_check_interval_sec,
            )?,
            stuck_job_timeout_sec: parse_env_or(
                "STUCK_TIMEOUT_SEC",
                defaults.stuck_job_timeout_sec,
            )?,
            job_retention_sec: parse_env_or("JOB_RETENTION_SEC", defaults.job_retention_sec)?,
            static_timeout_sec: parse_env_or("GRANT_STATIC_TIMEOUT_SEC", defaults.static_timeout_sec)?,
            browser_timeout_sec: parse_env_or(
                "GRANT_BROWSER_TIMEOUT_SEC",
                defaults.browser_timeout_sec,
            )?,
            api_timeout_sec: parse_env_or("GRANT_API_TIMEOUT_SEC", defaults.api_timeout_sec)?,
            pdf_timeout_sec: parse_env_or("GRANT_PDF_TIMEOUT_SEC", defaults.pdf_timeout_sec)?,
            browserless_url: optional_env("BROWSERLESS_URL"),
            browserless_token: optional_env("BROWSERLESS_TOKEN"),
            slack_webhook_url: optional_env("SLACK_WEBHOOK_URL"),
            currency_rates: defaults.currency_rates,
        })
    }

    /// Log every field at info level, redacting secrets to their length only.
    pub fn log_redacted(&self) {
        tracing::info!(
            max_concurrent_jobs = self.max_concurrent_jobs,
            max_concurrent_sources = self.max_concurrent_sources,
            retry_attempts = self.retry_attempts,
            browserless_url_set = self.browserless_url.is_some(),
            browserless_token_len = self.browserless_token.as_ref().map(String::len),
            slack_webhook_set = self.slack_webhook_url.is_some(),
            "loaded configuration"
        );
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .parse()
            .map_err(|e| GrantError::Config(format!("{key}: invalid value {raw:?}: {e}"))),
        _ => Ok(default),
    }
}

/// Panic with a clear message if a truly required variable is absent.
/// Reserved for values with no sane default (credentials for a mandatory
/// backend); most config should go through [`Config::from_env`] instead.
pub fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("required environment variable {key} is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let cfg = Config::default();
        assert!(cfg.retry_base_delay_ms < cfg.retry_max_delay_ms);
        assert!(cfg.currency_rates.contains_key("USD"));
        assert_eq!(cfg.currency_rates["USD"], 1.0);
    }

    #[test]
    fn parse_env_or_falls_back_on_unset() {
        env::remove_var("GRANT_TEST_UNSET_VALUE");
        let value: usize = parse_env_or("GRANT_TEST_UNSET_VALUE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_env_or_rejects_garbage() {
        env::set_var("GRANT_TEST_GARBAGE_VALUE", "not-a-number");
        let result: Result<usize> = parse_env_or("GRANT_TEST_GARBAGE_VALUE", 1);
        assert!(result.is_err());
        env::remove_var("GRANT_TEST_GARBAGE_VALUE");
    }
}
