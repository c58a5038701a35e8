use std::time::Duration;

use reqwest::Client;

const HEALTH_CHECK_TIMEOUT_SEC: u64 = 10;

#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub status_code: Option<u16>,
    pub response_time_ms: u64,
    pub error: Option<String>,
}

/// Single HEAD (falling back to GET on 405) probe of the source URL with a
/// 10s timeout (spec §4.7).
pub async fn check_health(client: &Client, url: &str) -> HealthCheckResult {
    let started = std::time::Instant::now();
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SEC);

    let head_result = client.head(url).timeout(timeout).send().await;
    let result = match head_result {
        Ok(resp) if resp.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED => {
            client.get(url).timeout(timeout).send().await
        }
        other => other,
    };

    let response_time_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(resp) => HealthCheckResult {
            healthy: resp.status().is_success(),
            status_code: Some(resp.status().as_u16()),
            response_time_ms,
            error: if resp.status().is_success() {
                None
            } else {
                Some(format!("unhealthy status: {}", resp.status()))
            },
        },
        Err(e) => HealthCheckResult {
            healthy: false,
            status_code: e.status().map(|s| s.as_u16()),
            response_time_ms,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unhealthy_result_carries_an_error_message() {
        let result = HealthCheckResult {
            healthy: false,
            status_code: Some(503),
            response_time_ms: 42,
            error: Some("unhealthy status: 503 Service Unavailable".to_string()),
        };
        assert!(!result.healthy);
        assert!(result.error.is_some());
    }
}
