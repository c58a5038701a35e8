mod health;
mod metrics;
mod validate;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use grant_common::ports::GrantStore;
use grant_common::types::{Source, SourceStatus};
use grant_common::{GrantError, Result};

pub use health::{check_health, HealthCheckResult};
pub use metrics::{apply_delta, is_due_for_recheck, MetricsDelta};
pub use validate::{validate_config, ConfigValidation};

/// No cooldown by default: once a source crosses the consecutive-failure
/// threshold it is immediately due for recheck. Callers with a health-check
/// loop running on an interval already get natural rate-limiting from that.
const DEFAULT_STALENESS: chrono::Duration = chrono::Duration::zero();

/// Owns the Source lifecycle: config validation, health checks, metrics
/// bookkeeping, and CRUD against the [`GrantStore`] (spec §4.7).
pub struct SourceManager<S: GrantStore> {
    store: Arc<S>,
    http: reqwest::Client,
}

impl<S: GrantStore> SourceManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            http: reqwest::Client::new(),
        }
    }

    pub async fn get_active(&self, id: Uuid) -> Result<Source> {
        let source = self.store.get_source(id).await?;
        if source.status != SourceStatus::Active {
            return Err(GrantError::NotFound(format!("source {id} is not active")));
        }
        Ok(source)
    }

    pub async fn list_active(&self) -> Result<Vec<Source>> {
        self.store.list_active_sources().await
    }

    /// Validates, health-checks, and persists a new source.
    pub async fn create(&self, source: Source) -> Result<Source> {
        let validation = validate_config(&source);
        if !validation.is_valid() {
            return Err(GrantError::Validation(validation.errors.join("; ")));
        }
        for warning in &validation.warnings {
            tracing::warn!(source_url = %source.url, warning, "source config warning");
        }

        let health = check_health(&self.http, &source.url).await;
        if !health.healthy {
            return Err(GrantError::Network(format!(
                "health check failed for {}: {}",
                source.url,
                health.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        self.store.save_source(&source).await?;
        Ok(source)
    }

    /// Applies a partial update (caller mutates a clone) and re-persists.
    pub async fn update(&self, id: Uuid, mutate: impl FnOnce(&mut Source)) -> Result<Source> {
        let mut source = self.store.get_source(id).await?;
        mutate(&mut source);
        let validation = validate_config(&source);
        if !validation.is_valid() {
            return Err(GrantError::Validation(validation.errors.join("; ")));
        }
        self.store.save_source(&source).await?;
        Ok(source)
    }

    pub async fn disable(&self, id: Uuid, reason: &str) -> Result<Source> {
        let mut source = self.store.get_source(id).await?;
        source.status = SourceStatus::Inactive;
        source.metrics.last_error = Some(reason.to_string());
        self.store.save_source(&source).await?;
        Ok(source)
    }

    /// Re-enables a source, refusing if its health check fails.
    pub async fn enable(&self, id: Uuid) -> Result<Source> {
        let mut source = self.store.get_source(id).await?;
        let health = check_health(&self.http, &source.url).await;
        if !health.healthy {
            return Err(GrantError::Network(format!(
                "refusing to enable {}: health check failed",
                source.url
            )));
        }
        source.status = SourceStatus::Active;
        self.store.save_source(&source).await?;
        Ok(source)
    }

    /// Updates rolling metrics after a completed scrape. Does not itself
    /// change `status` — `due_for_health_check` surfaces sources that need
    /// attention; `disable`/`enable` are the explicit status transitions.
    pub async fn update_metrics(&self, id: Uuid, delta: MetricsDelta) -> Result<Source> {
        let mut source = self.store.get_source(id).await?;
        apply_delta(&mut source.metrics, &delta, Utc::now());
        self.store.save_source(&source).await?;
        Ok(source)
    }

    pub async fn due_for_health_check(&self) -> Result<Vec<Source>> {
        let sources = self.store.list_active_sources().await?;
        let now = Utc::now();
        Ok(sources
            .into_iter()
            .filter(|s| is_due_for_recheck(&s.metrics, now, DEFAULT_STALENESS))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grant_common::ports::fakes::InMemoryGrantStore;
    use grant_common::types::{Frequency, RateLimit, ScrapeEngineKind, Selectors, SourceType};

    fn sample_source() -> Source {
        Source {
            id: Uuid::new_v4(),
            url: "https://example.org/grants".to_string(),
            source_type: SourceType::Foundation,
            engine: ScrapeEngineKind::Api,
            selectors: Selectors::default(),
            rate_limit: RateLimit::default(),
            headers: Default::default(),
            authentication: None,
            pagination: None,
            status: SourceStatus::Active,
            frequency: Frequency::Daily,
            metrics: Default::default(),
        }
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_without_persisting() {
        let store = Arc::new(InMemoryGrantStore::new());
        let manager = SourceManager::new(store.clone());
        let mut source = sample_source();
        source.url = "not a url".to_string();
        let result = manager.create(source).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn disable_then_get_active_fails() {
        let store = Arc::new(InMemoryGrantStore::new());
        store.seed_source(sample_source());
        let manager = SourceManager::new(store.clone());
        let sources = manager.list_active().await.unwrap();
        let id = sources[0].id;
        manager.disable(id, "manual disable").await.unwrap();
        assert!(manager.get_active(id).await.is_err());
    }

    #[tokio::test]
    async fn three_consecutive_failures_flag_the_source_for_recheck() {
        let store = Arc::new(InMemoryGrantStore::new());
        store.seed_source(sample_source());
        let manager = SourceManager::new(store.clone());
        let id = store.list_active_sources().await.unwrap()[0].id;

        for _ in 0..3 {
            manager
                .update_metrics(id, MetricsDelta { success: false, parse_ms: None, error: Some("boom".into()) })
                .await
                .unwrap();
        }

        let due = manager.due_for_health_check().await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, id);
    }
}
