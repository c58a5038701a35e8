mod result;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use grant_common::ports::{Alerter, GrantStore, Severity, UpsertOutcome};
use grant_common::types::{Job, Source};
use grant_common::{Config, ErrorCategory, GrantError};
use grant_observability::{ErrorEvent, ErrorTracker, JobOutcome, MetricsCollector};
use grant_processor::{Processor, ProcessorConfig};
use grant_sources::SourceManager;

pub use result::{JobError, ScrapingResult};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_concurrent_sources: usize,
    pub enable_classifier: bool,
    pub enable_cross_batch_dedup: bool,
    pub cross_batch_candidate_limit: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sources: 5,
            enable_classifier: true,
            enable_cross_batch_dedup: true,
            cross_batch_candidate_limit: 50,
        }
    }
}

/// Runs the scrape → process → validate → classify → dedup → persist
/// pipeline for a single job (spec §4.9). One instance is shared across
/// worker loops; the semaphore is the only thing gating concurrency here —
/// job selection itself is the Scheduler's job.
pub struct Orchestrator<S: GrantStore, A: Alerter> {
    sources: Arc<SourceManager<S>>,
    store: Arc<S>,
    alerter: Arc<A>,
    error_tracker: Arc<dyn ErrorTracker>,
    metrics_collector: Arc<dyn MetricsCollector>,
    config: Config,
    orchestrator_config: OrchestratorConfig,
    semaphore: Arc<Semaphore>,
}

impl<S: GrantStore, A: Alerter> Orchestrator<S, A> {
    pub fn new(
        sources: Arc<SourceManager<S>>,
        store: Arc<S>,
        alerter: Arc<A>,
        error_tracker: Arc<dyn ErrorTracker>,
        metrics_collector: Arc<dyn MetricsCollector>,
        config: Config,
        orchestrator_config: OrchestratorConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(orchestrator_config.max_concurrent_sources.max(1)));
        Self {
            sources,
            store,
            alerter,
            error_tracker,
            metrics_collector,
            config,
            orchestrator_config,
            semaphore,
        }
    }

    pub async fn execute(&self, job: &Job) -> ScrapingResult {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("orchestrator semaphore never closes");
        let started = Instant::now();
        let mut result = ScrapingResult::empty(job.source_id);

        let source = match self.load_source(job).await {
            Ok(Some(source)) => source,
            Ok(None) => {
                result.cancelled = true;
                result.duration = started.elapsed();
                return result;
            }
            Err(e) => {
                self.record_error(job, &mut result, e).await;
                result.duration = started.elapsed();
                self.metrics_collector.record_job(&self.outcome(&result));
                return result;
            }
        };

        let raw_grants = match grant_engines::engine_for(source.engine, &self.config).fetch(&source).await {
            Ok(raw) => raw,
            Err(e) => {
                self.record_error(job, &mut result, e).await;
                self.update_source_metrics(&source, false, started.elapsed()).await;
                result.duration = started.elapsed();
                self.metrics_collector.record_job(&self.outcome(&result));
                return result;
            }
        };
        result.total_found = raw_grants.len();

        let processor = Processor::new(ProcessorConfig {
            aggressive_normalization: false,
            currency_rates: self.config.currency_rates.clone(),
        });

        let mut survivors = Vec::new();
        for raw in &raw_grants {
            let (mut grant, report) = processor.process(raw);
            if !report.errors.is_empty() {
                tracing::warn!(errors = ?report.errors, "dropping raw grant that failed processing");
                continue;
            }
            let validation = grant_validator::validate(&mut grant);
            if !validation.valid {
                tracing::info!(errors = ?validation.errors, "dropping grant that failed validation");
                continue;
            }
            survivors.push(if self.orchestrator_config.enable_classifier {
                apply_classification(grant)
            } else {
                grant
            });
        }

        if job.metadata.cancel_requested {
            result.cancelled = true;
            result.duration = started.elapsed();
            return result;
        }

        let (deduped, _dropped_within_batch) = grant_dedup::dedup_within_batch(survivors);
        let to_persist = if self.orchestrator_config.enable_cross_batch_dedup {
            self.merge_cross_batch_matches(deduped).await
        } else {
            deduped
        };

        for grant in &to_persist {
            match self.store.upsert_grant(grant, source.id).await {
                Ok(UpsertOutcome::Inserted(_)) => result.total_inserted += 1,
                Ok(UpsertOutcome::Updated(_, _)) => result.total_updated += 1,
                Ok(UpsertOutcome::Skipped) => result.total_skipped += 1,
                Err(e) => self.record_error(job, &mut result, e).await,
            }
        }

        let succeeded = result.errors.is_empty();
        self.update_source_metrics(&source, succeeded, started.elapsed()).await;

        result.duration = started.elapsed();
        self.metrics_collector.record_job(&self.outcome(&result));
        result
    }

    async fn load_source(&self, job: &Job) -> grant_common::Result<Option<Source>> {
        if job.metadata.cancel_requested {
            return Ok(None);
        }
        match self.sources.get_active(job.source_id).await {
            Ok(source) => Ok(Some(source)),
            Err(GrantError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn merge_cross_batch_matches(&self, candidates: Vec<grant_common::types::Grant>) -> Vec<grant_common::types::Grant> {
        let mut merged = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let known = self
                .store
                .list_candidates_for_funder(&candidate.funder.name, self.orchestrator_config.cross_batch_candidate_limit)
                .await
                .unwrap_or_default();
            let matches = grant_dedup::find_matches(&candidate, &known);
            match matches.into_iter().next() {
                Some((existing, _score)) => merged.push(grant_dedup::merge_grants(existing, &candidate)),
                None => merged.push(candidate),
            }
        }
        merged
    }

    async fn record_error(&self, job: &Job, result: &mut ScrapingResult, error: GrantError) {
        let category = error.category();
        let message = error.to_string();

        self.error_tracker.record(ErrorEvent {
            source_id: job.source_id,
            job_id: job.id,
            category,
            message: message.clone(),
            occurred_at: chrono::Utc::now(),
        });

        if matches!(category, ErrorCategory::Authentication | ErrorCategory::Database) {
            let alert = format!("{category} error on source {}: {message}", job.source_id);
            if let Err(e) = self.alerter.notify(Severity::Critical, &alert).await {
                tracing::error!(error = %e, "failed to deliver alert");
            }
        }

        result.errors.push(JobError { category, message });
    }

    async fn update_source_metrics(&self, source: &Source, success: bool, elapsed: std::time::Duration) {
        let delta = grant_sources::MetricsDelta {
            success,
            parse_ms: Some(elapsed.as_millis() as u64),
            error: if success { None } else { Some("scrape failed".to_string()) },
        };
        if let Err(e) = self.sources.update_metrics(source.id, delta).await {
            tracing::warn!(error = %e, source_id = %source.id, "failed to update source metrics");
        }
    }

    fn outcome(&self, result: &ScrapingResult) -> JobOutcome {
        JobOutcome {
            source_id: result.source_id,
            total_found: result.total_found,
            total_inserted: result.total_inserted,
            total_updated: result.total_updated,
            total_skipped: result.total_skipped,
            error_count: result.errors.len(),
            duration: result.duration,
        }
    }
}

fn apply_classification(mut grant: grant_common::types::Grant) -> grant_common::types::Grant {
    let classification = grant_classifier::classify(&grant);
    grant.category = classification.category;
    grant.tags = classification.tags;
    grant
}
