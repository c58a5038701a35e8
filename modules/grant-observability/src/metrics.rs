use std::time::Duration;

use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct JobOutcome {
    pub source_id: Uuid,
    pub total_found: usize,
    pub total_inserted: usize,
    pub total_updated: usize,
    pub total_skipped: usize,
    pub error_count: usize,
    pub duration: Duration,
}

/// Sink for per-job outcome metrics (spec §4.9 step 8-10).
pub trait MetricsCollector: Send + Sync {
    fn record_job(&self, outcome: &JobOutcome);
}

pub struct TracingMetricsCollector;

impl MetricsCollector for TracingMetricsCollector {
    fn record_job(&self, outcome: &JobOutcome) {
        tracing::info!(
            source_id = %outcome.source_id,
            total_found = outcome.total_found,
            total_inserted = outcome.total_inserted,
            total_updated = outcome.total_updated,
            total_skipped = outcome.total_skipped,
            error_count = outcome.error_count,
            duration_ms = outcome.duration.as_millis() as u64,
            "job completed"
        );
    }
}

#[cfg(feature = "test-support")]
pub struct InMemoryMetricsCollector {
    pub outcomes: std::sync::Mutex<Vec<JobOutcome>>,
}

#[cfg(feature = "test-support")]
impl Default for InMemoryMetricsCollector {
    fn default() -> Self {
        Self {
            outcomes: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(feature = "test-support")]
impl MetricsCollector for InMemoryMetricsCollector {
    fn record_job(&self, outcome: &JobOutcome) {
        self.outcomes.lock().expect("metrics collector lock poisoned").push(outcome.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_metrics_collector_does_not_panic() {
        let collector = TracingMetricsCollector;
        collector.record_job(&JobOutcome {
            source_id: Uuid::new_v4(),
            total_found: 10,
            total_inserted: 5,
            total_updated: 2,
            total_skipped: 3,
            error_count: 0,
            duration: Duration::from_millis(250),
        });
    }
}
