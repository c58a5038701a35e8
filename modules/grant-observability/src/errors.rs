use chrono::{DateTime, Utc};
use uuid::Uuid;

use grant_common::ErrorCategory;

#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub source_id: Uuid,
    pub job_id: Uuid,
    pub category: ErrorCategory,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

/// Sink for errors surfaced during a job's pipeline (spec §4.9 step 8).
pub trait ErrorTracker: Send + Sync {
    fn record(&self, event: ErrorEvent);
}

/// Logs every event at `error` level with structured fields, the same
/// shape the Orchestrator forwards to Slack via the Alerter for
/// AUTHENTICATION/DATABASE categories.
pub struct TracingErrorTracker;

impl ErrorTracker for TracingErrorTracker {
    fn record(&self, event: ErrorEvent) {
        tracing::error!(
            source_id = %event.source_id,
            job_id = %event.job_id,
            category = %event.category,
            "{}",
            event.message
        );
    }
}

#[cfg(feature = "test-support")]
pub struct InMemoryErrorTracker {
    pub events: std::sync::Mutex<Vec<ErrorEvent>>,
}

#[cfg(feature = "test-support")]
impl Default for InMemoryErrorTracker {
    fn default() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(feature = "test-support")]
impl ErrorTracker for InMemoryErrorTracker {
    fn record(&self, event: ErrorEvent) {
        self.events.lock().expect("error tracker lock poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_error_tracker_does_not_panic() {
        let tracker = TracingErrorTracker;
        tracker.record(ErrorEvent {
            source_id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            category: ErrorCategory::Network,
            message: "connection refused".to_string(),
            occurred_at: Utc::now(),
        });
    }
}
