use chrono::{DateTime, Utc};

use grant_common::types::SourceMetrics;

const CONSECUTIVE_FAILURE_THRESHOLD: u64 = 3;

/// Outcome of a single scrape attempt, applied to a source's rolling metrics.
#[derive(Debug, Clone)]
pub struct MetricsDelta {
    pub success: bool,
    pub parse_ms: Option<u64>,
    pub error: Option<String>,
}

/// Updates rolling counters and recomputes success-rate after a completed
/// scrape (spec §4.7). `fail_count` tracks the current consecutive-failure
/// streak and resets on success; `success_count` is cumulative.
pub fn apply_delta(metrics: &mut SourceMetrics, delta: &MetricsDelta, now: DateTime<Utc>) {
    if delta.success {
        metrics.success_count += 1;
        metrics.fail_count = 0;
        metrics.last_error = None;
    } else {
        metrics.fail_count += 1;
        metrics.last_error = delta.error.clone();
    }

    if let Some(parse_ms) = delta.parse_ms {
        let total = metrics.success_count + metrics.fail_count;
        metrics.avg_parse_ms = if total <= 1 {
            parse_ms as f64
        } else {
            (metrics.avg_parse_ms * (total - 1) as f64 + parse_ms as f64) / total as f64
        };
    }

    metrics.last_scraped_at = Some(now);
    metrics.recompute_success_rate();
}

/// A source is due for a health recheck once it has at least 3 consecutive
/// failures and hasn't been scraped within `staleness`.
pub fn is_due_for_recheck(metrics: &SourceMetrics, now: DateTime<Utc>, staleness: chrono::Duration) -> bool {
    if metrics.fail_count < CONSECUTIVE_FAILURE_THRESHOLD {
        return false;
    }
    match metrics.last_scraped_at {
        Some(last) => now - last >= staleness,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_resets_the_failure_streak() {
        let mut metrics = SourceMetrics::default();
        let now = Utc::now();
        apply_delta(&mut metrics, &MetricsDelta { success: false, parse_ms: None, error: Some("boom".into()) }, now);
        apply_delta(&mut metrics, &MetricsDelta { success: false, parse_ms: None, error: Some("boom".into()) }, now);
        apply_delta(&mut metrics, &MetricsDelta { success: true, parse_ms: Some(100), error: None }, now);
        assert_eq!(metrics.fail_count, 0);
        assert_eq!(metrics.success_count, 1);
    }

    #[test]
    fn three_consecutive_failures_trigger_recheck() {
        let mut metrics = SourceMetrics::default();
        let now = Utc::now();
        for _ in 0..3 {
            apply_delta(&mut metrics, &MetricsDelta { success: false, parse_ms: None, error: Some("boom".into()) }, now);
        }
        assert!(is_due_for_recheck(&metrics, now, chrono::Duration::seconds(0)));
    }

    #[test]
    fn recent_scrape_suppresses_recheck_despite_failures() {
        let mut metrics = SourceMetrics::default();
        let now = Utc::now();
        for _ in 0..3 {
            apply_delta(&mut metrics, &MetricsDelta { success: false, parse_ms: None, error: Some("boom".into()) }, now);
        }
        assert!(!is_due_for_recheck(&metrics, now, chrono::Duration::hours(1)));
    }
}
