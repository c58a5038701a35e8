mod errors;
mod metrics;

pub use errors::{ErrorEvent, ErrorTracker, TracingErrorTracker};
pub use metrics::{JobOutcome, MetricsCollector, TracingMetricsCollector};

#[cfg(feature = "test-support")]
pub use errors::InMemoryErrorTracker;
#[cfg(feature = "test-support")]
pub use metrics::InMemoryMetricsCollector;
