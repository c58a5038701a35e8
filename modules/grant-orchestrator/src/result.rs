use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use grant_common::ErrorCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    pub category: ErrorCategory,
    pub message: String,
}

/// Outcome of one Orchestrator pass over a job's source (spec §4.9 step 10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingResult {
    pub source_id: Uuid,
    pub total_found: usize,
    pub total_inserted: usize,
    pub total_updated: usize,
    pub total_skipped: usize,
    pub errors: Vec<JobError>,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub cancelled: bool,
}

impl ScrapingResult {
    pub fn empty(source_id: Uuid) -> Self {
        Self {
            source_id,
            total_found: 0,
            total_inserted: 0,
            total_updated: 0,
            total_skipped: 0,
            errors: Vec::new(),
            duration: Duration::ZERO,
            cancelled: false,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
