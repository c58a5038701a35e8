use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::types::{ChangeRecord, Grant, Job, Source};

/// Severity used by [`Alerter`], mirroring the teacher's notify-backend split
/// of per-issue sends versus periodic digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Outcome of persisting a processed grant (spec §4.6/§4.9).
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    Inserted(Uuid),
    Updated(Uuid, ChangeRecord),
    Skipped,
}

/// The persistence boundary. The orchestrator and scheduler depend only on
/// this trait, never on a concrete datastore, the same separation
/// `NotifyBackend` draws between alerting logic and the Slack webhook.
#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn upsert_grant(&self, grant: &Grant, source_id: Uuid) -> Result<UpsertOutcome>;
    async fn find_by_duplicate_hash(&self, hash: &str) -> Result<Vec<Grant>>;
    /// Candidate grants from the same funder, for cross-batch dedup scoring.
    async fn list_candidates_for_funder(&self, funder_name: &str, limit: usize) -> Result<Vec<Grant>>;
    async fn get_source(&self, id: Uuid) -> Result<Source>;
    async fn list_active_sources(&self) -> Result<Vec<Source>>;
    async fn save_source(&self, source: &Source) -> Result<()>;
    async fn save_job(&self, job: &Job) -> Result<()>;
    async fn get_job(&self, id: Uuid) -> Result<Job>;
}

/// Outbound notification port (spec §6), grounded directly in
/// `NotifyBackend`: one method per alert shape, a no-op implementation for
/// tests and local runs.
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn notify(&self, severity: Severity, message: &str) -> Result<()>;
}

pub struct NoopAlerter;

#[async_trait]
impl Alerter for NoopAlerter {
    async fn notify(&self, _severity: Severity, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Time source abstraction so schedulers and retry-backoff math can be
/// tested without sleeping real wall-clock seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(feature = "test-support")]
pub mod fakes {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;

    /// A clock pinned to a fixed instant, advanced explicitly by tests.
    pub struct FakeClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl FakeClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub fn advance(&self, delta: chrono::Duration) {
            let mut guard = self.now.lock().expect("fake clock lock poisoned");
            *guard += delta;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("fake clock lock poisoned")
        }
    }

    /// Records every call instead of sending anything, for assertions in
    /// orchestrator/scheduler tests.
    #[derive(Default)]
    pub struct RecordingAlerter {
        pub calls: Mutex<Vec<(Severity, String)>>,
    }

    #[async_trait]
    impl Alerter for RecordingAlerter {
        async fn notify(&self, severity: Severity, message: &str) -> Result<()> {
            self.calls
                .lock()
                .expect("recording alerter lock poisoned")
                .push((severity, message.to_string()));
            Ok(())
        }
    }

    /// In-memory [`GrantStore`] keyed by duplicate hash and id, for tests
    /// that need upsert/change-detection semantics without a real database.
    #[derive(Default)]
    pub struct InMemoryGrantStore {
        grants: Mutex<BTreeMap<Uuid, (Grant, Uuid)>>,
        by_duplicate_hash: Mutex<BTreeMap<String, Uuid>>,
        sources: Mutex<BTreeMap<Uuid, Source>>,
        jobs: Mutex<BTreeMap<Uuid, Job>>,
    }

    impl InMemoryGrantStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed_source(&self, source: Source) {
            self.sources
                .lock()
                .expect("source lock poisoned")
                .insert(source.id, source);
        }
    }

    #[async_trait]
    impl GrantStore for InMemoryGrantStore {
        async fn upsert_grant(&self, grant: &Grant, source_id: Uuid) -> Result<UpsertOutcome> {
            let existing_id = self
                .by_duplicate_hash
                .lock()
                .expect("dup-hash lock poisoned")
                .get(&grant.duplicate_hash)
                .copied();

            match existing_id {
                Some(id) => {
                    let mut grants = self.grants.lock().expect("grants lock poisoned");
                    let (previous, _) = grants
                        .get(&id)
                        .cloned()
                        .ok_or_else(|| crate::error::GrantError::NotFound(id.to_string()))?;
                    let previous_hash = previous.content_hash.clone();
                    grants.insert(id, (grant.clone(), source_id));
                    if previous_hash == grant.content_hash {
                        Ok(UpsertOutcome::Skipped)
                    } else {
                        let change = ChangeRecord {
                            grant_id: id,
                            previous_hash,
                            current_hash: grant.content_hash.clone(),
                            changed_fields: Default::default(),
                            change_type: crate::types::ChangeType::Minor,
                            detected_at: Utc::now(),
                        };
                        Ok(UpsertOutcome::Updated(id, change))
                    }
                }
                None => {
                    let id = Uuid::new_v4();
                    self.grants
                        .lock()
                        .expect("grants lock poisoned")
                        .insert(id, (grant.clone(), source_id));
                    self.by_duplicate_hash
                        .lock()
                        .expect("dup-hash lock poisoned")
                        .insert(grant.duplicate_hash.clone(), id);
                    Ok(UpsertOutcome::Inserted(id))
                }
            }
        }

        async fn find_by_duplicate_hash(&self, hash: &str) -> Result<Vec<Grant>> {
            let grants = self.grants.lock().expect("grants lock poisoned");
            Ok(grants
                .values()
                .filter(|(g, _)| g.duplicate_hash == hash)
                .map(|(g, _)| g.clone())
                .collect())
        }

        async fn list_candidates_for_funder(&self, funder_name: &str, limit: usize) -> Result<Vec<Grant>> {
            let grants = self.grants.lock().expect("grants lock poisoned");
            Ok(grants
                .values()
                .filter(|(g, _)| g.funder.name.eq_ignore_ascii_case(funder_name))
                .take(limit)
                .map(|(g, _)| g.clone())
                .collect())
        }

        async fn get_source(&self, id: Uuid) -> Result<Source> {
            self.sources
                .lock()
                .expect("source lock poisoned")
                .get(&id)
                .cloned()
                .ok_or_else(|| crate::error::GrantError::NotFound(id.to_string()))
        }

        async fn list_active_sources(&self) -> Result<Vec<Source>> {
            Ok(self
                .sources
                .lock()
                .expect("source lock poisoned")
                .values()
                .filter(|s| s.status == crate::types::SourceStatus::Active)
                .cloned()
                .collect())
        }

        async fn save_source(&self, source: &Source) -> Result<()> {
            self.sources
                .lock()
                .expect("source lock poisoned")
                .insert(source.id, source.clone());
            Ok(())
        }

        async fn save_job(&self, job: &Job) -> Result<()> {
            self.jobs
                .lock()
                .expect("jobs lock poisoned")
                .insert(job.id, job.clone());
            Ok(())
        }

        async fn get_job(&self, id: Uuid) -> Result<Job> {
            self.jobs
                .lock()
                .expect("jobs lock poisoned")
                .get(&id)
                .cloned()
                .ok_or_else(|| crate::error::GrantError::NotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_alerter_always_succeeds() {
        let alerter = NoopAlerter;
        assert!(alerter.notify(Severity::Critical, "test").await.is_ok());
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
