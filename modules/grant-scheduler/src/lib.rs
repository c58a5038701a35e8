mod backoff;

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use grant_common::ports::Clock;
use grant_common::types::{Frequency, Job, JobStatus};

pub use backoff::retry_delay_ms;

const DEFAULT_RETRY_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub max_concurrent_jobs: usize,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub stuck_job_timeout_sec: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 5,
            retry_attempts: 3,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 300_000,
            stuck_job_timeout_sec: 1_800,
        }
    }
}

#[derive(Default)]
struct Lanes {
    pending: Vec<Job>,
    running: Vec<Job>,
    completed: Vec<Job>,
    failed: Vec<Job>,
    cancelled: Vec<Job>,
}

/// In-process job scheduler maintaining the four lanes from spec §4.8.
/// Durable persistence of individual jobs is the caller's responsibility
/// (typically via `GrantStore::save_job` after each transition).
pub struct Scheduler<C: Clock> {
    clock: C,
    config: SchedulerConfig,
    lanes: Mutex<Lanes>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C, config: SchedulerConfig) -> Self {
        Self {
            clock,
            config,
            lanes: Mutex::new(Lanes::default()),
        }
    }

    /// Creates and enqueues a job, optionally delayed.
    pub fn schedule(&self, source_id: Uuid, priority: u8, delay: Option<chrono::Duration>) -> Job {
        let scheduled_at = self.clock.now() + delay.unwrap_or_else(chrono::Duration::zero);
        let job = Job::new(source_id, priority, scheduled_at);
        self.lanes.lock().expect("scheduler lock poisoned").pending.push(job.clone());
        job
    }

    /// Schedules a job at `frequency`'s interval from now. Callers invoke
    /// this again on completion to keep the recurrence going.
    pub fn schedule_recurring(&self, source_id: Uuid, frequency: Frequency, priority: u8) -> Job {
        self.schedule(source_id, priority, Some(frequency.interval()))
    }

    /// Highest-priority ready pending job (ties broken by earlier
    /// `scheduled_at`), atomically moved to running. `None` if running is
    /// at capacity or nothing is ready yet.
    pub fn next_ready_job(&self) -> Option<Job> {
        let mut lanes = self.lanes.lock().expect("scheduler lock poisoned");
        if lanes.running.len() >= self.config.max_concurrent_jobs {
            return None;
        }
        let now = self.clock.now();
        let best_index = lanes
            .pending
            .iter()
            .enumerate()
            .filter(|(_, job)| job.scheduled_at <= now)
            .max_by(|(_, a), (_, b)| a.priority.cmp(&b.priority).then_with(|| b.scheduled_at.cmp(&a.scheduled_at)))
            .map(|(i, _)| i)?;

        let mut job = lanes.pending.remove(best_index);
        job.status = JobStatus::Running;
        job.started_at = Some(now);
        lanes.running.push(job.clone());
        Some(job)
    }

    /// Applies a status transition (spec §4.8's state machine).
    pub fn update_status(&self, job_id: Uuid, new_status: JobStatus, error: Option<String>) {
        let mut lanes = self.lanes.lock().expect("scheduler lock poisoned");
        let Some(pos) = lanes.running.iter().position(|j| j.id == job_id) else {
            return;
        };
        let mut job = lanes.running.remove(pos);
        let now = self.clock.now();

        match new_status {
            JobStatus::Completed => {
                job.status = JobStatus::Completed;
                job.finished_at = Some(now);
                lanes.completed.push(job);
            }
            JobStatus::Failed => {
                job.metadata.attempts += 1;
                job.metadata.last_error = error;
                if job.metadata.attempts < self.config.retry_attempts {
                    let delay_ms = retry_delay_ms(
                        job.metadata.attempts,
                        self.config.retry_base_delay_ms,
                        DEFAULT_RETRY_MULTIPLIER,
                        self.config.retry_max_delay_ms,
                    );
                    job.metadata.retry_delay_ms = Some(delay_ms);
                    job.status = JobStatus::Pending;
                    job.started_at = None;
                    job.scheduled_at = now + chrono::Duration::milliseconds(delay_ms as i64);
                    lanes.pending.push(job);
                } else {
                    job.status = JobStatus::Failed;
                    job.finished_at = Some(now);
                    lanes.failed.push(job);
                }
            }
            JobStatus::Cancelled => {
                job.status = JobStatus::Cancelled;
                job.finished_at = Some(now);
                job.metadata.cancel_requested = true;
                lanes.cancelled.push(job);
            }
            JobStatus::Pending | JobStatus::Running => {
                job.status = new_status;
                lanes.running.push(job);
            }
        }
    }

    /// Flags a pending or running job's `cancel_requested`; running jobs
    /// honor it at their next suspension point rather than being killed.
    pub fn request_cancel(&self, job_id: Uuid) -> bool {
        let mut lanes = self.lanes.lock().expect("scheduler lock poisoned");
        for job in lanes.running.iter_mut().chain(lanes.pending.iter_mut()) {
            if job.id == job_id {
                job.metadata.cancel_requested = true;
                return true;
            }
        }
        false
    }

    /// Marks running jobs stuck past `stuck_job_timeout_sec` as failed.
    /// Returns the ids that were flagged.
    pub fn health_check(&self) -> Vec<Uuid> {
        let now = self.clock.now();
        let stuck_ids: Vec<Uuid> = {
            let lanes = self.lanes.lock().expect("scheduler lock poisoned");
            lanes
                .running
                .iter()
                .filter(|job| {
                    job.started_at
                        .map(|start| (now - start).num_seconds() as u64 > self.config.stuck_job_timeout_sec)
                        .unwrap_or(false)
                })
                .map(|job| job.id)
                .collect()
        };
        for id in &stuck_ids {
            self.update_status(*id, JobStatus::Failed, Some("stuck".to_string()));
        }
        stuck_ids
    }

    /// Drops completed/failed/cancelled jobs whose terminal timestamp is
    /// older than `max_age`.
    pub fn cleanup_old_jobs(&self, max_age: chrono::Duration) -> usize {
        let now = self.clock.now();
        let mut lanes = self.lanes.lock().expect("scheduler lock poisoned");
        let before = lanes.completed.len() + lanes.failed.len() + lanes.cancelled.len();
        let is_fresh = |job: &Job| job.finished_at.map(|f| now - f < max_age).unwrap_or(true);
        lanes.completed.retain(is_fresh);
        lanes.failed.retain(is_fresh);
        lanes.cancelled.retain(is_fresh);
        let after = lanes.completed.len() + lanes.failed.len() + lanes.cancelled.len();
        before - after
    }

    pub fn pending_count(&self) -> usize {
        self.lanes.lock().expect("scheduler lock poisoned").pending.len()
    }

    pub fn running_count(&self) -> usize {
        self.lanes.lock().expect("scheduler lock poisoned").running.len()
    }

    pub fn completed_jobs(&self) -> Vec<Job> {
        self.lanes.lock().expect("scheduler lock poisoned").completed.clone()
    }

    pub fn failed_jobs(&self) -> Vec<Job> {
        self.lanes.lock().expect("scheduler lock poisoned").failed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grant_common::ports::fakes::FakeClock;

    fn scheduler(config: SchedulerConfig) -> Scheduler<FakeClock> {
        Scheduler::new(FakeClock::new(Utc::now()), config)
    }

    #[test]
    fn next_ready_job_respects_priority_then_fifo() {
        let sched = scheduler(SchedulerConfig::default());
        let source = Uuid::new_v4();
        let low = sched.schedule(source, 2, None);
        let high = sched.schedule(source, 8, None);
        let next = sched.next_ready_job().unwrap();
        assert_eq!(next.id, high.id);
        let next = sched.next_ready_job().unwrap();
        assert_eq!(next.id, low.id);
    }

    #[test]
    fn next_ready_job_returns_none_when_running_at_capacity() {
        let mut config = SchedulerConfig::default();
        config.max_concurrent_jobs = 1;
        let sched = scheduler(config);
        let source = Uuid::new_v4();
        sched.schedule(source, 5, None);
        sched.schedule(source, 5, None);
        assert!(sched.next_ready_job().is_some());
        assert!(sched.next_ready_job().is_none());
    }

    #[test]
    fn failed_job_retries_with_backoff_until_attempts_exhausted() {
        let mut config = SchedulerConfig::default();
        config.retry_attempts = 2;
        let sched = scheduler(config);
        let source = Uuid::new_v4();
        let job = sched.schedule(source, 5, None);
        let running = sched.next_ready_job().unwrap();
        assert_eq!(running.id, job.id);

        sched.update_status(job.id, JobStatus::Failed, Some("boom".to_string()));
        assert_eq!(sched.pending_count(), 1);
        assert_eq!(sched.failed_jobs().len(), 0);

        let retried = sched.next_ready_job();
        assert!(retried.is_none(), "retry is delayed, not immediately ready");
    }

    #[test]
    fn final_failure_after_exhausting_retries_lands_in_failed_lane() {
        let mut config = SchedulerConfig::default();
        config.retry_attempts = 1;
        let sched = scheduler(config);
        let source = Uuid::new_v4();
        let job = sched.schedule(source, 5, None);
        sched.next_ready_job().unwrap();
        sched.update_status(job.id, JobStatus::Failed, Some("boom".to_string()));
        assert_eq!(sched.failed_jobs().len(), 1);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn completed_job_moves_to_completed_lane() {
        let sched = scheduler(SchedulerConfig::default());
        let source = Uuid::new_v4();
        let job = sched.schedule(source, 5, None);
        sched.next_ready_job().unwrap();
        sched.update_status(job.id, JobStatus::Completed, None);
        assert_eq!(sched.completed_jobs().len(), 1);
        assert_eq!(sched.running_count(), 0);
    }

    #[test]
    fn stuck_running_job_is_flagged_by_health_check() {
        let mut config = SchedulerConfig::default();
        config.stuck_job_timeout_sec = 10;
        let clock = FakeClock::new(Utc::now());
        let sched = Scheduler::new(clock, config);
        let source = Uuid::new_v4();
        let job = sched.schedule(source, 5, None);
        sched.next_ready_job().unwrap();

        let stuck = sched.health_check();
        assert!(stuck.is_empty());

        sched.clock.advance(chrono::Duration::seconds(11));
        let stuck = sched.health_check();
        assert_eq!(stuck, vec![job.id]);
    }

    #[test]
    fn cleanup_drops_old_terminal_jobs() {
        let sched = scheduler(SchedulerConfig::default());
        let source = Uuid::new_v4();
        let job = sched.schedule(source, 5, None);
        sched.next_ready_job().unwrap();
        sched.update_status(job.id, JobStatus::Completed, None);

        sched.clock.advance(chrono::Duration::days(2));
        let dropped = sched.cleanup_old_jobs(chrono::Duration::days(1));
        assert_eq!(dropped, 1);
        assert_eq!(sched.completed_jobs().len(), 0);
    }
}
