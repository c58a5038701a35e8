use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use grant_common::types::RateLimit;

/// Enforces a source's `requests_per_minute` and `min_delay_ms` by making
/// every caller wait out whichever constraint is currently binding. One
/// instance per in-flight source fetch; cheap enough to build per call.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(rate_limit: &RateLimit) -> Self {
        let per_minute_interval = if rate_limit.requests_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(60.0 / rate_limit.requests_per_minute as f64)
        };
        let min_interval = per_minute_interval.max(Duration::from_millis(rate_limit.min_delay_ms));
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Block until it is safe to issue the next request, then record that
    /// this call "used" a slot.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_acquire_waits_the_minimum_interval() {
        let limiter = RateLimiter::new(&RateLimit {
            requests_per_minute: 60,
            min_delay_ms: 0,
            respect_robots: true,
        });
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn min_delay_wins_over_a_looser_rate(){
        let limiter = RateLimiter::new(&RateLimit {
            requests_per_minute: 6000,
            min_delay_ms: 2000,
            respect_robots: true,
        });
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }
}
