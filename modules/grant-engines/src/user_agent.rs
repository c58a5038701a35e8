use std::sync::atomic::{AtomicUsize, Ordering};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Round-robins a fixed user-agent pool across requests, same rotation
/// strategy the headless fetcher uses for its own requests.
pub struct UserAgentPool {
    counter: AtomicUsize,
}

impl UserAgentPool {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }

    pub fn next(&self) -> &'static str {
        let idx = self.counter.fetch_add(1, Ordering::Relaxed) % USER_AGENTS.len();
        USER_AGENTS[idx]
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_through_every_agent_before_repeating() {
        let pool = UserAgentPool::new();
        let first_round: Vec<_> = (0..USER_AGENTS.len()).map(|_| pool.next()).collect();
        let second_round: Vec<_> = (0..USER_AGENTS.len()).map(|_| pool.next()).collect();
        assert_eq!(first_round, second_round);
        assert_eq!(first_round.len(), USER_AGENTS.len());
    }
}
