//! Per-host minimum-interval throttling.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Last request time for a single host.
#[derive(Debug, Default)]
struct HostTracker {
    last_request: Option<Instant>,
    min_interval: Option<Duration>,
}

/// Rate limiter enforcing a minimum interval between requests to the same host.
///
/// Trackers are created on a host's first request and live until `reset`.
/// Each host has its own lock, so waiting on one host never delays another.
#[derive(Debug)]
pub struct HostRateLimiter {
    hosts: Mutex<HashMap<String, Arc<Mutex<HostTracker>>>>,
    default_interval: Duration,
}

impl HostRateLimiter {
    pub fn new(default_interval: Duration) -> Self {
        Self { hosts: Mutex::new(HashMap::new()), default_interval }
    }

    async fn tracker(&self, host: &str) -> Arc<Mutex<HostTracker>> {
        let mut hosts = self.hosts.lock().await;
        hosts.entry(host.to_string()).or_default().clone()
    }

    /// Override the minimum interval for one host.
    pub async fn set_interval(&self, host: &str, interval: Duration) {
        let tracker = self.tracker(host).await;
        tracker.lock().await.min_interval = Some(interval);
    }

    /// Acquire permission to make a request to `host`, waiting if necessary.
    ///
    /// Returns how long the caller was suspended.
    pub async fn acquire(&self, host: &str) -> Duration {
        let tracker = self.tracker(host).await;
        let mut tracker = tracker.lock().await;
        let min_interval = tracker.min_interval.unwrap_or(self.default_interval);

        let mut waited = Duration::ZERO;
        if let Some(last) = tracker.last_request {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                waited = min_interval - elapsed;
                tracing::debug!("rate limiting {} for {:?}", host, waited);
                tokio::time::sleep(waited).await;
            }
        }

        tracker.last_request = Some(Instant::now());
        waited
    }

    /// Number of hosts with a tracker.
    pub async fn tracked_hosts(&self) -> usize {
        self.hosts.lock().await.len()
    }

    /// Forget every tracker.
    pub async fn reset(&self) {
        self.hosts.lock().await.clear();
    }
}
