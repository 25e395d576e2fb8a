use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

use crate::config::RateLimitConfig;

/// Spaces outbound requests evenly: `requests` permits per `window`, one every
/// `window / requests`. A burst never gets more than one permit up front, so the
/// (N+1)th caller of a burst waits a full window.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(requests: u32, window: Duration) -> Self {
        let interval = window / requests.max(1);

        tracing::debug!(
            "Rate limiter initialized: {} requests per {:?} ({:?} apart)",
            requests,
            window,
            interval
        );

        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests, Duration::from_secs(config.window_secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until another request may be sent.
    pub async fn acquire(&self) {
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(next) if next > now => next,
                _ => now,
            };
            *next_slot = Some(slot + self.interval);
            slot
        };

        if slot > Instant::now() {
            metrics::counter!("watcher_rate_limit_waits_total").increment(1);
            sleep_until(slot).await;
        }
    }
}
