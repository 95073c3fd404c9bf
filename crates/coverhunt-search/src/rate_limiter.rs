// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::trace;

/// Enforces a minimum delay between consecutive requests.
///
/// Callers queue on the internal lock, so concurrent requests are released
/// one at a time, each at least `min_interval` after the previous one.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_instant) = *last {
            let elapsed = last_instant.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                trace!(target: "transport", "rate limiting: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Rate limiters keyed by host name. Hosts without an entry are not limited.
#[derive(Debug, Clone, Default)]
pub struct HostRateLimits {
    limiters: HashMap<String, RateLimiter>,
}

impl HostRateLimits {
    pub fn insert(&mut self, host: impl Into<String>, min_interval: Duration) {
        self.limiters
            .insert(host.into().to_ascii_lowercase(), RateLimiter::new(min_interval));
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }

    /// Wait on the limiter for `url`'s host, if one is registered.
    pub async fn acquire_for(&self, url: &str) {
        let Some(host) = url::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        else {
            return;
        };

        if let Some(limiter) = self.limiters.get(&host) {
            limiter.acquire().await;
        }
    }
}
