//! Rate limiting and retry with backoff
//!
//! The [`RateLimiter`] is one shared pacing clock for the whole crawl run:
//! it serializes request *dispatch* across all workers, which is what caps
//! the outbound request rate regardless of worker count. Response
//! processing still overlaps freely.
//!
//! The retry loop is a plain counter-and-delay loop so that deadline and
//! cancellation behavior stay easy to reason about.

use crate::fetch::FetchError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Backoff growth factor between consecutive retry delays
const BACKOFF_MULTIPLIER: f64 = 2.5;

/// Upper bound on any single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(15);

/// Retry schedule for failed fetches
///
/// Delays follow `min(base * multiplier^attempt, cap)`: with the default
/// 2s base that is 2s, 5s, 12.5s, then 15s capped. The exact constants are
/// not load-bearing; what matters is that delays never decrease and never
/// exceed the cap.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retry attempts after the first failure
    pub max_retries: u32,

    /// Delay before the first retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given retry count and first delay
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Computes the backoff delay after a given failed attempt (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let millis =
            self.base_delay.as_millis() as f64 * BACKOFF_MULTIPLIER.powi(attempt as i32);
        Duration::from_millis(millis as u64).min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(2))
    }
}

/// Shared minimum-interval gate for request dispatch
///
/// All workers in a crawl run wait on the same limiter, so two requests are
/// never dispatched closer together than the configured interval. That is the
/// politeness contract, not just a concurrency knob. A robots.txt
/// crawl-delay larger than the configured interval widens the gap for that
/// request.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum inter-request interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Waits until this caller may dispatch the next request
    ///
    /// Reserves the next dispatch slot under the lock, then sleeps outside
    /// it so other workers can queue up behind later slots meanwhile.
    ///
    /// # Arguments
    ///
    /// * `site_delay` - Crawl-delay requested by the target site, if any;
    ///   the effective interval is the larger of it and the configured one
    pub async fn wait_turn(&self, site_delay: Option<Duration>) {
        let interval = site_delay.unwrap_or(Duration::ZERO).max(self.min_interval);

        let wake = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let wake = match *next_slot {
                Some(slot) => slot.max(now),
                None => now,
            };
            *next_slot = Some(wake + interval);
            wake
        };

        tokio::time::sleep_until(wake).await;
    }
}

/// Runs a fetch operation under the rate limiter with bounded retries
///
/// Every attempt, the first included, waits its turn on the shared
/// limiter. A failure sleeps out the backoff delay and tries again, up to
/// `policy.max_retries` retries; when those are exhausted the *last* error
/// surfaces to the caller as the terminal outcome. Callers treat that as a
/// skip, never as a crawl-fatal condition.
///
/// # Arguments
///
/// * `limiter` - The run-wide pacing gate
/// * `policy` - The retry schedule
/// * `site_delay` - Optional robots.txt crawl-delay for this request
/// * `op` - The one-shot fetch operation, called once per attempt
pub async fn fetch_with_retry<T, F, Fut>(
    limiter: &RateLimiter,
    policy: &RetryPolicy,
    site_delay: Option<Duration>,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;

    loop {
        limiter.wait_turn(site_delay).await;

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    "Fetch attempt {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
