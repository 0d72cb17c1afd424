use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Outbound call budget for batched quote loops (watchlist, portfolio,
/// indices, movers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Calls in flight at once. `1` means strictly sequential.
    pub max_concurrency: usize,
    pub quota_window: Duration,
    /// Calls allowed per `quota_window`; `None` disables rate limiting.
    pub quota_limit: Option<u32>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            quota_window: Duration::from_secs(60),
            quota_limit: None,
        }
    }
}

impl FetchPolicy {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_quota(mut self, quota_window: Duration, quota_limit: u32) -> Self {
        self.quota_window = quota_window;
        self.quota_limit = Some(quota_limit);
        self
    }
}

/// Runs a batch of provider calls under a [`FetchPolicy`].
#[derive(Clone)]
pub struct BatchLimiter {
    policy: FetchPolicy,
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl std::fmt::Debug for BatchLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLimiter")
            .field("policy", &self.policy)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

impl BatchLimiter {
    pub fn new(policy: FetchPolicy) -> Self {
        let limiter = policy
            .quota_limit
            .map(|limit| Arc::new(RateLimiter::direct(quota_from_window(policy.quota_window, limit))));
        Self { policy, limiter }
    }

    pub const fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Calls `call` once per item and returns results in input order.
    ///
    /// A call is only started once the rate limiter grants a cell, and at most
    /// `max_concurrency` calls are in flight.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, call: F) -> Vec<R>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let call = &call;
        stream::iter(items)
            .map(|item| {
                let limiter = self.limiter.clone();
                async move {
                    if let Some(limiter) = limiter {
                        limiter.until_ready().await;
                    }
                    call(item).await
                }
            })
            .buffered(self.policy.max_concurrency.max(1))
            .collect()
            .await
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let burst = NonZeroU32::new(quota_limit).unwrap_or(NonZeroU32::MIN);
    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(burst.get())).max(0.001);

    Quota::with_period(Duration::from_secs_f64(seconds_per_cell))
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn sequential_policy_never_overlaps_calls() {
        let limiter = BatchLimiter::new(FetchPolicy::sequential());
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let results = limiter
            .run(vec![1, 2, 3, 4], |value| {
                let in_flight = &in_flight;
                let peak = &peak;
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    value * 10
                }
            })
            .await;

        assert_eq!(results, vec![10, 20, 30, 40]);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_policy_keeps_input_order() {
        let limiter = BatchLimiter::new(FetchPolicy::default().with_max_concurrency(3));
        let results = limiter
            .run(vec![30_u64, 10, 20], |delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay
            })
            .await;

        assert_eq!(results, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn quota_allows_an_initial_burst() {
        let limiter =
            BatchLimiter::new(FetchPolicy::default().with_quota(Duration::from_secs(60), 5));
        let results = limiter.run(vec![1, 2, 3], |value| async move { value }).await;
        assert_eq!(results, vec![1, 2, 3]);
        assert!(limiter.policy().quota_limit.is_some());
    }
}
