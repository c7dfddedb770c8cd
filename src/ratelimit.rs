//! Proactive, header-driven rate limiting.
//!
//! Discord describes every route's budget in `X-RateLimit-*` response
//! headers. The limiter keeps one bucket per route key, claims a unit of
//! budget before each request goes out and sleeps through the rest of the
//! window once the budget is gone, so a well-behaved caller never triggers
//! a 429 in the first place. All state lives inside the limiter instance
//! owned by its `Client`; nothing here is process-global.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Rate limit description parsed out of one response's headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitHeaders {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    /// Seconds until the current window resets. Fractional.
    pub reset_after: Option<Duration>,
    /// Discord's opaque bucket hash, kept for log correlation.
    pub bucket: Option<String>,
    /// Only present on 429 responses.
    pub retry_after: Option<Duration>,
    /// Whether a 429 applies account-wide instead of to one route.
    pub global: bool,
}

impl RateLimitHeaders {
    pub fn parse(headers: &HeaderMap) -> Self {
        Self {
            limit: header_u32(headers, "x-ratelimit-limit"),
            remaining: header_u32(headers, "x-ratelimit-remaining"),
            reset_after: header_seconds(headers, "x-ratelimit-reset-after"),
            bucket: header_str(headers, "x-ratelimit-bucket").map(str::to_string),
            retry_after: header_seconds(headers, "retry-after"),
            global: header_str(headers, "x-ratelimit-global")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Whether the window these headers describe has no budget left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0) || self.retry_after.is_some()
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}

fn header_u32(headers: &HeaderMap, name: &str) -> Option<u32> {
    header_str(headers, name)?.parse().ok()
}

fn header_seconds(headers: &HeaderMap, name: &str) -> Option<Duration> {
    let seconds: f64 = header_str(headers, name)?.parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

/// Budget state for one route bucket.
#[derive(Debug, Clone, Default)]
struct Bucket {
    limit: Option<u32>,
    remaining: Option<u32>,
    reset_at: Option<Instant>,
    hash: Option<String>,
}

/// A claimed unit of budget for one request.
///
/// When the request is headed into a window whose budget is unknown (the
/// route was never called, or its window just rolled over), the bucket
/// lock rides along inside the claim and is only dropped once the response
/// headers have been folded back in via [`RateLimiter::release`]. Callers
/// queued behind it wait for that answer instead of racing blind into the
/// new window.
#[derive(Debug)]
pub struct Claim {
    guard: Option<OwnedMutexGuard<Bucket>>,
}

/// One limiter per `Client`.
///
/// Buckets are keyed by `METHOD:path` with major ids (the guild id)
/// baked in, which matches how Discord scopes its budgets for the routes
/// this crate calls.
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Arc<Mutex<Bucket>>>>,
    global_until: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    async fn bucket(&self, key: &str) -> Arc<Mutex<Bucket>> {
        let mut buckets = self.buckets.lock().await;
        buckets.entry(key.to_string()).or_default().clone()
    }

    async fn wait_global(&self, key: &str) {
        loop {
            let until = *self.global_until.lock().await;
            match until {
                Some(when) if when > Instant::now() => {
                    warn!(route = key, "waiting out a global rate limit");
                    tokio::time::sleep_until(when).await;
                }
                _ => break,
            }
        }
    }

    /// Blocks until the route may send one request, then claims that unit
    /// of budget. Sleeping while the bucket lock is held is what lines up
    /// concurrent callers of the same route one behind another.
    pub async fn acquire(&self, key: &str) -> Claim {
        let mut guard = self.bucket(key).await.lock_owned().await;
        self.wait_global(key).await;

        let mut blind = guard.remaining.is_none();
        if guard.remaining == Some(0) {
            if let Some(reset_at) = guard.reset_at {
                let now = Instant::now();
                if reset_at > now {
                    debug!(
                        route = key,
                        wait_ms = (reset_at - now).as_millis() as u64,
                        "bucket exhausted, delaying until reset"
                    );
                    tokio::time::sleep_until(reset_at).await;
                }
            }
            // The window rolled over, but where the new one ends is only
            // learnable from the next response.
            guard.remaining = guard.limit;
            guard.reset_at = None;
            blind = true;
        }

        if let Some(remaining) = guard.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }

        Claim {
            guard: blind.then_some(guard),
        }
    }

    /// Folds one response's headers back into the bucket and releases the
    /// claim. Local claims are kept when they are stricter than what the
    /// server reported, so requests still in flight cannot resurrect
    /// budget that was already spent on their behalf.
    pub async fn release(&self, key: &str, claim: Claim, headers: &RateLimitHeaders) {
        if headers.global {
            if let Some(retry_after) = headers.retry_after {
                self.extend_global(key, retry_after).await;
                return;
            }
        }

        let mut state = match claim.guard {
            Some(guard) => guard,
            None => self.bucket(key).await.lock_owned().await,
        };

        if let Some(limit) = headers.limit {
            state.limit = Some(limit);
        }
        if let Some(hash) = &headers.bucket {
            if state.hash.as_deref() != Some(hash.as_str()) {
                debug!(route = key, bucket = %hash, "bucket hash learned");
                state.hash = Some(hash.clone());
            }
        }
        match (state.remaining, headers.remaining) {
            (Some(local), Some(server)) => state.remaining = Some(local.min(server)),
            (None, Some(server)) => state.remaining = Some(server),
            _ => {}
        }
        if let Some(reset_after) = headers.reset_after {
            state.reset_at = Some(Instant::now() + reset_after);
        }
        if let Some(retry_after) = headers.retry_after {
            // An actual 429 on this route: freeze it for the penalty window.
            state.remaining = Some(0);
            state.reset_at = Some(Instant::now() + retry_after);
        }
    }

    /// Freezes a route, or the whole account, after a 429 whose penalty
    /// was reported in the response body rather than the headers.
    pub async fn penalize(&self, key: &str, retry_after: Duration, global: bool) {
        if global {
            self.extend_global(key, retry_after).await;
            return;
        }
        let mut state = self.bucket(key).await.lock_owned().await;
        state.remaining = Some(0);
        state.reset_at = Some(Instant::now() + retry_after);
    }

    async fn extend_global(&self, key: &str, retry_after: Duration) {
        let until = Instant::now() + retry_after;
        let mut global = self.global_until.lock().await;
        if global.map_or(true, |current| until > current) {
            *global = Some(until);
        }
        warn!(
            route = key,
            wait_ms = retry_after.as_millis() as u64,
            "global rate limit reported"
        );
    }
}
