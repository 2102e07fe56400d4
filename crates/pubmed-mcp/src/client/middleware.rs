//! Request rate limiting.
//!
//! NCBI allows 3 requests/second without a key and 10 with one. The limiter
//! spaces the *starts* of outbound requests by a fixed minimum interval. It
//! sits in the middleware chain behind the retry layer, so retried attempts
//! are throttled like first attempts.

use std::sync::Arc;
use std::time::Duration;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum-interval limiter shared by every request a client makes.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    /// Earliest instant the next request may start.
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Limiter with a fixed gap between request starts. A zero gap disables it.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// The enforced gap between request starts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until a request may start, then reserve the following slot.
    ///
    /// The lock is held across the wait so concurrent callers queue up
    /// behind each other instead of all waking at the same slot.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut next_slot = self.next_slot.lock().await;
        if let Some(slot) = *next_slot {
            let now = Instant::now();
            if slot > now {
                tracing::trace!(wait_ms = (slot - now).as_millis(), "Waiting for rate limit slot");
                tokio::time::sleep_until(slot).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

/// `reqwest-middleware` adapter around a shared [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<RateLimiter>,
}

impl RateLimitMiddleware {
    /// Wrap a shared limiter.
    #[must_use]
    pub const fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Middleware for RateLimitMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        self.limiter.acquire().await;
        next.run(req, extensions).await
    }
}
