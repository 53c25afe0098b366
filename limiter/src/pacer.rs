use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Spaces out consecutive upstream calls of one batch.
///
/// Keeps a bulk submission under the provider's own rate limit. The first
/// call goes out immediately, every following one waits for the interval.
pub struct Pacer {
    limiter: Option<DefaultDirectRateLimiter>,
}

impl Pacer {
    /// A zero interval disables pacing.
    pub fn new(interval: Duration) -> Self {
        Self {
            limiter: Quota::with_period(interval).map(RateLimiter::direct),
        }
    }

    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn spaces_calls_by_the_interval() {
        let pacer = Pacer::new(Duration::from_millis(40));
        let started = Instant::now();

        for _ in 0..3 {
            pacer.wait().await;
        }

        // first call is free, the next two wait one interval each
        assert!(started.elapsed() >= Duration::from_millis(75));
    }

    #[tokio::test]
    async fn zero_interval_never_waits() {
        let pacer = Pacer::new(Duration::ZERO);
        let started = Instant::now();

        for _ in 0..100 {
            pacer.wait().await;
        }

        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
