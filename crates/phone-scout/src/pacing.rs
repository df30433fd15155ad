//! Politeness delay between consecutive requests to one source.
//!
//! The collector owns the schedule and calls `pause` before every request
//! after the first; tests substitute `NoDelay`.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// A pacing policy invoked between requests.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait before the next request. Returns the delay actually applied.
    async fn pause(&self) -> Duration;
}

/// Sleeps for a uniformly random duration in `[min, max]`.
#[derive(Debug, Clone)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    /// Create a pacing window. An inverted window is normalized.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Draw one delay from the window.
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

#[async_trait]
impl Pacer for RandomDelay {
    async fn pause(&self) -> Duration {
        let delay = self.sample();
        tracing::debug!("Delaying {:.1}s", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
        delay
    }
}

/// Zero-delay policy for tests and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) -> Duration {
        Duration::ZERO
    }
}
