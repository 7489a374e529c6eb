//! Inter-call delays and retry backoff.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::config::{PacingConfig, RetryConfig};

/// Something that can wait. Tests substitute a recorder so nothing sleeps.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Delay schedule for one session.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    pacing: PacingConfig,
    retry: RetryConfig,
}

impl PacingPolicy {
    pub fn new(pacing: PacingConfig, retry: RetryConfig) -> Self {
        Self { pacing, retry }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry.max_attempts.max(1)
    }

    /// Delay between trajectory batches.
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.pacing.batch_delay_ms)
    }

    /// Random delay between segment and checkpoint uploads.
    pub fn organic_delay(&self, rng: &mut impl Rng) -> Duration {
        let (min, max) = self.pacing.step_delay_ms;
        let ms = if max > min {
            rng.gen_range(min..=max)
        } else {
            min
        };
        Duration::from_millis(ms)
    }

    /// Wait after failed attempt `attempt` (0-based): `base * 2^attempt`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = self
            .retry
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.retry.max_delay_ms);
        Duration::from_millis(ms)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::new(PacingConfig::default(), RetryConfig::default())
    }
}
