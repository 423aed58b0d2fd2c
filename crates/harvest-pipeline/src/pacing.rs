//! Randomized delays between item requests.

use harvest_core::PacingConfig;
use rand::Rng;
use std::time::Duration;

/// Per-request jitter plus a longer pause every `extended_every` requests.
#[derive(Debug, Clone)]
pub struct Pacer {
    base_ms: (u64, u64),
    extended_ms: (u64, u64),
    extended_every: usize,
}

impl Pacer {
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            base_ms: (config.base_min_ms, config.base_max_ms),
            extended_ms: (config.extended_min_ms, config.extended_max_ms),
            extended_every: config.extended_every.max(1),
        }
    }

    /// Total delay to take after the `completed`-th request (1-based).
    pub fn delay_after<R: Rng + ?Sized>(&self, completed: usize, rng: &mut R) -> Duration {
        let mut ms = sample(rng, self.base_ms);
        if self.is_extended(completed) {
            ms = ms.saturating_add(sample(rng, self.extended_ms));
        }
        Duration::from_millis(ms)
    }

    pub fn is_extended(&self, completed: usize) -> bool {
        completed > 0 && completed % self.extended_every == 0
    }

    /// Sleep after the `completed`-th request.
    pub async fn pause(&self, completed: usize) {
        let delay = self.delay_after(completed, &mut rand::thread_rng());
        if self.is_extended(completed) {
            tracing::debug!("Extended pause of {:?} after {} requests", delay, completed);
        }
        tokio::time::sleep(delay).await;
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (min, max): (u64, u64)) -> u64 {
    if min >= max {
        min
    } else {
        rng.gen_range(min..max)
    }
}
