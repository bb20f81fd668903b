use std::time::Duration;

use fanin_config::shared::DelayConfig;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of per-item simulated processing delays.
///
/// The pipeline only requires the generated delays to be bounded; the actual
/// distribution is an external concern. Tests plug a fixed generator to keep
/// runs deterministic and fast.
pub trait DelayGenerator: Send + 'static {
    /// Returns the delay to apply before completing the next item.
    fn next_delay(&mut self) -> Duration;
}

/// Draws delays uniformly from a bounded millisecond range.
///
/// Each worker owns its own instance seeded from entropy, so there is no shared
/// RNG state to contend on across workers.
#[derive(Debug)]
pub struct BoundedRandomDelay {
    min_ms: u64,
    max_ms: u64,
    rng: SmallRng,
}

impl BoundedRandomDelay {
    /// Creates a generator drawing from `min_ms..=max_ms`.
    ///
    /// Callers are expected to pass a validated range (`min_ms <= max_ms`).
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms,
            max_ms,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Creates a generator from the validated delay configuration.
    pub fn from_config(config: &DelayConfig) -> Self {
        Self::new(config.min_ms, config.max_ms)
    }
}

impl DelayGenerator for BoundedRandomDelay {
    fn next_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(self.min_ms..=self.max_ms))
    }
}

/// Generator that always returns the same delay. Useful in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(Duration);

impl FixedDelay {
    /// Creates a generator that always returns `delay`.
    pub fn new(delay: Duration) -> Self {
        Self(delay)
    }

    /// Creates a generator that never delays.
    pub fn zero() -> Self {
        Self(Duration::ZERO)
    }
}

impl DelayGenerator for FixedDelay {
    fn next_delay(&mut self) -> Duration {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_delays_stay_within_the_configured_bounds() {
        let mut generator = BoundedRandomDelay::new(150, 450);

        for _ in 0..1000 {
            let delay = generator.next_delay();
            assert!(delay >= Duration::from_millis(150));
            assert!(delay <= Duration::from_millis(450));
        }
    }

    #[test]
    fn degenerate_range_is_allowed() {
        let mut generator = BoundedRandomDelay::new(0, 0);
        assert_eq!(generator.next_delay(), Duration::ZERO);
    }
}
