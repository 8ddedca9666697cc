//! Exponential backoff for failed sync passes.

use std::time::Duration;

/// Delay sequence seeded at a base interval and doubled per consecutive
/// failure, capped at a maximum.
///
/// Retry state is plain data - the coordinator exposes it through its status
/// report, and tests can step through the sequence without waiting.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    max: Duration,
    consecutive_failures: u32,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            consecutive_failures: 0,
        }
    }

    /// Delay for the next retry, recording one more failure.
    pub fn next_delay(&mut self) -> Duration {
        let exponent = self.consecutive_failures.min(31);
        let delay = self
            .base
            .checked_mul(2u32.saturating_pow(exponent))
            .unwrap_or(self.max)
            .min(self.max);
        self.consecutive_failures += 1;
        delay
    }

    /// Clear the failure streak after a successful pass.
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_until_capped() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(5), Duration::from_secs(300));

        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(10));
        assert_eq!(backoff.next_delay(), Duration::from_secs(20));
        assert_eq!(backoff.next_delay(), Duration::from_secs(40));
        assert_eq!(backoff.next_delay(), Duration::from_secs(80));
        assert_eq!(backoff.next_delay(), Duration::from_secs(160));
        // Capped from here on.
        assert_eq!(backoff.next_delay(), Duration::from_secs(300));
        assert_eq!(backoff.next_delay(), Duration::from_secs(300));
        assert_eq!(backoff.consecutive_failures(), 8);
    }

    #[test]
    fn test_reset_returns_to_base() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(5), Duration::from_secs(300));

        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();

        assert_eq!(backoff.consecutive_failures(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_extreme_failure_counts_do_not_overflow() {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(5), Duration::from_secs(300));

        for _ in 0..100 {
            assert!(backoff.next_delay() <= Duration::from_secs(300));
        }
    }
}
