use std::time::Duration;

/// Exponential delay between failed attempts at a chunk
///
/// The delay for attempt `n` (zero-based) is `base * 2^n`, capped at `max`.
/// A rate-limited failure counts as one attempt further along, so throttling
/// is answered with a longer pause than a dropped connection.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use transferscan::BackoffPolicy;
///
/// let policy = BackoffPolicy::new(Duration::from_secs(2), Duration::from_secs(60));
/// assert_eq!(policy.delay_for(0, false), Duration::from_secs(2));
/// assert_eq!(policy.delay_for(0, true), Duration::from_secs(4));
/// assert_eq!(policy.delay_for(10, false), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    max: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn delay_for(&self, attempt: u32, rate_limited: bool) -> Duration {
        let exponent = attempt.saturating_add(u32::from(rate_limited));
        2u32.checked_pow(exponent)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.max, |delay| delay.min(self.max))
    }
}
