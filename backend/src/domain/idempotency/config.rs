//! Expiry and capacity policy for the idempotency cache.

use std::time::Duration;

/// Configuration for the process-local idempotency cache.
///
/// Entries older than the TTL are evicted; the capacity bounds memory use
/// under key churn.
///
/// # Example
///
/// ```
/// # use staffing::domain::idempotency::IdempotencyConfig;
/// # use std::time::Duration;
/// let config = IdempotencyConfig::default();
/// assert_eq!(config.ttl(), Duration::from_secs(24 * 3600));
///
/// let clamped = IdempotencyConfig::new(Duration::ZERO, 0);
/// assert_eq!(clamped.ttl(), Duration::from_secs(1));
/// assert_eq!(clamped.max_entries(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdempotencyConfig {
    ttl: Duration,
    max_entries: u64,
}

impl IdempotencyConfig {
    /// Default TTL in seconds (one day).
    pub const DEFAULT_TTL_SECS: u64 = 24 * 3600;

    /// Default entry capacity.
    pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

    /// Minimum allowed TTL in seconds.
    const MIN_TTL_SECS: u64 = 1;

    /// Maximum allowed TTL in seconds (seven days).
    const MAX_TTL_SECS: u64 = 7 * 24 * 3600;

    /// Build a configuration, clamping the TTL to 1 s ..= 7 days and the
    /// capacity to at least one entry.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let secs = ttl
            .as_secs()
            .clamp(Self::MIN_TTL_SECS, Self::MAX_TTL_SECS);
        Self {
            ttl: Duration::from_secs(secs),
            max_entries: max_entries.max(1),
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(Self::DEFAULT_TTL_SECS),
            Self::DEFAULT_MAX_ENTRIES,
        )
    }
}
