//! Test utilities for the staffing crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to one instant.
///
/// ```rust
/// use mockable::Clock;
/// use staffing::test_support::FixedClock;
///
/// let clock = FixedClock::default();
/// assert_eq!(clock.utc(), clock.utc());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    utc_now: DateTime<Utc>,
}

impl FixedClock {
    /// Pin the clock to `utc_now`.
    #[must_use]
    pub const fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}
