//! Manually advanced clock.

use crate::environment::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can hand one clone to a store and
/// advance another.
///
/// # Example
///
/// ```
/// use composable_rust_tokens::environment::Clock;
/// use composable_rust_tokens::mocks::ManualClock;
/// use chrono::Duration;
///
/// let clock = ManualClock::default();
/// let start = clock.now();
/// clock.advance(Duration::seconds(301));
/// assert_eq!(clock.now() - start, Duration::seconds(301));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    time: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at `time`.
    #[must_use]
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time: Arc::new(Mutex::new(time)),
        }
    }

    /// Move the clock forward (or backward, for a negative duration).
    pub fn advance(&self, by: Duration) {
        let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
        *time += by;
    }

    /// Jump to an absolute time.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Default for ManualClock {
    /// 2025-01-01 00:00:00 UTC.
    fn default() -> Self {
        Self::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.time.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let clock = ManualClock::default();
        let other = clock.clone();

        clock.advance(Duration::minutes(5));
        assert_eq!(other.now(), clock.now());

        let target = clock.now() + Duration::days(1);
        other.set(target);
        assert_eq!(clock.now(), target);
    }

    #[test]
    fn test_default_is_new_year_2025() {
        assert_eq!(ManualClock::default().now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
