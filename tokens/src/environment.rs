//! Time abstraction.
//!
//! Stores that enforce expiry themselves read the current time through
//! [`Clock`] so that tests can drive expiry without sleeping.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// # Examples
///
/// ```
/// use composable_rust_tokens::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let before = chrono::Utc::now();
/// assert!(clock.now() >= before);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
