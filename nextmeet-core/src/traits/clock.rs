//! System clock trait

use time::PrimitiveDateTime;

use crate::error::ClockError;

/// Wall clock plus a monotonic millisecond counter
pub trait SystemClock {
    /// Current local wall time as epoch seconds
    ///
    /// This is the local time interpreted as if it were UTC, matching what
    /// [`SystemClock::set`] was given.
    fn now(&self) -> i64;

    /// Set the wall clock to a local time
    fn set(&mut self, local: &PrimitiveDateTime) -> Result<(), ClockError>;

    /// Milliseconds since boot, never goes backwards
    fn uptime_ms(&self) -> u64;
}
