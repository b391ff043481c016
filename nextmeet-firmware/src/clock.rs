//! System clock on top of the embassy time driver
//!
//! The RP2040 RTC is not used: wall time is the last value set plus the
//! time elapsed since, which is plenty between twice-daily syncs.

use embassy_time::Instant;
use nextmeet_core::clock::local_epoch;
use nextmeet_core::error::ClockError;
use nextmeet_core::traits::SystemClock;
use time::PrimitiveDateTime;

pub struct EmbassyClock {
    /// Local epoch seconds at `base`
    base_epoch: i64,
    base: Instant,
}

impl EmbassyClock {
    /// Starts at the epoch until the first sync
    pub fn new() -> Self {
        Self {
            base_epoch: 0,
            base: Instant::now(),
        }
    }
}

impl SystemClock for EmbassyClock {
    fn now(&self) -> i64 {
        self.base_epoch + self.base.elapsed().as_secs() as i64
    }

    fn set(&mut self, local: &PrimitiveDateTime) -> Result<(), ClockError> {
        self.base_epoch = local_epoch(local);
        self.base = Instant::now();
        Ok(())
    }

    fn uptime_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
