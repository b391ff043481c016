//! Resync timers
//!
//! Two independent timers decide when the main loop refreshes the event and
//! when it resynchronises the clock. Both run on local epoch seconds.

/// Default interval between clock syncs (12 hours)
pub const TIME_SYNC_INTERVAL_S: i64 = 12 * 60 * 60;
/// Default delay before retrying a failed clock sync (30 minutes)
pub const TIME_SYNC_BACKOFF_S: i64 = 30 * 60;
/// Default interval between event refreshes (15 minutes)
pub const EVENT_SYNC_INTERVAL_S: i64 = 15 * 60;

/// A periodic timer with a retry backoff
///
/// The timer fires when strictly more than `interval_s` seconds have passed
/// since `last`. After a failure the next attempt is placed `backoff_s`
/// seconds after the failure, so retries never come faster than the backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncTimer {
    last: i64,
    interval_s: i64,
    backoff_s: i64,
}

impl SyncTimer {
    pub const fn new(last: i64, interval_s: i64, backoff_s: i64) -> Self {
        Self {
            last,
            interval_s,
            backoff_s,
        }
    }

    /// Whether a sync should run at `now`
    pub fn is_due(&self, now: i64) -> bool {
        now - self.last > self.interval_s
    }

    /// Record a successful sync at `at`
    pub fn succeeded(&mut self, at: i64) {
        self.last = at;
    }

    /// Record a failed sync at `now`
    pub fn failed(&mut self, now: i64) {
        self.last = now - self.interval_s + self.backoff_s;
    }

    /// Local epoch of the next attempt (the timer is due just after it)
    pub fn next_due(&self) -> i64 {
        self.last + self.interval_s
    }

    pub fn last(&self) -> i64 {
        self.last
    }
}

/// The clock and event timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncSchedule {
    pub time: SyncTimer,
    pub event: SyncTimer,
}

impl SyncSchedule {
    /// Both timers start as if they had just synced at `now`
    pub fn new(now: i64, time: TimerSettings, event: TimerSettings) -> Self {
        Self {
            time: SyncTimer::new(now, time.interval_s, time.backoff_s),
            event: SyncTimer::new(now, event.interval_s, event.backoff_s),
        }
    }
}

/// Interval and backoff for one timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSettings {
    pub interval_s: i64,
    pub backoff_s: i64,
}

impl TimerSettings {
    pub const TIME: Self = Self {
        interval_s: TIME_SYNC_INTERVAL_S,
        backoff_s: TIME_SYNC_BACKOFF_S,
    };

    /// A failed event refresh simply waits for the next cycle
    pub const EVENT: Self = Self {
        interval_s: EVENT_SYNC_INTERVAL_S,
        backoff_s: EVENT_SYNC_INTERVAL_S,
    };
}
