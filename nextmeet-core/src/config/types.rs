//! Settings types

use heapless::String;

use crate::schedule::{TimerSettings, EVENT_SYNC_INTERVAL_S, TIME_SYNC_BACKOFF_S, TIME_SYNC_INTERVAL_S};
use crate::timesync::DEFAULT_ATTEMPTS;

pub const MAX_URL_LEN: usize = 128;
pub const MAX_SSID_LEN: usize = 32;
pub const MAX_PASSWORD_LEN: usize = 64;
pub const MAX_TIMEZONE_LEN: usize = 48;

pub type UrlText = String<MAX_URL_LEN>;

/// WiFi credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSettings {
    pub ssid: String<MAX_SSID_LEN>,
    /// Empty for an open network
    pub password: String<MAX_PASSWORD_LEN>,
}

/// Where the clock lives
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocationSettings {
    pub latitude: f32,
    pub longitude: f32,
    /// IANA identifier, e.g. `America/New_York`
    pub timezone: String<MAX_TIMEZONE_LEN>,
}

/// Remote endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndpointSettings {
    /// May contain `{timezone}`
    pub time_url: UrlText,
    pub event_url: UrlText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplaySettings {
    pub twelve_hour: bool,
    /// Time between frames; the title scrolls one pixel per frame
    pub frame_period_ms: u32,
    /// Frames between moon background swaps
    pub moon_pulse_frames: u8,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            twelve_hour: true,
            frame_period_ms: 50,
            moon_pulse_frames: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncSettings {
    pub time_interval_s: u32,
    pub time_backoff_s: u32,
    pub event_interval_s: u32,
    pub time_attempts: u8,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            time_interval_s: TIME_SYNC_INTERVAL_S as u32,
            time_backoff_s: TIME_SYNC_BACKOFF_S as u32,
            event_interval_s: EVENT_SYNC_INTERVAL_S as u32,
            time_attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl SyncSettings {
    pub fn time_timer(&self) -> TimerSettings {
        TimerSettings {
            interval_s: self.time_interval_s as i64,
            backoff_s: self.time_backoff_s as i64,
        }
    }

    /// A failed event refresh waits one full interval
    pub fn event_timer(&self) -> TimerSettings {
        TimerSettings {
            interval_s: self.event_interval_s as i64,
            backoff_s: self.event_interval_s as i64,
        }
    }
}

/// Everything loaded at boot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub network: NetworkSettings,
    pub location: LocationSettings,
    pub endpoints: EndpointSettings,
    pub display: DisplaySettings,
    pub sync: SyncSettings,
}
