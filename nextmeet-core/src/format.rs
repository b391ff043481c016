//! Display string formatting
//!
//! Pure functions turning wall-clock values and countdowns into the short
//! strings shown on the matrix.

use core::fmt::Write;
use heapless::String;
use time::{Date, Time};

/// Longest countdown text that still fits beside the moon
pub const MAX_COUNTDOWN_CHARS: usize = 9;

/// Replacement text for countdowns that would overflow the layout
pub const OVERFLOW_TEXT: &str = "Recurring";

/// Shown while the event is already running
pub const IN_MEETING_TEXT: &str = "-In Mtg-";

const DAY_S: i64 = 24 * 3600;
const HOUR_S: i64 = 3600;
const MINUTE_S: i64 = 60;

/// Clock text such as `"9:05"` or `"21:05"`
pub type ClockText = String<8>;

/// Date text such as `"11/14"`
pub type DateText = String<8>;

/// Countdown text, at most [`MAX_COUNTDOWN_CHARS`] long
pub type CountdownText = String<16>;

/// Countdown urgency, mapped to a color by the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorTag {
    /// Event in progress
    Red,
    /// Less than an hour away
    Magenta,
    /// Less than a day away
    Cyan,
    /// A day or more away
    White,
}

impl ColorTag {
    /// 24-bit RGB value for this tag
    pub const fn rgb(self) -> u32 {
        match self {
            ColorTag::Red => 0xFF0000,
            ColorTag::Magenta => 0xFF00FF,
            ColorTag::Cyan => 0x00FFFF,
            ColorTag::White => 0xFFFFFF,
        }
    }
}

/// Formatted countdown with its color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub text: CountdownText,
    pub color: ColorTag,
}

/// Format a wall-clock time as hours and minutes
///
/// In 12-hour mode hour 0 shows as 12 and afternoon hours drop 12; the hour
/// is never padded. In 24-hour mode the hour is zero-padded to 2 digits.
pub fn format_clock_time(t: &Time, twelve_hour: bool) -> ClockText {
    let mut out = ClockText::new();
    let minute = t.minute();
    // Buffer fits "HH:MM"
    if twelve_hour {
        let hour = match t.hour() {
            0 => 12,
            h @ 1..=12 => h,
            h => h - 12,
        };
        let _ = write!(out, "{}:{:02}", hour, minute);
    } else {
        let _ = write!(out, "{:02}:{:02}", t.hour(), minute);
    }
    out
}

/// Format a date as `"{month}/{day}"` without padding
pub fn format_date(d: &Date) -> DateText {
    let mut out = DateText::new();
    let _ = write!(out, "{}/{}", u8::from(d.month()), d.day());
    out
}

/// Format the time left until an event starts
///
/// Negative values mean the event has started. Days, hours and minutes are
/// floor-divided; seconds are dropped. Anything longer than
/// [`MAX_COUNTDOWN_CHARS`] is replaced by [`OVERFLOW_TEXT`].
pub fn format_countdown(seconds_remaining: i64) -> Countdown {
    if seconds_remaining < 0 {
        return Countdown {
            text: text(IN_MEETING_TEXT),
            color: ColorTag::Red,
        };
    }

    let days = seconds_remaining / DAY_S;
    let hours = (seconds_remaining % DAY_S) / HOUR_S;
    let minutes = (seconds_remaining % HOUR_S) / MINUTE_S;

    let mut out = CountdownText::new();
    let (written, color) = if days >= 1 {
        (write!(out, "{}d:{}h{}m", days, hours, minutes), ColorTag::White)
    } else if hours >= 1 {
        (write!(out, "{}h{}m", hours, minutes), ColorTag::Cyan)
    } else {
        (write!(out, "{}m", minutes), ColorTag::Magenta)
    };

    if written.is_err() || out.len() > MAX_COUNTDOWN_CHARS {
        out = text(OVERFLOW_TEXT);
    }

    Countdown { text: out, color }
}

fn text(s: &str) -> CountdownText {
    let mut out = CountdownText::new();
    let _ = out.push_str(s);
    out
}
