//! Wall-clock state and timestamp parsing
//!
//! The system clock holds local wall time: the sync service writes the
//! server's local timestamp into it verbatim. Epoch values read back from it
//! are therefore "local epoch" seconds, the same scale the event endpoint
//! uses for its start and end times.

use heapless::String;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::ParseError;

/// UTC offset text as received, e.g. `"-08:00"`
pub type OffsetText = String<8>;

/// Offset assumed before the first successful sync
pub const DEFAULT_UTC_OFFSET: &str = "+00:00";

/// What the last successful sync reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockState {
    utc_offset: OffsetText,
    last_sync_local: Option<i64>,
}

impl ClockState {
    /// State before any sync: UTC
    pub fn new() -> Self {
        let mut utc_offset = OffsetText::new();
        let _ = utc_offset.push_str(DEFAULT_UTC_OFFSET);
        Self {
            utc_offset,
            last_sync_local: None,
        }
    }

    /// Record a successful sync
    pub fn apply(&mut self, sample: &TimeSample) {
        self.utc_offset = sample.utc_offset.clone();
        self.last_sync_local = Some(local_epoch(&sample.local));
    }

    pub fn utc_offset(&self) -> &str {
        &self.utc_offset
    }

    /// Local epoch of the last successful sync, if any
    pub fn last_sync(&self) -> Option<i64> {
        self.last_sync_local
    }
}

impl Default for ClockState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one successful time sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSample {
    /// Local wall time reported by the server
    pub local: PrimitiveDateTime,
    pub dst: bool,
    pub utc_offset: OffsetText,
    pub utc_offset_s: i32,
}

/// Seconds since the epoch for a local wall time, treating it as UTC
pub fn local_epoch(dt: &PrimitiveDateTime) -> i64 {
    dt.assume_utc().unix_timestamp()
}

/// Inverse of [`local_epoch`]
pub fn local_datetime(epoch: i64) -> Option<PrimitiveDateTime> {
    let odt = OffsetDateTime::from_unix_timestamp(epoch).ok()?;
    Some(PrimitiveDateTime::new(odt.date(), odt.time()))
}

/// Parse `YYYY-MM-DDTHH:MM:SS[.fff][±HH:MM|Z]`
///
/// Fractional seconds and any trailing zone designator are ignored; the
/// result is the wall time exactly as written.
pub fn parse_datetime(s: &str) -> Result<PrimitiveDateTime, ParseError> {
    let (date, hms) = s
        .trim()
        .split_once('T')
        .ok_or(ParseError::InvalidTimestamp)?;

    let mut parts = date.split('-');
    let year: i32 = field(parts.next())?;
    let month: u8 = field(parts.next())?;
    let day: u8 = field(parts.next())?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidTimestamp);
    }

    // Drop the zone designator, then the fraction
    let hms = hms.split(['+', '-', 'Z']).next().unwrap_or("");
    let mut parts = hms.split(':');
    let hour: u8 = field(parts.next())?;
    let minute: u8 = field(parts.next())?;
    let second: u8 = field(parts.next().and_then(|s| s.split('.').next()))?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidTimestamp);
    }

    let month = Month::try_from(month).map_err(|_| ParseError::InvalidTimestamp)?;
    let date =
        Date::from_calendar_date(year, month, day).map_err(|_| ParseError::InvalidTimestamp)?;
    let time = Time::from_hms(hour, minute, second).map_err(|_| ParseError::InvalidTimestamp)?;
    Ok(PrimitiveDateTime::new(date, time))
}

fn field<T: core::str::FromStr>(part: Option<&str>) -> Result<T, ParseError> {
    part.ok_or(ParseError::InvalidTimestamp)?
        .parse()
        .map_err(|_| ParseError::InvalidTimestamp)
}

/// Parse a `±HH:MM` offset into seconds east of UTC
pub fn parse_utc_offset(s: &str) -> Result<i32, ParseError> {
    let s = s.trim();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(ParseError::InvalidOffset),
    };
    let (hours, minutes) = rest.split_once(':').ok_or(ParseError::InvalidOffset)?;
    let hours: i32 = hours.parse().map_err(|_| ParseError::InvalidOffset)?;
    let minutes: i32 = minutes.parse().map_err(|_| ParseError::InvalidOffset)?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(ParseError::InvalidOffset);
    }
    Ok(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let dt = parse_datetime("2023-11-14T22:13:20").unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), Month::November);
        assert_eq!(dt.day(), 14);
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (22, 13, 20));
    }

    #[test]
    fn test_parse_ignores_fraction_and_offset() {
        let a = parse_datetime("2023-11-14T22:13:20.123456-08:00").unwrap();
        let b = parse_datetime("2023-11-14T22:13:20+05:30").unwrap();
        let c = parse_datetime("2023-11-14T22:13:20Z").unwrap();
        let plain = parse_datetime("2023-11-14T22:13:20").unwrap();
        assert_eq!(a, plain);
        assert_eq!(b, plain);
        assert_eq!(c, plain);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_datetime("nope"), Err(ParseError::InvalidTimestamp));
        assert_eq!(
            parse_datetime("2023-13-14T22:13:20"),
            Err(ParseError::InvalidTimestamp)
        );
        assert_eq!(
            parse_datetime("2023-11-14T22:13"),
            Err(ParseError::InvalidTimestamp)
        );
        assert_eq!(
            parse_datetime("2023-11-14T25:00:00"),
            Err(ParseError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_utc_offset("+00:00"), Ok(0));
        assert_eq!(parse_utc_offset("-08:00"), Ok(-8 * 3600));
        assert_eq!(parse_utc_offset("+05:30"), Ok(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("05:30"), Err(ParseError::InvalidOffset));
        assert_eq!(parse_utc_offset("+5"), Err(ParseError::InvalidOffset));
        assert_eq!(parse_utc_offset(""), Err(ParseError::InvalidOffset));
    }

    #[test]
    fn test_epoch_round_trip() {
        let dt = parse_datetime("2023-11-14T22:13:20").unwrap();
        let epoch = local_epoch(&dt);
        assert_eq!(epoch, 1_700_000_000);
        assert_eq!(local_datetime(epoch), Some(dt));
    }

    #[test]
    fn test_apply_records_offset_and_sync_time() {
        let mut state = ClockState::new();
        assert_eq!(state.utc_offset(), "+00:00");
        assert_eq!(state.last_sync(), None);

        let mut offset = OffsetText::new();
        offset.push_str("-08:00").unwrap();
        state.apply(&TimeSample {
            local: parse_datetime("2023-11-14T14:13:20").unwrap(),
            dst: false,
            utc_offset: offset,
            utc_offset_s: -8 * 3600,
        });
        assert_eq!(state.last_sync(), Some(1_700_000_000 - 8 * 3600));
        assert_eq!(state.utc_offset(), "-08:00");
    }
}
