//! Time synchronisation
//!
//! Fetches the local time from the time endpoint, writes it into the system
//! clock and reports the UTC offset. A sync makes a fixed number of attempts
//! before giving up; scheduling retries is the caller's job.

use serde::Deserialize;

use crate::clock::{parse_datetime, parse_utc_offset, OffsetText, TimeSample};
use crate::config::UrlText;
use crate::error::{AttemptError, ParseError, SyncError};
use crate::traits::fetch::fetch_text;
use crate::traits::{Fetcher, SystemClock};

/// Attempts per sync unless configured otherwise
pub const DEFAULT_ATTEMPTS: u8 = 5;

/// Placeholder in the time URL replaced by the timezone identifier
pub const TIMEZONE_PLACEHOLDER: &str = "{timezone}";

#[derive(Deserialize)]
struct TimePayload<'a> {
    datetime: &'a str,
    #[serde(default)]
    dst: bool,
    utc_offset: &'a str,
}

/// Parse the time endpoint's JSON body
///
/// Unknown fields are ignored. `dst` defaults to false when absent.
pub fn parse_time_payload(body: &str) -> Result<TimeSample, ParseError> {
    let (payload, _) = serde_json_core::from_str::<TimePayload<'_>>(body)
        .map_err(|_| ParseError::InvalidJson)?;

    let local = parse_datetime(payload.datetime)?;
    let utc_offset_s = parse_utc_offset(payload.utc_offset)?;
    let mut utc_offset = OffsetText::new();
    utc_offset
        .push_str(payload.utc_offset.trim())
        .map_err(|_| ParseError::InvalidOffset)?;

    Ok(TimeSample {
        local,
        dst: payload.dst,
        utc_offset,
        utc_offset_s,
    })
}

/// Build the time URL for a timezone
pub fn time_url(template: &str, timezone: &str) -> Result<UrlText, ParseError> {
    let mut url = UrlText::new();
    let mut rest = template;
    while let Some(at) = rest.find(TIMEZONE_PLACEHOLDER) {
        url.push_str(&rest[..at]).map_err(|_| ParseError::TooLong)?;
        url.push_str(timezone).map_err(|_| ParseError::TooLong)?;
        rest = &rest[at + TIMEZONE_PLACEHOLDER.len()..];
    }
    url.push_str(rest).map_err(|_| ParseError::TooLong)?;
    Ok(url)
}

/// Time sync client
pub struct TimeSync {
    url: UrlText,
    attempts: u8,
}

impl TimeSync {
    /// `url` may contain [`TIMEZONE_PLACEHOLDER`]
    pub fn new(url: &str, timezone: &str, attempts: u8) -> Result<Self, ParseError> {
        Ok(Self {
            url: time_url(url, timezone)?,
            attempts: attempts.max(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the time and set the system clock
    ///
    /// Any failure (fetch, parse or clock) uses up one attempt.
    pub async fn sync<F: Fetcher, C: SystemClock>(
        &self,
        fetcher: &mut F,
        clock: &mut C,
        buf: &mut [u8],
    ) -> Result<TimeSample, SyncError> {
        let mut last = None;
        for attempt in 1..=self.attempts {
            match self.attempt(fetcher, clock, buf).await {
                Ok(sample) => {
                    info!(
                        "Clock set (attempt {}), utc offset {}, dst {}",
                        attempt,
                        sample.utc_offset.as_str(),
                        sample.dst
                    );
                    return Ok(sample);
                }
                Err(e) => {
                    warn!("Time sync attempt {} failed: {:?}", attempt, e);
                    last = Some(e);
                }
            }
        }

        Err(SyncError::Exhausted {
            attempts: self.attempts,
            // attempts >= 1, so at least one error was recorded
            last: last.unwrap_or(AttemptError::Parse(ParseError::MissingField)),
        })
    }

    async fn attempt<F: Fetcher, C: SystemClock>(
        &self,
        fetcher: &mut F,
        clock: &mut C,
        buf: &mut [u8],
    ) -> Result<TimeSample, AttemptError> {
        let body = fetch_text(fetcher, &self.url, buf).await?;
        let sample = parse_time_payload(body)?;
        clock.set(&sample.local)?;
        Ok(sample)
    }
}
