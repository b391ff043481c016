//! Next-event tracking
//!
//! The event endpoint answers with a single pipe-delimited record,
//! `{start}|{end}|{title}`. A refresh replaces the tracked event wholesale
//! or leaves it untouched.

use heapless::String;

use crate::config::UrlText;
use crate::error::{EventError, ParseError};
use crate::traits::fetch::fetch_text;
use crate::traits::{Fetcher, GlyphMetrics};

/// Bytes of title kept for display
pub const TITLE_CAPACITY: usize = 128;

/// Characters of title handed to the marquee
pub const DISPLAY_TITLE_CHARS: usize = 40;

/// Title shown until the first successful refresh
pub const PLACEHOLDER_TITLE: &str = "Why Doesn't This Work?";

/// Marker that flags an all-day event inside the title
pub const ALL_DAY_MARKER: &str = "all day";

pub type TitleText = String<TITLE_CAPACITY>;

/// The upcoming calendar event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextEvent {
    /// Start, epoch seconds on the system clock's (local) scale
    pub start_epoch: i64,
    /// End, same scale as `start_epoch`
    pub end_epoch: i64,
    pub title: TitleText,
    pub is_all_day: bool,
    /// Width of the full title in the title font
    pub title_width_px: u32,
}

impl NextEvent {
    /// Event shown before anything has been fetched
    pub fn placeholder(glyphs: &dyn GlyphMetrics) -> Self {
        Self {
            start_epoch: 0,
            end_epoch: 0,
            title: truncate(PLACEHOLDER_TITLE),
            is_all_day: false,
            title_width_px: glyphs.text_width(PLACEHOLDER_TITLE),
        }
    }

    /// Leading part of the title that is actually drawn
    pub fn display_title(&self) -> &str {
        match self.title.char_indices().nth(DISPLAY_TITLE_CHARS) {
            Some((end, _)) => &self.title[..end],
            None => &self.title,
        }
    }

    /// Seconds from `now` (local epoch) until the event starts, negative once running
    pub fn seconds_until_start(&self, now: i64) -> i64 {
        self.start_epoch - now
    }
}

/// Parse an event record
///
/// Trailing line endings are dropped. The first two fields must be
/// integers; the third is the title and anything after it is ignored.
pub fn parse_event_record(record: &str, glyphs: &dyn GlyphMetrics) -> Result<NextEvent, ParseError> {
    let record = record.trim_end_matches(['\r', '\n']);
    let mut fields = record.split('|');

    let start_epoch = epoch_field(fields.next())?;
    let end_epoch = epoch_field(fields.next())?;
    let title = fields.next().ok_or(ParseError::MissingField)?;

    Ok(NextEvent {
        start_epoch,
        end_epoch,
        title: truncate(title),
        is_all_day: is_all_day(title),
        title_width_px: glyphs.text_width(title),
    })
}

/// All-day events carry the marker somewhere after the first character
///
/// A title that starts with the marker is an ordinary event.
pub fn is_all_day(title: &str) -> bool {
    matches!(title.find(ALL_DAY_MARKER), Some(index) if index > 0)
}

fn epoch_field(field: Option<&str>) -> Result<i64, ParseError> {
    field
        .ok_or(ParseError::MissingField)?
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidInteger)
}

fn truncate(title: &str) -> TitleText {
    let mut out = TitleText::new();
    for c in title.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Owns the current event and knows where to refresh it from
pub struct EventTracker {
    url: UrlText,
    event: NextEvent,
}

impl EventTracker {
    pub fn new(url: UrlText, glyphs: &dyn GlyphMetrics) -> Self {
        Self {
            url,
            event: NextEvent::placeholder(glyphs),
        }
    }

    pub fn event(&self) -> &NextEvent {
        &self.event
    }

    /// Fetch and replace the event
    ///
    /// On failure the transport is asked to reconnect and the previous
    /// event stays in place.
    pub async fn refresh<F: Fetcher>(
        &mut self,
        fetcher: &mut F,
        glyphs: &dyn GlyphMetrics,
        buf: &mut [u8],
    ) -> Result<(), EventError> {
        match self.fetch(fetcher, glyphs, buf).await {
            Ok(event) => {
                info!(
                    "Next event: {} at {} (all day: {}, {} px)",
                    event.title.as_str(),
                    event.start_epoch,
                    event.is_all_day,
                    event.title_width_px
                );
                self.event = event;
                Ok(())
            }
            Err(e) => {
                warn!("Event refresh failed: {:?}", e);
                if let Err(e) = fetcher.reconnect().await {
                    warn!("Reconnect failed: {:?}", e);
                }
                Err(e)
            }
        }
    }

    async fn fetch<F: Fetcher>(
        &self,
        fetcher: &mut F,
        glyphs: &dyn GlyphMetrics,
        buf: &mut [u8],
    ) -> Result<NextEvent, EventError> {
        let body = fetch_text(fetcher, &self.url, buf).await?;
        Ok(parse_event_record(body, glyphs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use embassy_futures::block_on;

    /// Every printable ASCII glyph is 6 px; nothing else has a glyph
    struct AsciiFont;

    impl GlyphMetrics for AsciiFont {
        fn advance(&self, c: char) -> Option<u32> {
            (' '..='~').contains(&c).then_some(6)
        }
    }

    struct ScriptedFetcher {
        responses: [Result<&'static str, FetchError>; 2],
        calls: usize,
        reconnects: usize,
    }

    impl ScriptedFetcher {
        fn new(first: Result<&'static str, FetchError>, second: Result<&'static str, FetchError>) -> Self {
            Self {
                responses: [first, second],
                calls: 0,
                reconnects: 0,
            }
        }
    }

    impl Fetcher for ScriptedFetcher {
        async fn fetch(&mut self, _url: &str, buf: &mut [u8]) -> Result<usize, FetchError> {
            let response = self.responses[self.calls.min(1)];
            self.calls += 1;
            let body = response?.as_bytes();
            buf[..body.len()].copy_from_slice(body);
            Ok(body.len())
        }

        async fn reconnect(&mut self) -> Result<(), FetchError> {
            self.reconnects += 1;
            Ok(())
        }
    }

    fn url() -> UrlText {
        let mut u = UrlText::new();
        u.push_str("http://calendar.lan/nextEvent.txt").unwrap();
        u
    }

    #[test]
    fn test_parse_record() {
        let e = parse_event_record("1700000100|1700003700|Standup\r\n", &AsciiFont).unwrap();
        assert_eq!(e.start_epoch, 1_700_000_100);
        assert_eq!(e.end_epoch, 1_700_003_700);
        assert_eq!(e.title.as_str(), "Standup");
        assert!(!e.is_all_day);
        assert_eq!(e.title_width_px, 7 * 6);
    }

    #[test]
    fn test_parse_tolerates_padded_integers() {
        let e = parse_event_record(" 100 | 200 |Lunch", &AsciiFont).unwrap();
        assert_eq!((e.start_epoch, e.end_epoch), (100, 200));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_event_record("1700000100|1700003700", &AsciiFont),
            Err(ParseError::MissingField)
        );
        assert_eq!(
            parse_event_record("soon|1700003700|Standup", &AsciiFont),
            Err(ParseError::InvalidInteger)
        );
        assert_eq!(parse_event_record("", &AsciiFont), Err(ParseError::InvalidInteger));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let e = parse_event_record("1|2|Title|Room 4", &AsciiFont).unwrap();
        assert_eq!(e.title.as_str(), "Title");
    }

    #[test]
    fn test_all_day_index_rule() {
        assert!(!is_all_day("all day meeting"));
        assert!(is_all_day("Lunch (all day)"));
        assert!(!is_all_day("Lunch"));
    }

    #[test]
    fn test_width_skips_missing_glyphs() {
        let e = parse_event_record("1|2|Caf\u{e9} \u{2615}", &AsciiFont).unwrap();
        // "Caf" and the space have glyphs, the accented e and the cup do not
        assert_eq!(e.title_width_px, 4 * 6);
        assert_eq!(e.title.as_str(), "Caf\u{e9} \u{2615}");
    }

    #[test]
    fn test_long_title_truncated_but_measured_in_full() {
        let mut record = std::string::String::from("1|2|");
        record.push_str(&"x".repeat(200));
        let e = parse_event_record(&record, &AsciiFont).unwrap();
        assert_eq!(e.title.len(), TITLE_CAPACITY);
        assert_eq!(e.title_width_px, 200 * 6);
        assert_eq!(e.display_title().chars().count(), DISPLAY_TITLE_CHARS);
    }

    #[test]
    fn test_refresh_replaces_event() {
        let mut fetcher = ScriptedFetcher::new(Ok("1700000100|1700003700|Standup"), Ok("5|6|Retro"));
        let mut tracker = EventTracker::new(url(), &AsciiFont);
        assert_eq!(tracker.event().title.as_str(), PLACEHOLDER_TITLE);

        let mut buf = [0u8; 256];
        block_on(tracker.refresh(&mut fetcher, &AsciiFont, &mut buf)).unwrap();
        assert_eq!(tracker.event().title.as_str(), "Standup");
        assert_eq!(tracker.event().seconds_until_start(1_700_000_000), 100);

        block_on(tracker.refresh(&mut fetcher, &AsciiFont, &mut buf)).unwrap();
        assert_eq!(tracker.event().title.as_str(), "Retro");
        assert_eq!(fetcher.reconnects, 0);
    }

    #[test]
    fn test_failed_refresh_keeps_event_and_reconnects() {
        let mut fetcher = ScriptedFetcher::new(Ok("10|20|Standup"), Ok("garbage"));
        let mut tracker = EventTracker::new(url(), &AsciiFont);
        let mut buf = [0u8; 256];

        block_on(tracker.refresh(&mut fetcher, &AsciiFont, &mut buf)).unwrap();
        let before = tracker.event().clone();

        let err = block_on(tracker.refresh(&mut fetcher, &AsciiFont, &mut buf)).unwrap_err();
        assert_eq!(err, EventError::Parse(ParseError::InvalidInteger));
        assert_eq!(tracker.event(), &before);
        assert_eq!(fetcher.reconnects, 1);
    }

    #[test]
    fn test_network_failure_keeps_placeholder() {
        let mut fetcher = ScriptedFetcher::new(Err(FetchError::Connect), Err(FetchError::Connect));
        let mut tracker = EventTracker::new(url(), &AsciiFont);
        let mut buf = [0u8; 256];

        let err = block_on(tracker.refresh(&mut fetcher, &AsciiFont, &mut buf)).unwrap_err();
        assert_eq!(err, EventError::Fetch(FetchError::Connect));
        assert_eq!(tracker.event().title.as_str(), PLACEHOLDER_TITLE);
        assert_eq!(fetcher.reconnects, 1);
    }
}
