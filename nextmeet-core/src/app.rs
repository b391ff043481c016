//! Main loop
//!
//! `App` owns every piece of application state and the board
//! collaborators. The firmware calls [`App::start`] once and then
//! [`App::tick`] once per frame.
//!
//! Each tick runs in a fixed order:
//!
//! 1. Poll the buttons (up refreshes the event, down toggles the mode)
//! 2. Event timer: refresh the event, then resync the clock
//! 3. Clock timer: resync; on success the tick ends early
//! 4. Countdown from the event start and the UTC time
//! 5. Compose the layers
//! 6. Advance the marquee
//! 7. Draw

use time::PrimitiveDateTime;

use crate::clock::{local_datetime, local_epoch, ClockState};
use crate::compositor::{Compositor, Fonts, FrameInput, Rotation};
use crate::config::Settings;
use crate::error::{EventError, ParseError, SyncError};
use crate::event::{EventTracker, NextEvent};
use crate::format::format_countdown;
use crate::input::{DisplayMode, InputController};
use crate::marquee::Marquee;
use crate::schedule::{SyncSchedule, TimerSettings};
use crate::timesync::TimeSync;
use crate::traits::{Buttons, Fetcher, FrameSink, SystemClock};

/// Receive buffer for one HTTP body
pub const FETCH_BUFFER_LEN: usize = 1024;

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// A frame was drawn
    Rendered,
    /// The clock was resynced; nothing was drawn and the caller should
    /// tick again straight away
    Restarted,
}

/// The countdown clock application
pub struct App<'a, F, C, S, B> {
    fetcher: F,
    clock: C,
    sink: S,
    buttons: B,
    fonts: Fonts<'a>,
    twelve_hour: bool,
    time_sync: TimeSync,
    events: EventTracker,
    clock_state: ClockState,
    timers: (TimerSettings, TimerSettings),
    schedule: SyncSchedule,
    input: InputController,
    mode: DisplayMode,
    marquee: Marquee,
    compositor: Compositor,
    buf: [u8; FETCH_BUFFER_LEN],
}

impl<'a, F, C, S, B> App<'a, F, C, S, B>
where
    F: Fetcher,
    C: SystemClock,
    S: FrameSink,
    B: Buttons,
{
    /// Fails only if the time URL does not fit once the timezone is filled in
    pub fn new(
        settings: &Settings,
        rotation: Rotation,
        fonts: Fonts<'a>,
        fetcher: F,
        clock: C,
        sink: S,
        buttons: B,
    ) -> Result<Self, ParseError> {
        let time_sync = TimeSync::new(
            &settings.endpoints.time_url,
            &settings.location.timezone,
            settings.sync.time_attempts,
        )?;
        let timers = (settings.sync.time_timer(), settings.sync.event_timer());
        let now = clock.now();

        Ok(Self {
            fetcher,
            clock,
            sink,
            buttons,
            fonts,
            twelve_hour: settings.display.twelve_hour,
            time_sync,
            events: EventTracker::new(settings.endpoints.event_url.clone(), fonts.large),
            clock_state: ClockState::new(),
            timers,
            schedule: SyncSchedule::new(now, timers.0, timers.1),
            input: InputController::new(),
            mode: DisplayMode::Default,
            marquee: Marquee::new(),
            compositor: Compositor::new(rotation, settings.display.moon_pulse_frames),
            buf: [0; FETCH_BUFFER_LEN],
        })
    }

    /// Boot sequence: splash, first clock sync, first event
    ///
    /// If the clock sync fails the system clock is used as is with a UTC
    /// offset of `+00:00`.
    pub async fn start(&mut self) {
        self.draw_current();

        let synced_at = match self.sync_time().await {
            Ok(at) => at,
            Err(e) => {
                warn!("Initial time sync failed, using system clock: {:?}", e);
                self.clock.now()
            }
        };
        self.schedule = SyncSchedule::new(synced_at, self.timers.0, self.timers.1);

        // A failure leaves the placeholder event in place
        let _ = self.refresh_event().await;
    }

    /// Run one frame
    pub async fn tick(&mut self) -> Tick {
        let now = self.clock.now();

        let edges = self
            .input
            .poll(self.buttons.levels(), self.clock.uptime_ms());
        if edges.up {
            info!("Up button: refreshing event");
            let _ = self.refresh_event().await;
        }
        if edges.down {
            self.mode = self.mode.toggled();
            self.marquee.reset();
            info!("Down button: mode {:?}", self.mode);
        }

        if self.schedule.event.is_due(now) {
            debug!("Event refresh due");
            let _ = self.refresh_event().await;
            match self.sync_time().await {
                Ok(at) => self.schedule.event.succeeded(at),
                Err(e) => {
                    warn!("Time sync with event refresh failed: {:?}", e);
                    self.schedule.event.failed(now);
                }
            }
        }

        if self.schedule.time.is_due(now) {
            debug!("Time sync due");
            match self.sync_time().await {
                Ok(at) => {
                    self.schedule.time.succeeded(at);
                    return Tick::Restarted;
                }
                Err(e) => {
                    warn!("Scheduled time sync failed: {:?}", e);
                    self.schedule.time.failed(now);
                }
            }
        }

        self.render();
        Tick::Rendered
    }

    pub fn event(&self) -> &NextEvent {
        self.events.event()
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn marquee_position(&self) -> i32 {
        self.marquee.position()
    }

    pub fn clock_state(&self) -> &ClockState {
        &self.clock_state
    }

    pub fn schedule(&self) -> &SyncSchedule {
        &self.schedule
    }

    /// Sync the clock; returns the new local epoch
    async fn sync_time(&mut self) -> Result<i64, SyncError> {
        let sample = self
            .time_sync
            .sync(&mut self.fetcher, &mut self.clock, &mut self.buf)
            .await?;
        self.clock_state.apply(&sample);
        Ok(local_epoch(&sample.local))
    }

    /// Show the loading marker, then fetch the event
    async fn refresh_event(&mut self) -> Result<(), EventError> {
        let layers = self.compositor.show_loading(self.mode, self.fonts);
        if let Err(e) = self.sink.draw(layers) {
            warn!("Draw failed: {:?}", e);
        }
        self.events
            .refresh(&mut self.fetcher, self.fonts.large, &mut self.buf)
            .await
    }

    fn render(&mut self) {
        let local_now = self.clock.now();
        let event = self.events.event();
        let countdown = format_countdown(event.seconds_until_start(local_now));

        let input = FrameInput {
            local: local_datetime(local_now).unwrap_or(PrimitiveDateTime::MIN),
            countdown: &countdown,
            title: event.display_title(),
            marquee_x: self.marquee.position(),
            mode: self.mode,
            twelve_hour: self.twelve_hour,
        };
        let layers = self.compositor.compose(&input, self.fonts);
        self.marquee.advance(event.title_width_px);

        if let Err(e) = self.sink.draw(layers) {
            warn!("Draw failed: {:?}", e);
        }
    }

    fn draw_current(&mut self) {
        if let Err(e) = self.sink.draw(self.compositor.layers()) {
            warn!("Draw failed: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{Background, Layers};
    use crate::config::parse_settings;
    use crate::error::{ClockError, FetchError, RenderError};
    use crate::event::PLACEHOLDER_TITLE;
    use crate::input::ButtonLevels;
    use crate::traits::GlyphMetrics;
    use embassy_futures::block_on;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::vec::Vec;

    const SETTINGS: &str = r#"
[network]
ssid = "office"

[endpoints]
time_url = "http://lan/time.php"
event_url = "http://lan/nextEvent.txt"
"#;

    const TIME_BODY: &str =
        r#"{"datetime":"2023-11-14T22:13:20.000001+00:00","dst":false,"utc_offset":"+00:00"}"#;

    struct Ascii;

    impl GlyphMetrics for Ascii {
        fn advance(&self, c: char) -> Option<u32> {
            c.is_ascii().then_some(6)
        }
    }

    static FONT: Ascii = Ascii;

    #[derive(Default)]
    struct Remote {
        time_body: Cell<Option<&'static str>>,
        event_body: Cell<Option<&'static str>>,
        time_calls: Cell<usize>,
        event_calls: Cell<usize>,
    }

    struct MockFetcher(Rc<Remote>);

    impl Fetcher for MockFetcher {
        async fn fetch(&mut self, url: &str, buf: &mut [u8]) -> Result<usize, FetchError> {
            let body = if url.ends_with("time.php") {
                self.0.time_calls.set(self.0.time_calls.get() + 1);
                self.0.time_body.get()
            } else {
                self.0.event_calls.set(self.0.event_calls.get() + 1);
                self.0.event_body.get()
            };
            let body = body.ok_or(FetchError::Connect)?.as_bytes();
            buf[..body.len()].copy_from_slice(body);
            Ok(body.len())
        }

        async fn reconnect(&mut self) -> Result<(), FetchError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Time {
        now: Cell<i64>,
        uptime_ms: Cell<u64>,
    }

    struct MockClock(Rc<Time>);

    impl SystemClock for MockClock {
        fn now(&self) -> i64 {
            self.0.now.get()
        }

        fn set(&mut self, local: &PrimitiveDateTime) -> Result<(), ClockError> {
            self.0.now.set(local_epoch(local));
            Ok(())
        }

        fn uptime_ms(&self) -> u64 {
            self.0.uptime_ms.get()
        }
    }

    struct MockSink(Rc<RefCell<Vec<Layers>>>);

    impl FrameSink for MockSink {
        fn draw(&mut self, layers: &Layers) -> Result<(), RenderError> {
            self.0.borrow_mut().push(layers.clone());
            Ok(())
        }
    }

    struct MockButtons(Rc<Cell<ButtonLevels>>);

    impl Buttons for MockButtons {
        fn levels(&mut self) -> ButtonLevels {
            self.0.get()
        }
    }

    struct Rig {
        remote: Rc<Remote>,
        time: Rc<Time>,
        frames: Rc<RefCell<Vec<Layers>>>,
        buttons: Rc<Cell<ButtonLevels>>,
        app: App<'static, MockFetcher, MockClock, MockSink, MockButtons>,
    }

    impl Rig {
        fn new(time_body: Option<&'static str>, event_body: Option<&'static str>) -> Self {
            let remote = Rc::new(Remote::default());
            remote.time_body.set(time_body);
            remote.event_body.set(event_body);
            let time = Rc::new(Time::default());
            time.now.set(1_700_000_000);
            let frames = Rc::new(RefCell::new(Vec::new()));
            let buttons = Rc::new(Cell::new(ButtonLevels::RELEASED));

            let settings = parse_settings(SETTINGS).unwrap();
            let app = App::new(
                &settings,
                Rotation::Deg0,
                Fonts {
                    small: &FONT,
                    large: &FONT,
                },
                MockFetcher(remote.clone()),
                MockClock(time.clone()),
                MockSink(frames.clone()),
                MockButtons(buttons.clone()),
            )
            .unwrap();

            Self {
                remote,
                time,
                frames,
                buttons,
                app,
            }
        }

        fn advance(&self, seconds: i64, ms: u64) {
            self.time.now.set(self.time.now.get() + seconds);
            self.time.uptime_ms.set(self.time.uptime_ms.get() + ms);
        }

        fn last_frame(&self) -> Layers {
            self.frames.borrow().last().cloned().unwrap()
        }

        /// Hold levels across two polls so the debouncer accepts them
        fn hold(&mut self, levels: ButtonLevels) {
            self.buttons.set(levels);
            block_on(self.app.tick());
            self.advance(0, 20);
            block_on(self.app.tick());
        }

        fn press(&mut self, levels: ButtonLevels) {
            self.hold(levels);
        }

        fn release(&mut self) {
            self.hold(ButtonLevels::RELEASED);
        }
    }

    #[test]
    fn test_end_to_end_countdown() {
        let mut rig = Rig::new(None, Some("1700000100|1700003700|Standup"));
        block_on(rig.app.start());

        // Five failed sync attempts, fallback offset
        assert_eq!(rig.remote.time_calls.get(), 5);
        assert_eq!(rig.app.clock_state().utc_offset(), "+00:00");
        assert_eq!(rig.app.event().title.as_str(), "Standup");

        assert_eq!(block_on(rig.app.tick()), Tick::Rendered);
        let frame = rig.last_frame();
        assert_eq!(frame.countdown.text.as_str(), "1m");
        assert_eq!(frame.countdown.color, 0xFF00FF);
        assert_eq!(frame.title.text.as_str(), "Standup");
        assert_eq!(frame.title.x, 63);
        assert_eq!(frame.now_time.text.as_str(), "10:13");
        assert_eq!(frame.now_date.text.as_str(), "11/14");
        assert_eq!(rig.app.marquee_position(), 62);
    }

    #[test]
    fn test_countdown_uses_local_clock_with_offset() {
        let mut rig = Rig::new(
            Some(r#"{"datetime":"2023-11-14T22:13:20-08:00","dst":false,"utc_offset":"-08:00"}"#),
            Some("1700000100|1700003700|Standup"),
        );
        block_on(rig.app.start());
        assert_eq!(rig.app.clock_state().utc_offset(), "-08:00");
        assert_eq!(rig.time.now.get(), 1_700_000_000);

        assert_eq!(block_on(rig.app.tick()), Tick::Rendered);
        let frame = rig.last_frame();
        assert_eq!(frame.countdown.text.as_str(), "1m");
        assert_eq!(frame.countdown.color, 0xFF00FF);
    }

    #[test]
    fn test_start_draws_splash_then_loading() {
        let mut rig = Rig::new(Some(TIME_BODY), Some("1|2|x"));
        block_on(rig.app.start());
        let frames = rig.frames.borrow();
        assert_eq!(frames[0].background.image, Background::Splash);
        assert!(!frames[0].countdown.visible);
        assert_eq!(frames[1].countdown.text.as_str(), "-load-");
        assert_eq!(rig.remote.time_calls.get(), 1);
    }

    #[test]
    fn test_event_failure_keeps_placeholder() {
        let mut rig = Rig::new(Some(TIME_BODY), None);
        block_on(rig.app.start());
        assert_eq!(rig.app.event().title.as_str(), PLACEHOLDER_TITLE);
        block_on(rig.app.tick());
        assert_eq!(rig.last_frame().title.text.as_str(), PLACEHOLDER_TITLE);
    }

    #[test]
    fn test_event_timer_refreshes_and_resyncs() {
        let mut rig = Rig::new(Some(TIME_BODY), Some("1700000100|1700003700|Standup"));
        block_on(rig.app.start());
        assert_eq!(rig.remote.event_calls.get(), 1);

        rig.advance(15 * 60, 0);
        block_on(rig.app.tick());
        assert_eq!(rig.remote.event_calls.get(), 1);

        rig.remote.event_body.set(Some("1700009000|1700012600|Retro"));
        rig.advance(1, 0);
        assert_eq!(block_on(rig.app.tick()), Tick::Rendered);
        assert_eq!(rig.remote.event_calls.get(), 2);
        assert_eq!(rig.remote.time_calls.get(), 2);
        assert_eq!(rig.app.event().title.as_str(), "Retro");
        // The resync put the clock back to the server time
        assert_eq!(rig.app.schedule().event.last(), 1_700_000_000);
    }

    #[test]
    fn test_time_timer_restarts_tick() {
        let mut rig = Rig::new(Some(TIME_BODY), Some("1|2|x"));
        block_on(rig.app.start());

        rig.advance(12 * 3600 + 1, 0);
        let drawn = rig.frames.borrow().len();
        let time_calls = rig.remote.time_calls.get();
        assert_eq!(block_on(rig.app.tick()), Tick::Restarted);
        // One sync after the event refresh, one for the clock timer
        assert_eq!(rig.remote.time_calls.get(), time_calls + 2);
        // Only the loading frame from the event refresh was drawn
        assert_eq!(rig.frames.borrow().len(), drawn + 1);
    }

    #[test]
    fn test_failed_time_sync_backs_off() {
        let mut rig = Rig::new(Some(TIME_BODY), Some("1|2|x"));
        block_on(rig.app.start());
        rig.remote.time_body.set(None);

        rig.advance(12 * 3600 + 1, 0);
        let failed_at = rig.time.now.get();
        assert_eq!(block_on(rig.app.tick()), Tick::Rendered);
        // Five attempts for the event branch, five for the clock branch
        let after_failure = rig.remote.time_calls.get();
        assert_eq!(after_failure, 1 + 10);
        assert_eq!(rig.app.schedule().time.next_due(), failed_at + 30 * 60);
        assert_eq!(rig.app.schedule().event.next_due(), failed_at + 15 * 60);

        // Still inside both backoff windows
        rig.advance(10 * 60, 0);
        block_on(rig.app.tick());
        assert_eq!(rig.remote.time_calls.get(), after_failure);
    }

    #[test]
    fn test_up_button_refreshes_event() {
        let mut rig = Rig::new(Some(TIME_BODY), Some("1|2|First"));
        block_on(rig.app.start());
        rig.remote.event_body.set(Some("1|2|Second"));

        rig.press(ButtonLevels {
            up: false,
            down: true,
        });
        assert_eq!(rig.remote.event_calls.get(), 2);
        assert_eq!(rig.app.event().title.as_str(), "Second");
    }

    #[test]
    fn test_down_button_toggles_mode_and_resets_marquee() {
        let mut rig = Rig::new(Some(TIME_BODY), Some("1700000100|1700003700|Standup"));
        block_on(rig.app.start());
        for _ in 0..10 {
            block_on(rig.app.tick());
        }
        assert_eq!(rig.app.marquee_position(), 53);

        rig.press(ButtonLevels {
            up: true,
            down: false,
        });
        assert_eq!(rig.app.mode(), DisplayMode::Title);
        // Reset to 63, drawn there, then advanced once
        assert_eq!(rig.app.marquee_position(), 62);
        let frame = rig.last_frame();
        assert_eq!(frame.title.x, 63);
        assert!(!frame.countdown.visible);
        assert!(!frame.now_time.visible);

        rig.release();
        rig.press(ButtonLevels {
            up: true,
            down: false,
        });
        assert_eq!(rig.app.mode(), DisplayMode::Default);
    }

    #[test]
    fn test_new_event_does_not_reset_marquee() {
        let mut rig = Rig::new(Some(TIME_BODY), Some("1|2|First"));
        block_on(rig.app.start());
        for _ in 0..5 {
            block_on(rig.app.tick());
        }
        rig.remote.event_body.set(Some("1|2|Second"));
        rig.press(ButtonLevels {
            up: false,
            down: true,
        });
        assert_eq!(rig.app.event().title.as_str(), "Second");
        assert_eq!(rig.app.marquee_position(), 63 - 7);
    }
}
