//! Display composition
//!
//! Builds the named layer set for each frame from the clock, countdown,
//! event title and marquee position. Rendering the layers is the frame
//! sink's job.

pub mod layers;
pub mod layout;

pub use layers::{Background, BackgroundLayer, Layers, TextLayer, TEXT_CAPACITY};
pub use layout::{Layout, Rotation, PANEL_HEIGHT, PANEL_WIDTH};

use time::PrimitiveDateTime;

use crate::format::{format_clock_time, format_date, Countdown};
use crate::input::DisplayMode;
use crate::traits::GlyphMetrics;

/// Gray used for the clock and date
pub const CLOCK_COLOR: u32 = 0x808080;

/// Title color
pub const TITLE_COLOR: u32 = 0xFF00FF;

/// Countdown color while an event is loading
pub const LOADING_COLOR: u32 = 0x00FF00;

/// Countdown text while an event is loading
pub const LOADING_TEXT: &str = "-load-";

/// Extra width allowed when centering the countdown
const COUNTDOWN_PAD_PX: i32 = 6;

/// Metrics of the two fonts on screen
#[derive(Clone, Copy)]
pub struct Fonts<'a> {
    /// Clock, date and countdown
    pub small: &'a dyn GlyphMetrics,
    /// Event title
    pub large: &'a dyn GlyphMetrics,
}

/// Everything a frame shows
pub struct FrameInput<'a> {
    pub local: PrimitiveDateTime,
    pub countdown: &'a Countdown,
    pub title: &'a str,
    pub marquee_x: i32,
    pub mode: DisplayMode,
    pub twelve_hour: bool,
}

/// Alternates the two moon images every `period` frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoonPulse {
    counter: u8,
    period: u8,
    current: Background,
}

impl MoonPulse {
    pub fn new(period: u8) -> Self {
        Self {
            counter: 0,
            period: period.max(1),
            current: Background::MoonA,
        }
    }

    /// Count one frame and return the image to show
    pub fn tick(&mut self) -> Background {
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
            self.current = match self.current {
                Background::MoonA => Background::MoonB,
                _ => Background::MoonA,
            };
        }
        self.current
    }
}

/// Owns the layer set and the background animation
pub struct Compositor {
    rotation: Rotation,
    pulse: MoonPulse,
    layers: Layers,
}

impl Compositor {
    /// Starts on the splash screen with every text layer hidden
    pub fn new(rotation: Rotation, pulse_frames: u8) -> Self {
        Self {
            rotation,
            pulse: MoonPulse::new(pulse_frames),
            layers: Layers::splash(rotation),
        }
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Lay out one frame
    pub fn compose(&mut self, input: &FrameInput<'_>, fonts: Fonts<'_>) -> &Layers {
        let layout = Layout::new(self.rotation, input.mode);

        self.layers.background = BackgroundLayer {
            image: self.pulse.tick(),
            x: 0,
            y: layout.moon_y,
        };

        let default_mode = input.mode == DisplayMode::Default;

        let time = format_clock_time(&input.local.time(), input.twelve_hour);
        let width = fonts.small.text_width(&time) as i32;
        self.layers.now_time.set(&time, layout.center_x - width / 2, layout.time_y);
        self.layers.now_time.color = CLOCK_COLOR;
        self.layers.now_time.visible = default_mode;

        let date = format_date(&input.local.date());
        let width = fonts.small.text_width(&date) as i32;
        let date_x = layout.date_x.unwrap_or(layout.center_x - width / 2);
        self.layers.now_date.set(&date, date_x, layout.date_y);
        self.layers.now_date.color = CLOCK_COLOR;
        self.layers.now_date.visible = default_mode;

        let text = &input.countdown.text;
        let width = fonts.small.text_width(text) as i32;
        self.layers.countdown.set(
            text,
            layout.center_x - (width + COUNTDOWN_PAD_PX) / 2,
            layout.event_y,
        );
        self.layers.countdown.color = input.countdown.color.rgb();
        self.layers.countdown.visible = default_mode;

        self.layers.title.set(input.title, input.marquee_x, layout.title_y);
        self.layers.title.color = TITLE_COLOR;
        self.layers.title.visible = true;

        &self.layers
    }

    /// Replace the countdown with the loading marker
    pub fn show_loading(&mut self, mode: DisplayMode, fonts: Fonts<'_>) -> &Layers {
        let layout = Layout::new(self.rotation, mode);
        let width = fonts.small.text_width(LOADING_TEXT) as i32;
        let countdown = &mut self.layers.countdown;
        countdown.set(
            LOADING_TEXT,
            layout.center_x - (width + COUNTDOWN_PAD_PX) / 2,
            layout.event_y,
        );
        countdown.color = LOADING_COLOR;
        countdown.visible = true;
        &self.layers
    }
}
