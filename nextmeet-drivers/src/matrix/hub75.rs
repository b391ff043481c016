//! HUB75 row scanner
//!
//! Drives a 64x32 1/16-scan panel from one bit per colour channel. The
//! panel only shows one pair of rows at a time (row `n` and row `n + 16`),
//! so the refresh task has to keep calling [`Hub75::scan_next`].
//!
//! For each row pair:
//! 1. Shift 64 columns of upper and lower colour bits, one CLK pulse each
//! 2. Blank the panel (OE high)
//! 3. Select the row pair on A..D and pulse LAT
//! 4. Unblank (OE low)
//!
//! Frame bytes carry red in bit 0, green in bit 1 and blue in bit 2.

use embedded_hal::digital::{OutputPin, PinState};

/// Panel width in pixels
pub const COLS: usize = 64;
/// Panel height in pixels
pub const ROWS: usize = 32;
/// Row pairs per frame
pub const SCAN_ROWS: usize = ROWS / 2;

const RED: u8 = 0b001;
const GREEN: u8 = 0b010;
const BLUE: u8 = 0b100;

/// HUB75 connector pins
pub struct Hub75Pins<P> {
    pub r1: P,
    pub g1: P,
    pub b1: P,
    pub r2: P,
    pub g2: P,
    pub b2: P,
    pub a: P,
    pub b: P,
    pub c: P,
    pub d: P,
    pub clk: P,
    pub lat: P,
    /// Output enable, active low
    pub oe: P,
}

pub struct Hub75<P> {
    pins: Hub75Pins<P>,
    /// Next row pair to light
    row: usize,
}

impl<P: OutputPin> Hub75<P> {
    /// Take the pins and leave the panel blanked
    pub fn new(mut pins: Hub75Pins<P>) -> Result<Self, P::Error> {
        pins.oe.set_high()?;
        pins.clk.set_low()?;
        pins.lat.set_low()?;
        Ok(Self { pins, row: 0 })
    }

    /// Row pair the next [`scan_next`](Self::scan_next) will light
    pub fn next_row(&self) -> usize {
        self.row
    }

    /// Light the next row pair, wrapping after the last one
    pub fn scan_next(&mut self, frame: &[[u8; COLS]; ROWS]) -> Result<(), P::Error> {
        self.scan_row(frame, self.row)?;
        self.row = (self.row + 1) % SCAN_ROWS;
        Ok(())
    }

    /// Shift and latch row pair `row`
    pub fn scan_row(&mut self, frame: &[[u8; COLS]; ROWS], row: usize) -> Result<(), P::Error> {
        let row = row % SCAN_ROWS;
        let pins = &mut self.pins;

        for (&upper, &lower) in frame[row].iter().zip(frame[row + SCAN_ROWS].iter()) {
            pins.r1.set_state(state(upper & RED))?;
            pins.g1.set_state(state(upper & GREEN))?;
            pins.b1.set_state(state(upper & BLUE))?;
            pins.r2.set_state(state(lower & RED))?;
            pins.g2.set_state(state(lower & GREEN))?;
            pins.b2.set_state(state(lower & BLUE))?;
            pins.clk.set_high()?;
            pins.clk.set_low()?;
        }

        pins.oe.set_high()?;
        pins.a.set_state(state(row as u8 & 0b0001))?;
        pins.b.set_state(state(row as u8 & 0b0010))?;
        pins.c.set_state(state(row as u8 & 0b0100))?;
        pins.d.set_state(state(row as u8 & 0b1000))?;
        pins.lat.set_high()?;
        pins.lat.set_low()?;
        pins.oe.set_low()?;
        Ok(())
    }
}

fn state(bits: u8) -> PinState {
    PinState::from(bits != 0)
}
