//! Title marquee
//!
//! The title scrolls one pixel left per frame, so scroll speed follows the
//! frame period. It wraps to the right edge once it has fully left the
//! screen plus a fixed margin.

/// X position the title starts from (right edge of a 64 px panel)
pub const START_X: i32 = 63;

/// Extra pixels the title travels past its own width before wrapping
pub const WRAP_MARGIN: i32 = 32;

/// Next position after one frame
pub fn advance(position_px: i32, title_width_px: u32) -> i32 {
    let threshold = -(title_width_px as i32) - WRAP_MARGIN;
    if position_px < threshold {
        START_X
    } else {
        position_px - 1
    }
}

/// Start position, used when the display mode changes
pub const fn reset() -> i32 {
    START_X
}

/// Scroll position of the title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Marquee {
    position_px: i32,
}

impl Marquee {
    pub const fn new() -> Self {
        Self {
            position_px: START_X,
        }
    }

    pub fn position(&self) -> i32 {
        self.position_px
    }

    pub fn advance(&mut self, title_width_px: u32) {
        self.position_px = advance(self.position_px, title_width_px);
    }

    pub fn reset(&mut self) {
        self.position_px = reset();
    }
}

impl Default for Marquee {
    fn default() -> Self {
        Self::new()
    }
}
