//! Font metrics and frame output traits

use crate::compositor::Layers;
use crate::error::RenderError;

/// Per-glyph advance widths of a loaded font
pub trait GlyphMetrics {
    /// Advance width of `c` in pixels, `None` if the font has no glyph for it
    fn advance(&self, c: char) -> Option<u32>;

    /// Sum of advances over every character that has a glyph
    ///
    /// Characters without a glyph add nothing, so unsupported characters
    /// shorten the measured width.
    fn text_width(&self, text: &str) -> u32 {
        text.chars().filter_map(|c| self.advance(c)).sum()
    }
}

/// Something that can draw a composed frame
pub trait FrameSink {
    /// Redraw the whole panel from `layers`
    fn draw(&mut self, layers: &Layers) -> Result<(), RenderError>;
}
