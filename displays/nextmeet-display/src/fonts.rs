//! Mono fonts drawn on the panel and their glyph metrics

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_7X13_BOLD};
use embedded_graphics::mono_font::MonoFont;
use nextmeet_core::compositor::Fonts;
use nextmeet_core::traits::GlyphMetrics;

/// A mono font and the characters it has glyphs for
///
/// The ASCII fonts substitute `?` for anything outside their range when
/// drawing; for measuring those characters count as missing.
#[derive(Clone, Copy)]
pub struct MonoMetrics {
    font: &'static MonoFont<'static>,
    first: char,
    last: char,
}

impl MonoMetrics {
    /// Font covering printable ASCII
    pub const fn ascii(font: &'static MonoFont<'static>) -> Self {
        Self {
            font,
            first: ' ',
            last: '~',
        }
    }

    pub const fn font(&self) -> &'static MonoFont<'static> {
        self.font
    }

    pub fn has_glyph(&self, c: char) -> bool {
        (self.first..=self.last).contains(&c)
    }

    /// Vertical size of one line
    pub fn line_height(&self) -> u32 {
        self.font.character_size.height
    }
}

impl GlyphMetrics for MonoMetrics {
    fn advance(&self, c: char) -> Option<u32> {
        self.has_glyph(c)
            .then(|| self.font.character_size.width + self.font.character_spacing)
    }
}

/// Clock, date and countdown
pub const SMALL: MonoMetrics = MonoMetrics::ascii(&FONT_6X10);

/// Event title
pub const LARGE: MonoMetrics = MonoMetrics::ascii(&FONT_7X13_BOLD);

/// Both fonts as the compositor wants them
pub const FONTS: Fonts<'static> = Fonts {
    small: &SMALL,
    large: &LARGE,
};
