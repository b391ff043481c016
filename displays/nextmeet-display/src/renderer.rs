//! Paints a composed layer set

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use nextmeet_core::compositor::{Layers, TextLayer, TEXT_CAPACITY};

use crate::fonts::{MonoMetrics, LARGE, SMALL};
use crate::moon::draw_background;

/// Convert a `0xRRGGBB` layer color
pub fn rgb(color: u32) -> Rgb888 {
    Rgb888::new((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Clear the target and draw every layer back to front
///
/// The title uses the large font and everything else the small one.
pub fn render<D>(layers: &Layers, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    target.clear(Rgb888::BLACK)?;
    draw_background(&layers.background, target)?;

    draw_text(&layers.now_date, &SMALL, target)?;
    draw_text(&layers.now_time, &SMALL, target)?;
    draw_text(&layers.countdown, &SMALL, target)?;
    draw_text(&layers.title, &LARGE, target)?;
    Ok(())
}

/// Draw one text layer, vertically centred on its `y`
///
/// Characters the font has no glyph for are skipped, matching how the
/// layer was measured.
fn draw_text<D>(layer: &TextLayer, metrics: &MonoMetrics, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    if !layer.visible || layer.text.is_empty() {
        return Ok(());
    }

    let mut text: String<TEXT_CAPACITY> = String::new();
    for c in layer.text.chars().filter(|&c| metrics.has_glyph(c)) {
        // A subset of the layer text always fits
        let _ = text.push(c);
    }

    let style = MonoTextStyle::new(metrics.font(), rgb(layer.color));
    Text::with_baseline(&text, Point::new(layer.x, layer.y), style, Baseline::Middle).draw(target)?;
    Ok(())
}
