//! Background images
//!
//! The moon sits in a 32x32 cell at the background layer's offset: left of
//! the text in landscape, above it in portrait. The two moon frames differ
//! only by the halo, which is what makes the pulse visible on a 1-bit panel.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};
use nextmeet_core::compositor::{Background, BackgroundLayer};

/// Edge of the square the moon is drawn in
pub const MOON_CELL: u32 = 32;

const MOON_DIAMETER: u32 = 26;
const HALO_DIAMETER: u32 = 30;

const MOON_COLOR: Rgb888 = Rgb888::new(0xFF, 0xFF, 0xC0);
const CRATER_COLOR: Rgb888 = Rgb888::new(0x90, 0x90, 0x40);
const HALO_COLOR: Rgb888 = Rgb888::new(0x00, 0x40, 0xFF);
const SPLASH_COLOR: Rgb888 = Rgb888::new(0xFF, 0xC0, 0x00);

/// Crater centres relative to the cell and their diameters
const CRATERS: [(i32, i32, u32); 3] = [(11, 10, 6), (19, 18, 5), (12, 21, 3)];

/// Draw the background image of `layer`
pub fn draw_background<D>(layer: &BackgroundLayer, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let origin = Point::new(layer.x, layer.y);
    match layer.image {
        Background::Splash => draw_splash(origin, target),
        Background::MoonA => draw_moon(origin, false, target),
        Background::MoonB => draw_moon(origin, true, target),
    }
}

fn draw_moon<D>(origin: Point, halo: bool, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let center = origin + Point::new(MOON_CELL as i32 / 2, MOON_CELL as i32 / 2);

    if halo {
        Circle::with_center(center, HALO_DIAMETER)
            .into_styled(PrimitiveStyle::with_stroke(HALO_COLOR, 1))
            .draw(target)?;
    }

    Circle::with_center(center, MOON_DIAMETER)
        .into_styled(PrimitiveStyle::with_fill(MOON_COLOR))
        .draw(target)?;

    for (x, y, diameter) in CRATERS {
        Circle::with_center(origin + Point::new(x, y), diameter)
            .into_styled(PrimitiveStyle::with_fill(CRATER_COLOR))
            .draw(target)?;
    }
    Ok(())
}

/// Crescent: a lit disc with a dark disc bitten out of it
fn draw_splash<D>(origin: Point, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let center = origin + Point::new(MOON_CELL as i32 / 2, MOON_CELL as i32 / 2);
    Circle::with_center(center, MOON_DIAMETER)
        .into_styled(PrimitiveStyle::with_fill(SPLASH_COLOR))
        .draw(target)?;
    Circle::with_center(center + Point::new(8, -3), MOON_DIAMETER)
        .into_styled(PrimitiveStyle::with_fill(Rgb888::BLACK))
        .draw(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use nextmeet_core::compositor::Rotation;

    fn drawn(image: Background) -> FrameBuffer {
        let mut fb = FrameBuffer::new(Rotation::Deg0);
        let layer = BackgroundLayer { image, x: 0, y: 0 };
        draw_background(&layer, &mut fb).unwrap();
        fb
    }

    #[test]
    fn test_moon_stays_in_cell() {
        let fb = drawn(Background::MoonB);
        for y in 0..32 {
            for x in 32..64 {
                assert_eq!(fb.pixel(x, y), Some(Rgb888::BLACK));
            }
        }
        assert_eq!(fb.pixel(24, 10), Some(MOON_COLOR));
    }

    #[test]
    fn test_pulse_frames_differ_by_halo() {
        let a = drawn(Background::MoonA);
        let b = drawn(Background::MoonB);
        // Leftmost point of the halo ring
        assert_eq!(a.pixel(2, 16), Some(Rgb888::BLACK));
        assert_eq!(b.pixel(2, 16), Some(HALO_COLOR));
        assert_eq!(a.pixel(11, 10), Some(CRATER_COLOR));
        assert_eq!(b.pixel(11, 10), Some(CRATER_COLOR));
    }

    #[test]
    fn test_splash_is_crescent() {
        let fb = drawn(Background::Splash);
        assert_eq!(fb.pixel(5, 16), Some(SPLASH_COLOR));
        assert_eq!(fb.pixel(24, 13), Some(Rgb888::BLACK));
    }
}
