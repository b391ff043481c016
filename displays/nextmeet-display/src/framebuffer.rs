//! Rotating RGB frame buffer for the 64x32 panel
//!
//! Pixels are stored in physical panel order. Drawing goes through the
//! logical canvas, whose size and orientation follow the current
//! [`Rotation`], so a portrait canvas is 32 wide and 64 tall.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use nextmeet_core::compositor::{Layers, Rotation, PANEL_HEIGHT, PANEL_WIDTH};
use nextmeet_core::error::RenderError;
use nextmeet_core::traits::FrameSink;

use crate::renderer::render;

const WIDTH: usize = PANEL_WIDTH as usize;
const HEIGHT: usize = PANEL_HEIGHT as usize;

/// Red bit of a packed pixel
pub const RED_BIT: u8 = 0b001;
/// Green bit of a packed pixel
pub const GREEN_BIT: u8 = 0b010;
/// Blue bit of a packed pixel
pub const BLUE_BIT: u8 = 0b100;

/// Channels at or above this level are lit on a 1-bit panel
const CHANNEL_THRESHOLD: u8 = 0x80;

/// One bit per channel per pixel, physical row-major order
pub type PackedFrame = [[u8; WIDTH]; HEIGHT];

pub struct FrameBuffer {
    pixels: [[Rgb888; WIDTH]; HEIGHT],
    rotation: Rotation,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(Rotation::Deg0)
    }
}

impl FrameBuffer {
    pub const fn new(rotation: Rotation) -> Self {
        Self {
            pixels: [[Rgb888::BLACK; WIDTH]; HEIGHT],
            rotation,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Pixel at a physical panel position
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb888> {
        self.pixels.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Pixel at a logical canvas position
    pub fn logical_pixel(&self, point: Point) -> Option<Rgb888> {
        let (x, y) = self.physical(point)?;
        Some(self.pixels[y][x])
    }

    /// Reduce to one bit per channel for the scanner
    pub fn pack(&self, out: &mut PackedFrame) {
        for (src, dst) in self.pixels.iter().zip(out.iter_mut()) {
            for (color, bits) in src.iter().zip(dst.iter_mut()) {
                *bits = pack_color(*color);
            }
        }
    }

    /// Map a logical point to physical (column, row)
    fn physical(&self, point: Point) -> Option<(usize, usize)> {
        let (w, h) = self.rotation.size();
        if point.x < 0 || point.y < 0 || point.x >= w || point.y >= h {
            return None;
        }
        let (x, y) = (point.x, point.y);
        let (px, py) = match self.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (PANEL_WIDTH - 1 - y, x),
            Rotation::Deg180 => (PANEL_WIDTH - 1 - x, PANEL_HEIGHT - 1 - y),
            Rotation::Deg270 => (y, PANEL_HEIGHT - 1 - x),
        };
        Some((px as usize, py as usize))
    }
}

/// Threshold each channel of `color` into the packed bit layout
pub fn pack_color(color: Rgb888) -> u8 {
    let mut bits = 0;
    if color.r() >= CHANNEL_THRESHOLD {
        bits |= RED_BIT;
    }
    if color.g() >= CHANNEL_THRESHOLD {
        bits |= GREEN_BIT;
    }
    if color.b() >= CHANNEL_THRESHOLD {
        bits |= BLUE_BIT;
    }
    bits
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some((x, y)) = self.physical(point) {
                self.pixels[y][x] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for row in self.pixels.iter_mut() {
            row.fill(color);
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        let (w, h) = self.rotation.size();
        Size::new(w as u32, h as u32)
    }
}

impl FrameSink for FrameBuffer {
    fn draw(&mut self, layers: &Layers) -> Result<(), RenderError> {
        self.rotation = layers.rotation;
        render(layers, self).map_err(|e| match e {})
    }
}
