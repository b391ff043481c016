//! Rendering for the NextMeet 64x32 RGB matrix
//!
//! This crate provides:
//! - `FrameBuffer`, an embedded-graphics canvas that follows the panel rotation
//! - `MonoMetrics`, glyph metrics for the mono fonts drawn on the panel
//! - The moon and splash backgrounds
//! - `render`, which paints a composed layer set onto any RGB draw target
//!
//! The frame buffer implements the core `FrameSink`, so the main loop can
//! draw into it directly. Scanning it out to the panel is the driver's job.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod fonts;
pub mod framebuffer;
pub mod moon;
pub mod renderer;

pub use fonts::{MonoMetrics, FONTS, LARGE, SMALL};
pub use framebuffer::{FrameBuffer, PackedFrame};
pub use renderer::render;
