//! Frame sink backed by the HUB75 matrix

use nextmeet_core::compositor::Layers;
use nextmeet_core::error::RenderError;
use nextmeet_core::traits::FrameSink;
use nextmeet_display::FrameBuffer;

use crate::channels::{FRAME, FRAME_READY};

/// Renders into a frame buffer and hands the result to the matrix task
pub struct MatrixSink {
    frame: &'static mut FrameBuffer,
}

impl MatrixSink {
    pub fn new(frame: &'static mut FrameBuffer) -> Self {
        Self { frame }
    }
}

impl FrameSink for MatrixSink {
    fn draw(&mut self, layers: &Layers) -> Result<(), RenderError> {
        self.frame.draw(layers)?;
        FRAME.lock(|packed| self.frame.pack(&mut packed.borrow_mut()));
        FRAME_READY.signal(());
        Ok(())
    }
}
