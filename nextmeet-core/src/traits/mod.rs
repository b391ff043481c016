//! Collaborator traits
//!
//! These traits define the interface between the application logic and the
//! board: network transport, system clock, fonts, panel and buttons.

pub mod clock;
pub mod display;
pub mod fetch;
pub mod input;

pub use clock::SystemClock;
pub use display::{FrameSink, GlyphMetrics};
pub use fetch::Fetcher;
pub use input::Buttons;
