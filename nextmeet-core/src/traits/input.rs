//! Button input trait

use crate::input::ButtonLevels;

/// Raw (undebounced) levels of the two buttons
pub trait Buttons {
    /// Sample both pins; `true` is electrically high
    fn levels(&mut self) -> ButtonLevels;
}
