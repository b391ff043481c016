//! Front panel buttons
//!
//! Both buttons short to ground; the internal pull-ups hold the pins high
//! while released. Debouncing happens in the core.

use embassy_rp::gpio::Input;
use nextmeet_core::input::ButtonLevels;
use nextmeet_core::traits::Buttons;

pub struct PanelButtons {
    up: Input<'static>,
    down: Input<'static>,
}

impl PanelButtons {
    pub fn new(up: Input<'static>, down: Input<'static>) -> Self {
        Self { up, down }
    }
}

impl Buttons for PanelButtons {
    fn levels(&mut self) -> ButtonLevels {
        ButtonLevels {
            up: self.up.is_high(),
            down: self.down.is_high(),
        }
    }
}
