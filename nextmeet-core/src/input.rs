//! Button debouncing and display mode
//!
//! Both buttons are wired to ground with pull-ups, so a press reads low.
//! The main loop samples them once per frame and acts on press edges only.

/// Raw level must hold this long before it is accepted
pub const DEBOUNCE_MS: u64 = 10;

/// Raw pin levels for one poll, `true` = high
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonLevels {
    pub up: bool,
    pub down: bool,
}

impl ButtonLevels {
    /// Neither button pressed
    pub const RELEASED: Self = Self {
        up: true,
        down: true,
    };
}

/// Press edges seen by one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputEdges {
    /// Refresh the event now
    pub up: bool,
    /// Toggle the display mode
    pub down: bool,
}

/// What the panel shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Moon, clock, date, countdown and scrolling title
    #[default]
    Default,
    /// Moon and the scrolling title only
    Title,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Default => DisplayMode::Title,
            DisplayMode::Title => DisplayMode::Default,
        }
    }
}

/// Debouncer for one active-low input
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    stable: bool,
    raw: bool,
    changed_at_ms: u64,
    interval_ms: u64,
}

impl Debouncer {
    /// Starts released (high)
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            stable: true,
            raw: true,
            changed_at_ms: 0,
            interval_ms,
        }
    }

    /// Feed a raw sample; returns `true` on the poll where a press is accepted
    pub fn update(&mut self, raw: bool, now_ms: u64) -> bool {
        if raw != self.raw {
            self.raw = raw;
            self.changed_at_ms = now_ms;
        }
        if self.raw != self.stable && now_ms.saturating_sub(self.changed_at_ms) >= self.interval_ms
        {
            self.stable = self.raw;
            return !self.stable;
        }
        false
    }

    /// Debounced level, `true` = high (released)
    pub fn level(&self) -> bool {
        self.stable
    }
}

/// Edge detection for the up and down buttons
#[derive(Debug, Clone, Copy)]
pub struct InputController {
    up: Debouncer,
    down: Debouncer,
}

impl InputController {
    pub const fn new() -> Self {
        Self {
            up: Debouncer::new(DEBOUNCE_MS),
            down: Debouncer::new(DEBOUNCE_MS),
        }
    }

    /// Sample both buttons
    pub fn poll(&mut self, levels: ButtonLevels, now_ms: u64) -> InputEdges {
        InputEdges {
            up: self.up.update(levels.up, now_ms),
            down: self.down.update(levels.down, now_ms),
        }
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_needs_stable_interval() {
        let mut d = Debouncer::new(DEBOUNCE_MS);
        assert!(!d.update(false, 100));
        assert!(!d.update(false, 105));
        assert!(d.update(false, 110));
        // Held: no repeat
        assert!(!d.update(false, 200));
        assert!(!d.level());
    }

    #[test]
    fn test_bounce_is_ignored() {
        let mut d = Debouncer::new(DEBOUNCE_MS);
        assert!(!d.update(false, 0));
        assert!(!d.update(true, 4));
        assert!(!d.update(false, 8));
        assert!(!d.update(true, 12));
        assert!(!d.update(true, 40));
        assert!(d.level());
    }

    #[test]
    fn test_release_is_not_an_edge() {
        let mut d = Debouncer::new(DEBOUNCE_MS);
        d.update(false, 0);
        assert!(d.update(false, 10));
        assert!(!d.update(true, 20));
        assert!(!d.update(true, 30));
        assert!(d.level());
        // Second press fires again
        assert!(!d.update(false, 40));
        assert!(d.update(false, 50));
    }

    #[test]
    fn test_controller_reports_each_button() {
        let mut input = InputController::new();
        let pressed_down = ButtonLevels {
            up: true,
            down: false,
        };
        assert_eq!(input.poll(pressed_down, 0), InputEdges::default());
        let edges = input.poll(pressed_down, 20);
        assert!(edges.down);
        assert!(!edges.up);
        assert_eq!(input.poll(ButtonLevels::RELEASED, 40), InputEdges::default());
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(DisplayMode::default(), DisplayMode::Default);
        assert_eq!(DisplayMode::Default.toggled(), DisplayMode::Title);
        assert_eq!(DisplayMode::Title.toggled(), DisplayMode::Default);
    }
}
