//! Panel orientation and layer placement

use crate::input::DisplayMode;

/// Physical panel width in landscape
pub const PANEL_WIDTH: i32 = 64;
/// Physical panel height in landscape
pub const PANEL_HEIGHT: i32 = 32;

/// Panel rotation, clockwise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Pick the rotation from the gravity vector in the panel plane
    ///
    /// The dominant axis wins: gravity along +x is 270, -x is 90,
    /// +y is 0 and -y is 180. Diagonal ties go to the y axis.
    pub fn from_acceleration(x: i32, y: i32) -> Self {
        if x.unsigned_abs() > y.unsigned_abs() {
            if x > 0 {
                Rotation::Deg270
            } else {
                Rotation::Deg90
            }
        } else if y >= 0 {
            Rotation::Deg0
        } else {
            Rotation::Deg180
        }
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub const fn is_landscape(self) -> bool {
        matches!(self, Rotation::Deg0 | Rotation::Deg180)
    }

    /// Logical canvas size after rotation
    pub const fn size(self) -> (i32, i32) {
        if self.is_landscape() {
            (PANEL_WIDTH, PANEL_HEIGHT)
        } else {
            (PANEL_HEIGHT, PANEL_WIDTH)
        }
    }
}

/// Where each layer sits; `y` values are text centre lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Layout {
    /// Centre line for the clock and countdown
    pub center_x: i32,
    pub moon_y: i32,
    pub time_y: i32,
    /// Fixed date x, or `None` to centre it
    pub date_x: Option<i32>,
    pub date_y: i32,
    pub event_y: i32,
    pub title_y: i32,
}

impl Layout {
    /// Text along the right, moon on the left
    pub const LANDSCAPE: Self = Self {
        center_x: 48,
        moon_y: 0,
        time_y: 6,
        date_x: Some(0),
        date_y: 6,
        event_y: 26,
        title_y: 16,
    };

    /// Moon on top, countdown then clock and date below
    pub const PORTRAIT: Self = Self {
        center_x: 16,
        moon_y: 0,
        time_y: 49,
        date_x: None,
        date_y: 58,
        event_y: 38,
        title_y: 27,
    };

    pub fn new(rotation: Rotation, mode: DisplayMode) -> Self {
        let mut layout = if rotation.is_landscape() {
            Self::LANDSCAPE
        } else {
            Self::PORTRAIT
        };
        if mode == DisplayMode::Title {
            layout.title_y = rotation.size().1 / 2;
        }
        layout
    }
}
