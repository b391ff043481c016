//! LED matrix drivers

mod hub75;

pub use hub75::{Hub75, Hub75Pins, COLS, ROWS, SCAN_ROWS};
