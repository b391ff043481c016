//! Inter-task communication
//!
//! The main loop renders into its own frame buffer and publishes a packed
//! copy here; the matrix task picks it up between scans.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use nextmeet_display::PackedFrame;
use nextmeet_drivers::matrix::{COLS, ROWS};

/// Most recent frame, one bit per channel
pub static FRAME: Mutex<CriticalSectionRawMutex, RefCell<PackedFrame>> =
    Mutex::new(RefCell::new([[0; COLS]; ROWS]));

/// Set when FRAME holds a frame the matrix task has not copied yet
pub static FRAME_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
