//! Board-agnostic core logic for the NextMeet countdown clock
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (fetcher, system clock, glyph metrics, frame sink, buttons)
//! - Time formatting and time synchronisation
//! - Next-event tracking and the title marquee
//! - Display composition and input handling
//! - The main loop state machine
//! - Settings types and parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod log;

pub mod app;
pub mod clock;
pub mod compositor;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod input;
pub mod marquee;
pub mod schedule;
pub mod timesync;
pub mod traits;

pub use app::{App, Tick};
pub use error::{ClockError, EventError, FetchError, ParseError, SyncError};
