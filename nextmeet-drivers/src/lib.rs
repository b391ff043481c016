//! Hardware driver implementations
//!
//! Drivers for the parts hanging off the Pico W, written against the
//! `embedded-hal` traits:
//!
//! - HUB75 row scanner for the 64x32 RGB matrix
//! - LIS3DH accelerometer, used once at boot to pick the panel rotation

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod accel;
pub mod matrix;

pub use accel::{Acceleration, Lis3dh, Lis3dhError};
pub use matrix::{Hub75, Hub75Pins};
