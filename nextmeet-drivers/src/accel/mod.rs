//! Accelerometers

mod lis3dh;

pub use lis3dh::{Acceleration, Lis3dh, Lis3dhError, LIS3DH_ADDR};
