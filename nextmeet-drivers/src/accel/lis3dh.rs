//! LIS3DH accelerometer (I2C)
//!
//! Only what picking the panel orientation needs: identify the part, turn
//! it on at 100 Hz with all axes enabled, and read one acceleration sample.
//!
//! Output registers hold left-justified 16-bit little-endian values; with
//! the default +/-2 g range, 1 g reads as about 16384.

use embedded_hal_async::i2c::I2c;
use nextmeet_core::compositor::Rotation;

/// Address with SDO/SA0 pulled high (Adafruit breakout default)
pub const LIS3DH_ADDR: u8 = 0x19;

/// Register addresses
pub mod reg {
    pub const WHO_AM_I: u8 = 0x0F;
    pub const CTRL_REG1: u8 = 0x20;
    pub const CTRL_REG4: u8 = 0x23;
    pub const OUT_X_L: u8 = 0x28;
}

/// WHO_AM_I answer
pub const DEVICE_ID: u8 = 0x33;

/// Set on a register address to read several registers in one go
const AUTO_INCREMENT: u8 = 0x80;

/// 100 Hz, normal mode, X/Y/Z enabled
const CTRL_REG1_100HZ_XYZ: u8 = 0x57;

/// Block data update, high resolution, +/-2 g
const CTRL_REG4_BDU_HR: u8 = 0x88;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lis3dhError<E> {
    I2c(E),
    /// WHO_AM_I returned something else
    WrongDevice(u8),
}

/// Raw acceleration sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acceleration {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Acceleration {
    /// Decode the six output registers starting at OUT_X_L
    pub fn from_registers(raw: &[u8; 6]) -> Self {
        Self {
            x: i16::from_le_bytes([raw[0], raw[1]]),
            y: i16::from_le_bytes([raw[2], raw[3]]),
            z: i16::from_le_bytes([raw[4], raw[5]]),
        }
    }

    /// Panel rotation for this gravity vector
    pub fn rotation(&self) -> Rotation {
        Rotation::from_acceleration(self.x as i32, self.y as i32)
    }
}

pub struct Lis3dh<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Lis3dh<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, LIS3DH_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Check the device id and start measuring
    pub async fn init(&mut self) -> Result<(), Lis3dhError<I2C::Error>> {
        let id = self.read_register(reg::WHO_AM_I).await?;
        if id != DEVICE_ID {
            return Err(Lis3dhError::WrongDevice(id));
        }
        self.write_register(reg::CTRL_REG1, CTRL_REG1_100HZ_XYZ).await?;
        self.write_register(reg::CTRL_REG4, CTRL_REG4_BDU_HR).await?;
        Ok(())
    }

    /// Read the latest sample
    pub async fn acceleration(&mut self) -> Result<Acceleration, Lis3dhError<I2C::Error>> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(self.address, &[reg::OUT_X_L | AUTO_INCREMENT], &mut raw)
            .await
            .map_err(Lis3dhError::I2c)?;
        Ok(Acceleration::from_registers(&raw))
    }

    /// Read one sample and turn it into a panel rotation
    pub async fn rotation(&mut self) -> Result<Rotation, Lis3dhError<I2C::Error>> {
        Ok(self.acceleration().await?.rotation())
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn read_register(&mut self, register: u8) -> Result<u8, Lis3dhError<I2C::Error>> {
        let mut value = [0u8];
        self.i2c
            .write_read(self.address, &[register], &mut value)
            .await
            .map_err(Lis3dhError::I2c)?;
        Ok(value[0])
    }

    async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Lis3dhError<I2C::Error>> {
        self.i2c
            .write(self.address, &[register, value])
            .await
            .map_err(Lis3dhError::I2c)
    }
}
