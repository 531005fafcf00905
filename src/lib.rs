//! Servo driver for the PCA9685 16-channel PWM controller on Linux I2C.
//!
//! ```no_run
//! use servo_pca9685::{DriverConfig, Pca9685};
//!
//! let config = DriverConfig::default();
//! let mut pca9685 = Pca9685::open_linux(&config)?;
//! pca9685.set_position(0, 1500)?;
//! pca9685.close()?;
//! # Ok::<(), servo_pca9685::Error<servo_pca9685::LinuxI2CError>>(())
//! ```

#[macro_use]
extern crate serde_derive;

pub mod bits;
pub mod config;
pub mod error;
pub mod pca9685;
pub mod registers;
pub mod transport;

#[cfg(test)]
mod mock;

pub use crate::config::{DriverConfig, PositionLimits};
pub use crate::error::{ConfigError, Error, InvalidChannel};
pub use crate::pca9685::{position_to_tick, Pca9685};
pub use crate::registers::{channel_register, ChannelRegister};
pub use crate::transport::{Delay, I2cTransport, LinuxI2CError, LinuxI2cBus, StdDelay};
