//! The I2C bus and the sleep the driver needs, as seams.

use std::fmt::Debug;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use i2cdev::core::I2CDevice;
pub use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use tracing::trace;

/// Blocking access to an I2C bus with 7-bit addressing.
pub trait I2cTransport {
    type Error: Debug;

    /// Writes `bytes` to the device at `address` in one transaction.
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Writes `bytes`, then reads `read_len` bytes back from the same device.
    fn write_then_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, Self::Error>;
}

impl<T: I2cTransport + ?Sized> I2cTransport for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(address, bytes)
    }

    fn write_then_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, Self::Error> {
        (**self).write_then_read(address, bytes, read_len)
    }
}

pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// A Linux `/dev/i2c-N` bus.
///
/// The kernel binds one slave address to the open file; it is switched
/// only when a transaction targets a different device.
pub struct LinuxI2cBus {
    device: LinuxI2CDevice,
    address: u8,
}

impl LinuxI2cBus {
    pub fn open<P: AsRef<Path>>(path: P, address: u8) -> Result<LinuxI2cBus, LinuxI2CError> {
        let device = LinuxI2CDevice::new(path, u16::from(address))?;
        Ok(LinuxI2cBus { device, address })
    }

    fn select(&mut self, address: u8) -> Result<(), LinuxI2CError> {
        if self.address != address {
            trace!(from = self.address, to = address, "switching i2c slave address");
            self.device.set_slave_address(u16::from(address))?;
            self.address = address;
        }
        Ok(())
    }
}

impl I2cTransport for LinuxI2cBus {
    type Error = LinuxI2CError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), LinuxI2CError> {
        self.select(address)?;
        I2CDevice::write(&mut self.device, bytes)
    }

    fn write_then_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        read_len: usize,
    ) -> Result<Vec<u8>, LinuxI2CError> {
        self.select(address)?;
        I2CDevice::write(&mut self.device, bytes)?;
        let mut buf = vec![0u8; read_len];
        I2CDevice::read(&mut self.device, &mut buf)?;
        Ok(buf)
    }
}
