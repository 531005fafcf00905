use tracing::{debug, info, trace, warn};

use crate::bits::{clear_bit, get_byte, set_bit, test_bit};
use crate::config::{DriverConfig, PositionLimits};
use crate::error::Error;
use crate::registers::{
    channel_register, ChannelRegister, Mode1Bit, Register, PRESCALE, PULSE_END_CENTER,
    PULSE_END_HIGH, PULSE_END_LOW, PULSE_START,
};
use crate::transport::{Delay, I2cTransport, LinuxI2CError, LinuxI2cBus, StdDelay};

/// Oscillator settle time after leaving sleep.
const SETTLE_MS: u32 = 100;

const MAX_ADDRESS: u8 = 0x7F;

const POSITION_LOW: u16 = 1000;
const POSITION_HIGH: u16 = 2000;

/// Off-tick for a servo position.
///
/// Positions 1000 and 2000 land on `PULSE_END_LOW` and `PULSE_END_HIGH`;
/// anything else is extrapolated along the same line, not clamped.
pub fn position_to_tick(position: u16) -> u16 {
    let span = f64::from(PULSE_END_HIGH - PULSE_END_LOW);
    let fraction =
        (f64::from(position) - f64::from(POSITION_LOW)) / f64::from(POSITION_HIGH - POSITION_LOW);
    (f64::from(PULSE_END_LOW) + fraction * span).round() as u16
}

/// A PCA9685 driving servos on a 50 Hz period.
///
/// The chip registers are the only state; nothing is cached here. Bit
/// updates are read-modify-write over two transactions, so a driver must
/// not be shared between threads without an external lock.
///
/// Dropping an open driver puts the chip to sleep. Call [`Pca9685::close`]
/// to do the same and see the result.
pub struct Pca9685<T: I2cTransport, D: Delay = StdDelay> {
    bus: T,
    delay: D,
    address: u8,
    limits: PositionLimits,
    armed: bool,
}

impl<T: I2cTransport> Pca9685<T, StdDelay> {
    pub fn open(bus: T, address: u8) -> Result<Pca9685<T, StdDelay>, Error<T::Error>> {
        Pca9685::open_with(bus, StdDelay, address, PositionLimits::default())
    }
}

impl Pca9685<LinuxI2cBus, StdDelay> {
    /// Opens the configured `/dev/i2c-N` bus and brings the chip up.
    pub fn open_linux(
        config: &DriverConfig,
    ) -> Result<Pca9685<LinuxI2cBus, StdDelay>, Error<LinuxI2CError>> {
        if config.address > MAX_ADDRESS {
            return Err(Error::InvalidAddress(config.address));
        }
        let bus = LinuxI2cBus::open(&config.bus, config.address).map_err(Error::Transport)?;
        Pca9685::open_with(bus, StdDelay, config.address, config.limits)
    }
}

impl<T: I2cTransport, D: Delay> Pca9685<T, D> {
    pub fn open_with(
        bus: T,
        delay: D,
        address: u8,
        limits: PositionLimits,
    ) -> Result<Pca9685<T, D>, Error<T::Error>> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidAddress(address));
        }

        let mut pca9685 = Pca9685 {
            bus,
            delay,
            address,
            limits,
            armed: false,
        };
        pca9685.bring_up()?;
        pca9685.armed = true;

        info!("pca9685 at {:#04x} ready", address);
        Ok(pca9685)
    }

    // Order follows the datasheet: prescale can only be written while asleep.
    fn bring_up(&mut self) -> Result<(), Error<T::Error>> {
        self.write_register(Register::PreScale.addr(), PRESCALE)?;
        self.clear_register_bit(Register::Mode1.addr(), Mode1Bit::AllCall.offset())?;

        let start = u32::from(PULSE_START);
        self.write_register(Register::AllOnLow.addr(), get_byte(start, 0))?;
        self.write_register(Register::AllOnHigh.addr(), get_byte(start, 1))?;

        let center = u32::from(PULSE_END_CENTER);
        self.write_register(Register::AllOffLow.addr(), get_byte(center, 0))?;
        self.write_register(Register::AllOffHigh.addr(), get_byte(center, 1))?;

        self.wake()
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn limits(&self) -> PositionLimits {
        self.limits
    }

    /// Moves the servo on `channel` by changing only the off-edge of its pulse.
    pub fn set_position(&mut self, channel: u8, position: u16) -> Result<(), Error<T::Error>> {
        let off_low = channel_register(ChannelRegister::OffLow, channel)?;
        let off_high = channel_register(ChannelRegister::OffHigh, channel)?;
        if !self.limits.contains(position) {
            return Err(Error::InvalidPosition {
                position,
                min: self.limits.min(),
                max: self.limits.max(),
            });
        }

        let tick = position_to_tick(position);
        debug!(channel, position, tick, "set position");

        let tick = u32::from(tick);
        self.write_register(off_low, get_byte(tick, 0))?;
        self.write_register(off_high, get_byte(tick, 1))
    }

    /// Reads back the off-tick currently programmed for `channel`.
    pub fn off_tick(&mut self, channel: u8) -> Result<u16, Error<T::Error>> {
        let off_low = channel_register(ChannelRegister::OffLow, channel)?;
        let off_high = channel_register(ChannelRegister::OffHigh, channel)?;

        let low = self.read_register(off_low)?;
        let high = self.read_register(off_high)?;
        Ok(u16::from(high & 0x0F) << 8 | u16::from(low))
    }

    pub fn is_sleeping(&mut self) -> Result<bool, Error<T::Error>> {
        self.register_bit(Register::Mode1.addr(), Mode1Bit::Sleep.offset())
    }

    /// Stops the oscillator. Outputs stop driving until [`Pca9685::wake`].
    pub fn sleep(&mut self) -> Result<(), Error<T::Error>> {
        self.set_register_bit(Register::Mode1.addr(), Mode1Bit::Sleep.offset())
    }

    /// Restarts the oscillator and resumes the PWM channels.
    pub fn wake(&mut self) -> Result<(), Error<T::Error>> {
        self.clear_register_bit(Register::Mode1.addr(), Mode1Bit::Sleep.offset())?;
        self.delay.delay_ms(SETTLE_MS);
        self.set_register_bit(Register::Mode1.addr(), Mode1Bit::Restart.offset())?;
        self.delay.delay_ms(SETTLE_MS);
        Ok(())
    }

    /// Puts the chip to sleep and releases the bus.
    pub fn close(mut self) -> Result<(), Error<T::Error>> {
        self.armed = false;
        self.sleep()?;
        info!("pca9685 at {:#04x} put to sleep", self.address);
        Ok(())
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<T::Error>> {
        trace!(address = self.address, register, value, "write register");
        self.bus
            .write(self.address, &[register, value])
            .map_err(Error::Transport)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Error<T::Error>> {
        let bytes = self
            .bus
            .write_then_read(self.address, &[register], 1)
            .map_err(Error::Transport)?;
        let value = bytes
            .first()
            .copied()
            .ok_or(Error::ShortRead { register })?;
        trace!(address = self.address, register, value, "read register");
        Ok(value)
    }

    fn register_bit(&mut self, register: u8, bit: u32) -> Result<bool, Error<T::Error>> {
        let value = self.read_register(register)?;
        Ok(test_bit(u32::from(value), bit))
    }

    fn set_register_bit(&mut self, register: u8, bit: u32) -> Result<(), Error<T::Error>> {
        let value = self.read_register(register)?;
        self.write_register(register, set_bit(u32::from(value), bit) as u8)
    }

    fn clear_register_bit(&mut self, register: u8, bit: u32) -> Result<(), Error<T::Error>> {
        let value = self.read_register(register)?;
        self.write_register(register, clear_bit(u32::from(value), bit) as u8)
    }
}

impl<T: I2cTransport, D: Delay> Drop for Pca9685<T, D> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        if let Err(err) = self.sleep() {
            warn!("could not put pca9685 at {:#04x} to sleep: {:?}", self.address, err);
        }
    }
}
