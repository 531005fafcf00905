use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::pca9685::position_to_tick;

pub const DEFAULT_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_PCA9685_ADDRESS: u8 = 0x40;

const MAX_TICK: u16 = 4095;

/// Accepted servo positions, both bounds exclusive.
///
/// Nominal servos take 1000..2000; anything else inside the limits is
/// extrapolated past the end ticks ("overscan"). The default upper bound
/// of 3000 is a policy choice, not a property of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLimits")]
pub struct PositionLimits {
    min: u16,
    max: u16,
}

#[derive(Deserialize)]
struct RawLimits {
    min: u16,
    max: u16,
}

impl PositionLimits {
    pub fn new(min: u16, max: u16) -> Result<PositionLimits, ConfigError> {
        let invalid = |reason| ConfigError::InvalidLimits { min, max, reason };
        if min >= max {
            return Err(invalid("min must be below max"));
        }
        if position_to_tick(max - 1) > MAX_TICK {
            return Err(invalid("max overflows the 12-bit pulse counter"));
        }
        Ok(PositionLimits { min, max })
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn contains(&self, position: u16) -> bool {
        position > self.min && position < self.max
    }
}

impl Default for PositionLimits {
    fn default() -> Self {
        PositionLimits { min: 0, max: 3000 }
    }
}

impl TryFrom<RawLimits> for PositionLimits {
    type Error = ConfigError;

    fn try_from(raw: RawLimits) -> Result<Self, Self::Error> {
        PositionLimits::new(raw.min, raw.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub bus: String,
    pub address: u8,
    pub limits: PositionLimits,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            bus: DEFAULT_BUS.to_string(),
            address: DEFAULT_PCA9685_ADDRESS,
            limits: PositionLimits::default(),
        }
    }
}

impl DriverConfig {
    pub fn from_json(json: &str) -> Result<DriverConfig, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<DriverConfig, ConfigError> {
        let json = fs::read_to_string(path)?;
        DriverConfig::from_json(&json)
    }
}
