use std::io;

use thiserror::Error;

/// A channel number outside `[0, 15]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("channel {0} must be in the range [0 .. 15]")]
pub struct InvalidChannel(pub u8);

/// Errors returned by the driver. `E` is the error type of the I2C transport.
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("channel {0} must be in the range [0 .. 15]")]
    InvalidChannel(u8),

    #[error("position {position} must be in the range ({min} .. {max})")]
    InvalidPosition { position: u16, min: u16, max: u16 },

    #[error("i2c address {0:#04x} is not a 7-bit address")]
    InvalidAddress(u8),

    #[error("register {register:#04x} read returned no data")]
    ShortRead { register: u8 },

    #[error("i2c transport error: {0:?}")]
    Transport(E),
}

impl<E> From<InvalidChannel> for Error<E> {
    fn from(err: InvalidChannel) -> Self {
        Error::InvalidChannel(err.0)
    }
}

impl<E> Error<E> {
    /// `true` for errors raised by argument checks, before touching the bus.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::InvalidChannel(_) | Error::InvalidPosition { .. } | Error::InvalidAddress(_) => {
                true
            }
            Error::ShortRead { .. } | Error::Transport(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] io::Error),

    #[error("could not parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid position limits ({min} .. {max}): {reason}")]
    InvalidLimits {
        min: u16,
        max: u16,
        reason: &'static str,
    },
}
