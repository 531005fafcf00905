//! PCA9685 register layout.

use crate::error::InvalidChannel;

pub const CHANNEL_COUNT: u8 = 16;

/// Oscillator frequency of the chip's internal clock.
pub const OSC_CLOCK_HZ: u32 = 25_000_000;

/// Ticks in one PWM period.
pub const PWM_TICKS: u32 = 4096;

/// Tick at which every channel's pulse starts.
pub const PULSE_START: u16 = 100;

/// Pulse end tick for position 1000.
pub const PULSE_END_LOW: u16 = 305;

/// Pulse end tick for position 2000.
pub const PULSE_END_HIGH: u16 = 509;

/// Off-tick written to all channels during bring-up.
pub const PULSE_END_CENTER: u16 = (PULSE_END_LOW + PULSE_END_HIGH) / 2;

pub const UPDATE_RATE_HZ: u32 = 50;

/// Prescale giving ~50 Hz, worked out at compile time.
pub const PRESCALE: u8 = prescale_for(UPDATE_RATE_HZ);

/// `round(25 MHz / (4096 * update_rate)) - 1`, saturated into a byte.
pub const fn prescale_for(update_rate_hz: u32) -> u8 {
    let divisor = match PWM_TICKS.checked_mul(update_rate_hz) {
        Some(0) => return u8::MAX,
        Some(divisor) => divisor,
        None => return 0,
    };
    let rounded = (OSC_CLOCK_HZ + divisor / 2) / divisor;
    if rounded == 0 {
        0
    } else if rounded - 1 > u8::MAX as u32 {
        u8::MAX
    } else {
        (rounded - 1) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Mode1 = 0x00,
    Mode2 = 0x01,
    SubAdr1 = 0x02,
    SubAdr2 = 0x03,
    SubAdr3 = 0x04,
    AllCallAdr = 0x05,
    AllOnLow = 0xFA,
    AllOnHigh = 0xFB,
    AllOffLow = 0xFC,
    AllOffHigh = 0xFD,
    PreScale = 0xFE,
    TestMode = 0xFF,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Bit offsets within `mode1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode1Bit {
    AllCall = 0,
    Sub3 = 1,
    Sub2 = 2,
    Sub1 = 3,
    Sleep = 4,
    AutoIncrement = 5,
    ExtClk = 6,
    Restart = 7,
}

impl Mode1Bit {
    pub const fn offset(self) -> u32 {
        self as u32
    }
}

/// Bit offsets within `mode2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode2Bit {
    OutNe0 = 0,
    OutNe1 = 1,
    OutDrv = 2,
    Och = 3,
    Invrt = 4,
}

impl Mode2Bit {
    pub const fn offset(self) -> u32 {
        self as u32
    }
}

const LED0_ON_L: u8 = 0x06;
const LED0_ON_H: u8 = 0x07;
const LED0_OFF_L: u8 = 0x08;
const LED0_OFF_H: u8 = 0x09;

const CHANNEL_STRIDE: u8 = 4;

/// One of the four per-channel pulse registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRegister {
    OnLow,
    OnHigh,
    OffLow,
    OffHigh,
}

impl ChannelRegister {
    pub const ALL: [ChannelRegister; 4] = [
        ChannelRegister::OnLow,
        ChannelRegister::OnHigh,
        ChannelRegister::OffLow,
        ChannelRegister::OffHigh,
    ];

    const fn base(self) -> u8 {
        match self {
            ChannelRegister::OnLow => LED0_ON_L,
            ChannelRegister::OnHigh => LED0_ON_H,
            ChannelRegister::OffLow => LED0_OFF_L,
            ChannelRegister::OffHigh => LED0_OFF_H,
        }
    }
}

pub fn check_channel(channel: u8) -> Result<u8, InvalidChannel> {
    if channel < CHANNEL_COUNT {
        Ok(channel)
    } else {
        Err(InvalidChannel(channel))
    }
}

/// Address of `kind` for `channel`.
pub fn channel_register(kind: ChannelRegister, channel: u8) -> Result<u8, InvalidChannel> {
    let channel = check_channel(channel)?;
    Ok(kind.base() + CHANNEL_STRIDE * channel)
}
