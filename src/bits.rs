//! Bit helpers used for read-modify-write on the chip registers.
//!
//! All of these are total: offsets past the width of the value simply
//! address nothing.

fn mask(offset: u32) -> u32 {
    1u32.checked_shl(offset).unwrap_or(0)
}

/// `true` if bit `offset` (0 = LSB) is set in `value`.
pub fn test_bit(value: u32, offset: u32) -> bool {
    value & mask(offset) != 0
}

pub fn set_bit(value: u32, offset: u32) -> u32 {
    value | mask(offset)
}

pub fn clear_bit(value: u32, offset: u32) -> u32 {
    value & !mask(offset)
}

/// The `n`-th byte of `value`, 0 being the least significant one.
pub fn get_byte(value: u32, n: u32) -> u8 {
    (value.checked_shr(8 * n).unwrap_or(0) & 0xFF) as u8
}
