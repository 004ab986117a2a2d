use crate::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Protocol tables for Board #1 (air conditioner).
pub mod board1;
/// Protocol tables for Board #2 (curtain and outdoor sensors).
pub mod board2;

// SET commands carry their role in the top two bits of the byte:
// low/fractional byte is 10xxxxxx, high/integral byte is 11xxxxxx.
// GET command IDs are plain small integers (0x01..) and never collide
// with the tagged space.
pub const SET_LOW_PREFIX: u8 = 0b10 << 6; // 0x80
pub const SET_HIGH_PREFIX: u8 = 0b11 << 6; // 0xC0

/// The lower 6 bits of a SET byte carry the data (0-63).
pub const PAYLOAD_MASK_6BIT: u8 = 0b0011_1111;

/// Splits a non-negative value into its integer part and first decimal
/// digit. Example: `29.5` -> `(29, 5)`.
///
/// The value is rounded half-up to one decimal place first. If rounding
/// pushes the fractional digit to 10, the carry propagates into the
/// integer part.
pub fn split_1dp(value: f64) -> std::result::Result<(u16, u8), Error> {
    if value < 0.0 {
        return Err(Error::Domain(value));
    }
    let rounded = (value * 10.0).round() / 10.0;
    if rounded > f64::from(u16::MAX) {
        return Err(Error::Range {
            quantity: "integer part",
            value: rounded,
            min: 0.0,
            max: f64::from(u16::MAX),
        });
    }

    let mut integral = rounded.trunc() as u16;
    let mut frac_digit = ((rounded - rounded.trunc()) * 10.0).round() as u8;

    // Rounding the residue can itself overflow to 10, carry into the
    // integer part in that case.
    if frac_digit == 10 {
        integral += 1;
        frac_digit = 0;
    }

    Ok((integral, frac_digit))
}

/// Combines integer part and fractional digit back into a value.
/// Exact inverse of [`split_1dp`] for everything `split_1dp` produces.
pub fn join_1dp(integral: u16, frac_digit: u8) -> f64 {
    f64::from(integral) + f64::from(frac_digit) / 10.0
}

/// Creates the "set low byte" command: `10xxxxxx` with the fractional
/// digit in the payload bits.
pub fn make_set_low(frac_digit: u8) -> std::result::Result<u8, Error> {
    if frac_digit > PAYLOAD_MASK_6BIT {
        return Err(Error::Range {
            quantity: "6-bit payload",
            value: f64::from(frac_digit),
            min: 0.0,
            max: 63.0,
        });
    }
    Ok(SET_LOW_PREFIX | (frac_digit & PAYLOAD_MASK_6BIT))
}

/// Creates the "set high byte" command: `11xxxxxx` with the integer part
/// in the payload bits.
pub fn make_set_high(integral: u16) -> std::result::Result<u8, Error> {
    if integral > u16::from(PAYLOAD_MASK_6BIT) {
        return Err(Error::Range {
            quantity: "6-bit payload",
            value: f64::from(integral),
            min: 0.0,
            max: 63.0,
        });
    }
    Ok(SET_HIGH_PREFIX | (integral as u8 & PAYLOAD_MASK_6BIT))
}

/// A one-decimal-place fixed-point number stored as separate integer and
/// fractional parts, matching the split-byte wire format. The two halves
/// travel in separate bytes, so decoding fills them in independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fixed1dp {
    pub integral: u16,
    pub frac_digit: u8,
}

impl Fixed1dp {
    pub const fn new(integral: u16, frac_digit: u8) -> Self {
        Self {
            integral,
            frac_digit,
        }
    }

    pub fn from_value(value: f64) -> std::result::Result<Self, Error> {
        let (integral, frac_digit) = split_1dp(value)?;
        Ok(Self {
            integral,
            frac_digit,
        })
    }

    pub fn value(&self) -> f64 {
        join_1dp(self.integral, self.frac_digit)
    }
}
