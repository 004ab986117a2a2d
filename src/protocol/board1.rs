//! UART command set for Board #1, the air conditioner controller.
//!
//! The board exposes three quantities: the desired temperature setpoint,
//! the ambient temperature and the fan speed. Temperatures travel as two
//! separate bytes (fractional digit, then integer part), the fan speed as
//! one full byte.

use crate::protocol::{make_set_high, make_set_low, Fixed1dp, PAYLOAD_MASK_6BIT};
use crate::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Get fractional part of the desired temperature.
pub const GET_DESIRED_TEMP_LOW: u8 = 0x01;
/// Get integral part of the desired temperature.
pub const GET_DESIRED_TEMP_HIGH: u8 = 0x02;
/// Get fractional part of the ambient temperature.
pub const GET_AMBIENT_TEMP_LOW: u8 = 0x03;
/// Get integral part of the ambient temperature.
pub const GET_AMBIENT_TEMP_HIGH: u8 = 0x04;
/// Get fan speed in revolutions per second.
pub const GET_FAN_SPEED_RPS: u8 = 0x05;

pub const MIN_DESIRED_TEMP_C: f64 = 10.0;
pub const MAX_DESIRED_TEMP_C: f64 = 50.0;

/// State record for Board #1, filled in field-by-field as GET responses
/// arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AirState {
    pub desired_temp: Fixed1dp,
    pub ambient_temp: Fixed1dp,
    pub fan_speed_rps: u8,
}

impl Default for AirState {
    fn default() -> Self {
        Self {
            desired_temp: Fixed1dp::new(25, 0),
            ambient_temp: Fixed1dp::new(24, 0),
            fan_speed_rps: 0,
        }
    }
}

/// Encodes the two SET command bytes for a new desired temperature.
///
/// The value is rounded to one decimal place, then checked against the
/// 10.0..=50.0 degree limit of the board. Returns `(low_byte, high_byte)`;
/// the low byte must be written first.
pub fn encode_set_desired_temp(temp_c: f64) -> std::result::Result<(u8, u8), Error> {
    let temp_c = (temp_c * 10.0).round() / 10.0;

    if !(MIN_DESIRED_TEMP_C..=MAX_DESIRED_TEMP_C).contains(&temp_c) {
        return Err(Error::Range {
            quantity: "desired temperature",
            value: temp_c,
            min: MIN_DESIRED_TEMP_C,
            max: MAX_DESIRED_TEMP_C,
        });
    }

    let fixed = Fixed1dp::from_value(temp_c)?;
    Ok((make_set_low(fixed.frac_digit)?, make_set_high(fixed.integral)?))
}

/// Writes a single GET response byte into the matching field of `state`.
///
/// Temperature halves are bounded 0-63 on the wire and get masked to the
/// low 6 bits; the fan speed uses the full byte. Unknown command IDs are
/// ignored so that firmware additions do not break older PC software.
pub fn decode_get_response(cmd: u8, data_byte: u8, state: &mut AirState) {
    match cmd {
        GET_DESIRED_TEMP_LOW => state.desired_temp.frac_digit = data_byte & PAYLOAD_MASK_6BIT,
        GET_DESIRED_TEMP_HIGH => {
            state.desired_temp.integral = u16::from(data_byte & PAYLOAD_MASK_6BIT)
        }
        GET_AMBIENT_TEMP_LOW => state.ambient_temp.frac_digit = data_byte & PAYLOAD_MASK_6BIT,
        GET_AMBIENT_TEMP_HIGH => {
            state.ambient_temp.integral = u16::from(data_byte & PAYLOAD_MASK_6BIT)
        }
        GET_FAN_SPEED_RPS => state.fan_speed_rps = data_byte,
        _ => log::trace!("Board1: ignoring unknown command ID 0x{:02X}", cmd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_range_encodes() {
        for t in [10.0, 25.5, 50.0] {
            let (low, high) = encode_set_desired_temp(t).unwrap();
            assert_eq!(low & 0b1100_0000, 0b1000_0000, "low prefix for {t}");
            assert_eq!(high & 0b1100_0000, 0b1100_0000, "high prefix for {t}");
            assert!(low & PAYLOAD_MASK_6BIT <= 63);
            assert!(high & PAYLOAD_MASK_6BIT <= 63);
        }
    }

    #[test]
    fn invalid_range_rejected() {
        for t in [9.9, -5.0, 0.0, 50.1, 999.0] {
            assert!(
                matches!(encode_set_desired_temp(t), Err(Error::Range { .. })),
                "expected range error for {t}"
            );
        }
    }

    #[test]
    fn range_check_runs_after_rounding() {
        // 50.04 rounds down to 50.0 and is accepted, 50.06 rounds up to
        // 50.1 and is rejected.
        assert!(encode_set_desired_temp(50.04).is_ok());
        assert!(encode_set_desired_temp(50.06).is_err());
    }

    #[test]
    fn decode_assembles_desired_temperature() {
        let mut state = AirState::default();
        decode_get_response(GET_DESIRED_TEMP_LOW, 5, &mut state);
        decode_get_response(GET_DESIRED_TEMP_HIGH, 24, &mut state);
        assert!((state.desired_temp.value() - 24.5).abs() < 1e-9);
    }

    #[test]
    fn decode_masks_temperature_to_six_bits() {
        let mut state = AirState::default();
        decode_get_response(GET_AMBIENT_TEMP_HIGH, 0xFF, &mut state);
        assert_eq!(state.ambient_temp.integral, 63);
    }

    #[test]
    fn decode_fan_speed_uses_full_byte() {
        let mut state = AirState::default();
        decode_get_response(GET_FAN_SPEED_RPS, 0xFF, &mut state);
        assert_eq!(state.fan_speed_rps, 255);
    }

    #[test]
    fn unknown_command_is_a_no_op() {
        let mut state = AirState::default();
        let before = state.clone();
        decode_get_response(0x7F, 0xAB, &mut state);
        decode_get_response(0x00, 0x01, &mut state);
        assert_eq!(state, before);
    }
}
