//! UART command set for Board #2, the curtain and outdoor sensor
//! controller.
//!
//! Four quantities, each split over two GET commands (fractional digit
//! and integer part): the desired curtain position, outdoor temperature,
//! outdoor pressure and light intensity. The curtain position is the only
//! settable field; it uses the board's native 0-63 actuator range on the
//! wire, optionally scaled from a user-facing 0-100 percent value.

use crate::protocol::{make_set_high, make_set_low, Fixed1dp};
use crate::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Get fractional part of the desired curtain position.
pub const GET_DESIRED_CURTAIN_LOW: u8 = 0x01;
/// Get integral part of the desired curtain position.
pub const GET_DESIRED_CURTAIN_HIGH: u8 = 0x02;
/// Get fractional part of the outdoor temperature.
pub const GET_OUTDOOR_TEMP_LOW: u8 = 0x03;
/// Get integral part of the outdoor temperature.
pub const GET_OUTDOOR_TEMP_HIGH: u8 = 0x04;
/// Get fractional part of the outdoor pressure.
pub const GET_OUTDOOR_PRESS_LOW: u8 = 0x05;
/// Get integral part of the outdoor pressure.
pub const GET_OUTDOOR_PRESS_HIGH: u8 = 0x06;
/// Get fractional part of the light intensity.
pub const GET_LIGHT_INTENSITY_LOW: u8 = 0x07;
/// Get integral part of the light intensity.
pub const GET_LIGHT_INTENSITY_HIGH: u8 = 0x08;

/// Default command ID for the light intensity integral part. Deployed
/// firmware revisions disagree on this ID, so sessions keep it as a
/// runtime parameter and the decoder accepts the configured ID as well as
/// this default.
pub const GET_LIGHT_INTENSITY_HIGH_DEFAULT: u8 = 0x08;

pub const MAX_CURTAIN_RAW: f64 = 63.0;
pub const MAX_CURTAIN_PERCENT: f64 = 100.0;

/// How a curtain setpoint supplied by the caller maps onto the board's
/// native 0-63 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurtainSetMode {
    /// Input is a percentage 0-100, scaled onto 0-63 before encoding.
    #[default]
    Scaled,
    /// Input is taken directly as the board's native 0-63 unit.
    Raw,
}

/// State record for Board #2, filled in field-by-field as GET responses
/// arrive. The curtain position is kept in raw device units here;
/// percentage conversion happens in the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurtainState {
    pub desired_curtain: Fixed1dp,
    pub outdoor_temp: Fixed1dp,
    pub outdoor_press: Fixed1dp,
    pub light_intensity: Fixed1dp,
}

impl Default for CurtainState {
    fn default() -> Self {
        Self {
            desired_curtain: Fixed1dp::new(50, 0),
            outdoor_temp: Fixed1dp::new(20, 0),
            outdoor_press: Fixed1dp::new(1013, 0),
            light_intensity: Fixed1dp::new(300, 0),
        }
    }
}

/// Encodes the two SET command bytes for a new curtain setpoint.
///
/// In [`CurtainSetMode::Scaled`] the input is a 0-100 percentage mapped
/// onto the device range with `round(value / 100 * 63, 1)`. In
/// [`CurtainSetMode::Raw`] the input is used as-is after rounding to one
/// decimal place and must already lie in 0.0..=63.0. Returns
/// `(low_byte, high_byte)`; the low byte must be written first.
pub fn encode_set_desired_curtain(
    value: f64,
    mode: CurtainSetMode,
) -> std::result::Result<(u8, u8), Error> {
    let raw = match mode {
        CurtainSetMode::Raw => {
            let v = (value * 10.0).round() / 10.0;
            if !(0.0..=MAX_CURTAIN_RAW).contains(&v) {
                return Err(Error::Range {
                    quantity: "curtain raw value",
                    value: v,
                    min: 0.0,
                    max: MAX_CURTAIN_RAW,
                });
            }
            v
        }
        CurtainSetMode::Scaled => {
            if !(0.0..=MAX_CURTAIN_PERCENT).contains(&value) {
                return Err(Error::Range {
                    quantity: "curtain percent",
                    value,
                    min: 0.0,
                    max: MAX_CURTAIN_PERCENT,
                });
            }
            // Map 0-100% onto the 0-63 device range, keeping the one
            // decimal place of precision the wire format carries.
            (value / 100.0 * MAX_CURTAIN_RAW * 10.0).round() / 10.0
        }
    };

    let fixed = Fixed1dp::from_value(raw)?;
    Ok((make_set_low(fixed.frac_digit)?, make_set_high(fixed.integral)?))
}

/// Writes a single GET response byte into the matching field of `state`.
///
/// The light intensity integral field is matched against both the
/// session-configured `light_high_cmd` and the documented default, so a
/// firmware that drifted from the PC-side configuration still decodes.
/// Unknown command IDs are ignored.
pub fn decode_get_response(cmd: u8, data_byte: u8, state: &mut CurtainState, light_high_cmd: u8) {
    match cmd {
        GET_DESIRED_CURTAIN_LOW => state.desired_curtain.frac_digit = data_byte,
        GET_DESIRED_CURTAIN_HIGH => state.desired_curtain.integral = u16::from(data_byte),
        GET_OUTDOOR_TEMP_LOW => state.outdoor_temp.frac_digit = data_byte,
        GET_OUTDOOR_TEMP_HIGH => state.outdoor_temp.integral = u16::from(data_byte),
        GET_OUTDOOR_PRESS_LOW => state.outdoor_press.frac_digit = data_byte,
        GET_OUTDOOR_PRESS_HIGH => state.outdoor_press.integral = u16::from(data_byte),
        GET_LIGHT_INTENSITY_LOW => state.light_intensity.frac_digit = data_byte,
        c if c == light_high_cmd || c == GET_LIGHT_INTENSITY_HIGH => {
            state.light_intensity.integral = u16::from(data_byte)
        }
        _ => log::trace!("Board2: ignoring unknown command ID 0x{:02X}", cmd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PAYLOAD_MASK_6BIT;

    #[test]
    fn scaled_range_ok() {
        for pct in [0.0, 12.3, 50.0, 100.0] {
            let (low, high) = encode_set_desired_curtain(pct, CurtainSetMode::Scaled).unwrap();
            assert_eq!(low & 0b1100_0000, 0b1000_0000, "low prefix for {pct}");
            assert_eq!(high & 0b1100_0000, 0b1100_0000, "high prefix for {pct}");
            assert!(low & PAYLOAD_MASK_6BIT <= 63);
            assert!(high & PAYLOAD_MASK_6BIT <= 63);
        }

        // Fully closed maps to 0.0, fully open to the device maximum.
        let (low0, high0) = encode_set_desired_curtain(0.0, CurtainSetMode::Scaled).unwrap();
        assert_eq!(low0 & PAYLOAD_MASK_6BIT, 0);
        assert_eq!(high0 & PAYLOAD_MASK_6BIT, 0);

        let (low100, high100) = encode_set_desired_curtain(100.0, CurtainSetMode::Scaled).unwrap();
        assert_eq!(low100 & PAYLOAD_MASK_6BIT, 0);
        assert_eq!(high100 & PAYLOAD_MASK_6BIT, 63);
    }

    #[test]
    fn scaled_range_rejected() {
        for pct in [-1.0, 100.1, 1000.0] {
            assert!(
                matches!(
                    encode_set_desired_curtain(pct, CurtainSetMode::Scaled),
                    Err(Error::Range { .. })
                ),
                "expected range error for {pct}"
            );
        }
    }

    #[test]
    fn raw_range_ok_and_rejected() {
        let (_, high) = encode_set_desired_curtain(63.0, CurtainSetMode::Raw).unwrap();
        assert_eq!(high & PAYLOAD_MASK_6BIT, 63);

        for v in [-1.0, 63.1, 80.0] {
            assert!(
                matches!(
                    encode_set_desired_curtain(v, CurtainSetMode::Raw),
                    Err(Error::Range { .. })
                ),
                "expected range error for {v}"
            );
        }
    }

    #[test]
    fn decode_fills_all_quantities() {
        let mut state = CurtainState::default();
        decode_get_response(GET_DESIRED_CURTAIN_LOW, 0, &mut state, 0x08);
        decode_get_response(GET_DESIRED_CURTAIN_HIGH, 32, &mut state, 0x08);
        decode_get_response(GET_OUTDOOR_TEMP_LOW, 5, &mut state, 0x08);
        decode_get_response(GET_OUTDOOR_TEMP_HIGH, 19, &mut state, 0x08);
        decode_get_response(GET_OUTDOOR_PRESS_LOW, 3, &mut state, 0x08);
        decode_get_response(GET_OUTDOOR_PRESS_HIGH, 101, &mut state, 0x08);
        decode_get_response(GET_LIGHT_INTENSITY_LOW, 0, &mut state, 0x08);
        decode_get_response(GET_LIGHT_INTENSITY_HIGH, 200, &mut state, 0x08);

        assert!((state.desired_curtain.value() - 32.0).abs() < 1e-9);
        assert!((state.outdoor_temp.value() - 19.5).abs() < 1e-9);
        assert!((state.outdoor_press.value() - 101.3).abs() < 1e-9);
        assert!((state.light_intensity.value() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn light_high_accepts_configured_and_default_id() {
        // Session configured for a firmware that answers on 0x0A.
        let mut state = CurtainState::default();
        decode_get_response(0x0A, 150, &mut state, 0x0A);
        assert_eq!(state.light_intensity.integral, 150);

        // The documented default keeps working even with drifted config.
        decode_get_response(GET_LIGHT_INTENSITY_HIGH_DEFAULT, 42, &mut state, 0x0A);
        assert_eq!(state.light_intensity.integral, 42);
    }

    #[test]
    fn unknown_command_is_a_no_op() {
        let mut state = CurtainState::default();
        let before = state.clone();
        decode_get_response(0x3F, 0xAB, &mut state, 0x08);
        assert_eq!(state, before);
    }
}
