//! High-level per-board sessions.
//!
//! Each session owns its transport and a local cache of the board's
//! values. `update()` runs one blocking write-then-read exchange per
//! sub-field; SET operations are fire-and-forget (the board sends no
//! acknowledgment) and update the cache optimistically.

use crate::protocol::{board1, board2};
use crate::transport::Transport;
use crate::Error;
use std::time::Duration;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Session for Board #1, the air conditioner.
#[derive(Debug)]
pub struct AirConditioner<T: Transport> {
    transport: T,
    timeout: Duration,
    desired_temperature: f64,
    ambient_temperature: f64,
    fan_speed: u8,
}

impl<T: Transport> AirConditioner<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_READ_TIMEOUT,
            desired_temperature: 0.0,
            ambient_temperature: 0.0,
            fan_speed: 0,
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn open(&mut self) -> std::result::Result<(), Error> {
        self.transport.open()
    }

    pub fn close(&mut self) {
        self.transport.close()
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    fn request(&mut self, cmd: u8) -> std::result::Result<u8, Error> {
        self.transport.write_byte(cmd)?;
        let resp = self.transport.read_byte(self.timeout)?;
        log::trace!("Board1 CMD=0x{:02X} -> RESP=0x{:02X}", cmd, resp);
        Ok(resp)
    }

    /// Reads all Board #1 values and refreshes the local cache.
    ///
    /// On a timeout the cache is left as it was; the caller may simply
    /// try again later.
    pub fn update(&mut self) -> std::result::Result<(), Error> {
        let mut st = board1::AirState::default();

        for cmd in [
            board1::GET_DESIRED_TEMP_LOW,
            board1::GET_DESIRED_TEMP_HIGH,
            board1::GET_AMBIENT_TEMP_LOW,
            board1::GET_AMBIENT_TEMP_HIGH,
            board1::GET_FAN_SPEED_RPS,
        ] {
            let data = self.request(cmd)?;
            board1::decode_get_response(cmd, data, &mut st);
        }

        self.desired_temperature = st.desired_temp.value();
        self.ambient_temperature = st.ambient_temp.value();
        self.fan_speed = st.fan_speed_rps;
        Ok(())
    }

    /// Sets the desired temperature (10.0..=50.0 degrees Celsius).
    ///
    /// Writes the fractional byte first, then the integral byte. No
    /// response is read back; the cache is updated optimistically.
    pub fn set_desired_temperature(&mut self, temp_c: f64) -> std::result::Result<(), Error> {
        let (low_cmd, high_cmd) = board1::encode_set_desired_temp(temp_c)?;
        self.transport.write_byte(low_cmd)?;
        self.transport.write_byte(high_cmd)?;
        self.desired_temperature = (temp_c * 10.0).round() / 10.0;
        Ok(())
    }

    /// Last read (or optimistically set) desired temperature.
    pub fn desired_temperature(&self) -> f64 {
        self.desired_temperature
    }

    /// Last read ambient temperature.
    pub fn ambient_temperature(&self) -> f64 {
        self.ambient_temperature
    }

    /// Last read fan speed in revolutions per second.
    pub fn fan_speed(&self) -> u8 {
        self.fan_speed
    }
}

/// Session for Board #2, the curtain and outdoor sensors.
#[derive(Debug)]
pub struct CurtainControl<T: Transport> {
    transport: T,
    timeout: Duration,
    curtain_status: f64,
    outdoor_temperature: f64,
    outdoor_pressure: f64,
    light_intensity: f64,
    light_high_cmd: u8,
    set_mode: board2::CurtainSetMode,
}

impl<T: Transport> CurtainControl<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_READ_TIMEOUT,
            curtain_status: 0.0,
            outdoor_temperature: 0.0,
            outdoor_pressure: 0.0,
            light_intensity: 0.0,
            light_high_cmd: board2::GET_LIGHT_INTENSITY_HIGH_DEFAULT,
            set_mode: board2::CurtainSetMode::default(),
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Command ID to use for the light intensity integral GET. The
    /// deployed firmware revisions disagree on this ID, so it stays
    /// configurable per session.
    pub fn set_light_high_cmd(&mut self, cmd: u8) {
        self.light_high_cmd = cmd;
    }

    /// Selects how curtain setpoints are interpreted (percent or raw
    /// device units). Also affects how `update()` reports the position.
    pub fn set_curtain_mode(&mut self, mode: board2::CurtainSetMode) {
        self.set_mode = mode;
    }

    pub fn open(&mut self) -> std::result::Result<(), Error> {
        self.transport.open()
    }

    pub fn close(&mut self) {
        self.transport.close()
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    fn request(&mut self, cmd: u8) -> std::result::Result<u8, Error> {
        self.transport.write_byte(cmd)?;
        let resp = self.transport.read_byte(self.timeout)?;
        log::trace!("Board2 CMD=0x{:02X} -> RESP=0x{:02X}", cmd, resp);
        Ok(resp)
    }

    /// Reads all Board #2 values and refreshes the local cache.
    pub fn update(&mut self) -> std::result::Result<(), Error> {
        let mut st = board2::CurtainState::default();
        let light_high_cmd = self.light_high_cmd;

        for cmd in [
            board2::GET_DESIRED_CURTAIN_LOW,
            board2::GET_DESIRED_CURTAIN_HIGH,
            board2::GET_OUTDOOR_TEMP_LOW,
            board2::GET_OUTDOOR_TEMP_HIGH,
            board2::GET_OUTDOOR_PRESS_LOW,
            board2::GET_OUTDOOR_PRESS_HIGH,
            board2::GET_LIGHT_INTENSITY_LOW,
            light_high_cmd,
        ] {
            let data = self.request(cmd)?;
            board2::decode_get_response(cmd, data, &mut st, light_high_cmd);
        }

        let raw = st.desired_curtain.value();
        self.curtain_status = match self.set_mode {
            // The board reports raw 0-63 units; convert back to the
            // user-facing percentage.
            board2::CurtainSetMode::Scaled => {
                (raw / board2::MAX_CURTAIN_RAW * 100.0 * 10.0).round() / 10.0
            }
            board2::CurtainSetMode::Raw => (raw * 10.0).round() / 10.0,
        };
        self.outdoor_temperature = st.outdoor_temp.value();
        self.outdoor_pressure = st.outdoor_press.value();
        self.light_intensity = st.light_intensity.value();
        Ok(())
    }

    /// Sets the desired curtain position, interpreted according to the
    /// configured [`board2::CurtainSetMode`].
    ///
    /// Writes the fractional byte first, then the integral byte. No
    /// response is read back; the cache is updated optimistically.
    pub fn set_curtain_status(&mut self, value: f64) -> std::result::Result<(), Error> {
        let (low_cmd, high_cmd) = board2::encode_set_desired_curtain(value, self.set_mode)?;
        self.transport.write_byte(low_cmd)?;
        self.transport.write_byte(high_cmd)?;
        self.curtain_status = (value * 10.0).round() / 10.0;
        Ok(())
    }

    /// Last read (or optimistically set) curtain position, in percent
    /// for scaled mode or raw device units for raw mode.
    pub fn curtain_status(&self) -> f64 {
        self.curtain_status
    }

    /// Last read outdoor temperature.
    pub fn outdoor_temperature(&self) -> f64 {
        self.outdoor_temperature
    }

    /// Last read outdoor pressure.
    pub fn outdoor_pressure(&self) -> f64 {
        self.outdoor_pressure
    }

    /// Last read light intensity.
    pub fn light_intensity(&self) -> f64 {
        self.light_intensity
    }
}
