//! In-memory simulation of the two boards.
//!
//! [`SimulatedTransport`] is a drop-in [`Transport`] implementation that
//! answers GET bytes immediately from its own state record and applies
//! SET bytes by their role tag, so the PC-side stack can be exercised
//! without hardware. One instance simulates exactly one board.

use std::collections::VecDeque;
use std::time::Duration;

use crate::protocol::{board1, board2, join_1dp, Fixed1dp, PAYLOAD_MASK_6BIT, SET_HIGH_PREFIX, SET_LOW_PREFIX};
use crate::transport::Transport;
use crate::Error;

const TAG_MASK: u8 = 0b1100_0000;

/// Fan speed the simulated air conditioner reports while heating.
const SIM_FAN_ON_RPS: u8 = 30;

/// Which board a [`SimulatedTransport`] instance stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedBoard {
    AirConditioner,
    Curtain,
}

#[derive(Debug)]
pub struct SimulatedTransport {
    board: SimulatedBoard,
    light_high_cmd: u8,
    open: bool,
    rx_queue: VecDeque<u8>,
    air_state: board1::AirState,
    curtain_state: board2::CurtainState,
}

impl SimulatedTransport {
    pub fn new(board: SimulatedBoard) -> Self {
        Self {
            board,
            light_high_cmd: board2::GET_LIGHT_INTENSITY_HIGH_DEFAULT,
            open: false,
            rx_queue: VecDeque::new(),
            // Seed values small enough to survive the byte-per-field
            // wire format: curtain about half open, 20.0 C, 101.3 hPa,
            // 200.0 lux.
            air_state: board1::AirState::default(),
            curtain_state: board2::CurtainState {
                desired_curtain: Fixed1dp::new(32, 0),
                outdoor_temp: Fixed1dp::new(20, 0),
                outdoor_press: Fixed1dp::new(101, 3),
                light_intensity: Fixed1dp::new(200, 0),
            },
        }
    }

    /// Command ID this simulated firmware answers for the light
    /// intensity integral part.
    pub fn set_light_high_cmd(&mut self, cmd: u8) {
        self.light_high_cmd = cmd;
    }

    pub fn air_state(&self) -> &board1::AirState {
        &self.air_state
    }

    pub fn curtain_state(&self) -> &board2::CurtainState {
        &self.curtain_state
    }

    fn handle_board1(&mut self, cmd: u8) {
        let st = &mut self.air_state;
        match cmd {
            board1::GET_DESIRED_TEMP_LOW => self.rx_queue.push_back(st.desired_temp.frac_digit),
            board1::GET_DESIRED_TEMP_HIGH => {
                self.rx_queue.push_back(st.desired_temp.integral as u8)
            }
            board1::GET_AMBIENT_TEMP_LOW => self.rx_queue.push_back(st.ambient_temp.frac_digit),
            board1::GET_AMBIENT_TEMP_HIGH => {
                self.rx_queue.push_back(st.ambient_temp.integral as u8)
            }
            board1::GET_FAN_SPEED_RPS => self.rx_queue.push_back(st.fan_speed_rps),
            c if c & TAG_MASK == SET_LOW_PREFIX => {
                st.desired_temp.frac_digit = c & PAYLOAD_MASK_6BIT;
            }
            c if c & TAG_MASK == SET_HIGH_PREFIX => {
                st.desired_temp.integral = u16::from(c & PAYLOAD_MASK_6BIT);

                // The firmware runs the fan whenever heating is needed.
                let desired = join_1dp(st.desired_temp.integral, st.desired_temp.frac_digit);
                let ambient = join_1dp(st.ambient_temp.integral, st.ambient_temp.frac_digit);
                st.fan_speed_rps = if desired > ambient { SIM_FAN_ON_RPS } else { 0 };
            }
            _ => log::trace!("Simulated board1: ignoring command 0x{:02X}", cmd),
        }
    }

    fn handle_board2(&mut self, cmd: u8) {
        let st = &mut self.curtain_state;
        match cmd {
            board2::GET_DESIRED_CURTAIN_LOW => {
                self.rx_queue.push_back(st.desired_curtain.frac_digit)
            }
            board2::GET_DESIRED_CURTAIN_HIGH => {
                self.rx_queue.push_back(st.desired_curtain.integral as u8)
            }
            board2::GET_OUTDOOR_TEMP_LOW => self.rx_queue.push_back(st.outdoor_temp.frac_digit),
            board2::GET_OUTDOOR_TEMP_HIGH => {
                self.rx_queue.push_back(st.outdoor_temp.integral as u8)
            }
            board2::GET_OUTDOOR_PRESS_LOW => self.rx_queue.push_back(st.outdoor_press.frac_digit),
            board2::GET_OUTDOOR_PRESS_HIGH => {
                self.rx_queue.push_back(st.outdoor_press.integral as u8)
            }
            board2::GET_LIGHT_INTENSITY_LOW => {
                self.rx_queue.push_back(st.light_intensity.frac_digit)
            }
            c if c == self.light_high_cmd || c == board2::GET_LIGHT_INTENSITY_HIGH => {
                self.rx_queue.push_back(st.light_intensity.integral as u8)
            }
            c if c & TAG_MASK == SET_LOW_PREFIX => {
                st.desired_curtain.frac_digit = c & PAYLOAD_MASK_6BIT;
            }
            c if c & TAG_MASK == SET_HIGH_PREFIX => {
                st.desired_curtain.integral = u16::from(c & PAYLOAD_MASK_6BIT);
            }
            _ => log::trace!("Simulated board2: ignoring command 0x{:02X}", cmd),
        }
    }
}

impl Transport for SimulatedTransport {
    fn open(&mut self) -> std::result::Result<(), Error> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        self.rx_queue.clear();
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write_byte(&mut self, b: u8) -> std::result::Result<(), Error> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        log::trace!("Simulated {:?}: received 0x{:02X}", self.board, b);
        match self.board {
            SimulatedBoard::AirConditioner => self.handle_board1(b),
            SimulatedBoard::Curtain => self.handle_board2(b),
        }
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Duration) -> std::result::Result<u8, Error> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        // GET responses are queued synchronously by write_byte, so there
        // is nothing to wait for: an empty queue means the last command
        // produced no response.
        self.rx_queue.pop_front().ok_or(Error::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_transport_rejects_io() {
        let mut sim = SimulatedTransport::new(SimulatedBoard::AirConditioner);
        assert!(!sim.is_open());
        assert!(matches!(sim.write_byte(0x01), Err(Error::NotOpen)));
        assert!(matches!(
            sim.read_byte(Duration::from_secs(1)),
            Err(Error::NotOpen)
        ));
    }

    #[test]
    fn get_answers_immediately() {
        let mut sim = SimulatedTransport::new(SimulatedBoard::AirConditioner);
        sim.open().unwrap();
        sim.write_byte(board1::GET_DESIRED_TEMP_HIGH).unwrap();
        assert_eq!(sim.read_byte(Duration::from_secs(1)).unwrap(), 25);
    }

    #[test]
    fn read_without_response_times_out() {
        let mut sim = SimulatedTransport::new(SimulatedBoard::Curtain);
        sim.open().unwrap();
        assert!(matches!(
            sim.read_byte(Duration::from_secs(1)),
            Err(Error::Timeout)
        ));
    }

    #[test]
    fn set_bytes_update_curtain_state() {
        let mut sim = SimulatedTransport::new(SimulatedBoard::Curtain);
        sim.open().unwrap();
        sim.write_byte(SET_LOW_PREFIX | 5).unwrap();
        sim.write_byte(SET_HIGH_PREFIX | 12).unwrap();
        assert_eq!(sim.curtain_state().desired_curtain, Fixed1dp::new(12, 5));
    }

    #[test]
    fn fan_turns_on_when_setpoint_above_ambient() {
        let mut sim = SimulatedTransport::new(SimulatedBoard::AirConditioner);
        sim.open().unwrap();
        // Ambient defaults to 24.0; request 30.0.
        sim.write_byte(SET_LOW_PREFIX).unwrap();
        sim.write_byte(SET_HIGH_PREFIX | 30).unwrap();
        assert_eq!(sim.air_state().fan_speed_rps, 30);
        // Request 20.0; fan stops.
        sim.write_byte(SET_LOW_PREFIX).unwrap();
        sim.write_byte(SET_HIGH_PREFIX | 20).unwrap();
        assert_eq!(sim.air_state().fan_speed_rps, 0);
    }

    #[test]
    fn close_discards_pending_responses() {
        let mut sim = SimulatedTransport::new(SimulatedBoard::Curtain);
        sim.open().unwrap();
        sim.write_byte(board2::GET_OUTDOOR_TEMP_HIGH).unwrap();
        sim.close();
        sim.open().unwrap();
        assert!(matches!(
            sim.read_byte(Duration::from_secs(1)),
            Err(Error::Timeout)
        ));
    }
}
