//! Real UART transport over a serial device.
//!
//! Both boards talk 9600 baud, 8 data bits, no parity, one stop bit.

use crate::transport::Transport;
use crate::Error;
use std::io::{Read, Write};
use std::time::Duration;

pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// [`Transport`] implementation backed by the `serialport` crate.
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    serial: Option<Box<dyn serialport::SerialPort>>,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .field("baud_rate", &self.baud_rate)
            .field("open", &self.serial.is_some())
            .finish()
    }
}

impl SerialTransport {
    pub fn new(port_name: &str) -> Self {
        Self::with_baud_rate(port_name, DEFAULT_BAUD_RATE)
    }

    pub fn with_baud_rate(port_name: &str, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.to_string(),
            baud_rate,
            serial: None,
        }
    }

    /// Discards any bytes the board sent outside a request/response
    /// exchange, so the next read cannot pick up a stale data byte.
    fn drain_input(serial: &mut Box<dyn serialport::SerialPort>) -> std::result::Result<(), Error> {
        loop {
            let pending = serial.bytes_to_read().map_err(std::io::Error::from)?;
            if pending == 0 {
                return Ok(());
            }
            log::trace!("Got {} pending bytes", pending);
            let mut buf = vec![0; pending as usize];
            let received = serial.read(buf.as_mut_slice())?;
            log::trace!("Drained {} pending bytes: {:02X?}", received, &buf[..received]);
        }
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> std::result::Result<(), Error> {
        if self.serial.is_some() {
            return Ok(());
        }
        let serial = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(std::io::Error::from)?;
        self.serial = Some(serial);
        Ok(())
    }

    fn close(&mut self) {
        // Dropping the handle releases the device.
        self.serial = None;
    }

    fn is_open(&self) -> bool {
        self.serial.is_some()
    }

    fn write_byte(&mut self, b: u8) -> std::result::Result<(), Error> {
        let serial = self.serial.as_mut().ok_or(Error::NotOpen)?;
        Self::drain_input(serial)?;
        serial.write_all(&[b])?;
        log::trace!("write_byte: 0x{:02X}", b);
        Ok(())
    }

    fn read_byte(&mut self, timeout: Duration) -> std::result::Result<u8, Error> {
        let serial = self.serial.as_mut().ok_or(Error::NotOpen)?;
        serial.set_timeout(timeout).map_err(std::io::Error::from)?;

        let mut rx_buffer = [0u8; 1];
        match serial.read_exact(&mut rx_buffer) {
            Ok(()) => {
                log::trace!("read_byte: 0x{:02X}", rx_buffer[0]);
                Ok(rx_buffer[0])
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(Error::Timeout),
            Err(e) => Err(e.into()),
        }
    }
}
