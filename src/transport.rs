use crate::Error;
use std::time::Duration;

/// Byte-oriented request/response transport to one board.
///
/// The protocol is strictly synchronous: one command byte out, at most
/// one data byte back. Implementations must never block indefinitely on
/// [`Transport::read_byte`]; a missing response surfaces as
/// [`Error::Timeout`] and the caller decides whether to retry.
pub trait Transport {
    /// Opens the connection.
    fn open(&mut self) -> std::result::Result<(), Error>;

    /// Closes the connection. Closing an already closed transport is a
    /// no-op.
    fn close(&mut self);

    /// Checks if the connection is currently open.
    fn is_open(&self) -> bool;

    /// Sends a single byte to the board.
    fn write_byte(&mut self, b: u8) -> std::result::Result<(), Error>;

    /// Reads a single byte from the board, waiting at most `timeout`.
    fn read_byte(&mut self, timeout: Duration) -> std::result::Result<u8, Error>;
}
