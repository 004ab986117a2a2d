#![cfg_attr(docsrs, feature(doc_cfg))]
//! # homeauto_lib
//!
//! This crate provides a library for talking to the two home automation
//! boards (air conditioner and curtain/sensor) over a byte-oriented UART
//! link. Every command is a single byte: GET commands are small IDs that
//! request one data byte back, SET commands are a pair of 2-bit-tagged
//! bytes carrying a 6-bit payload each.
//!
//! ## Features
//!
//! This crate uses a feature-based system to keep dependencies minimal.
//!
//! - `default`: Enables `bin-dependencies`, which is intended for compiling the `homeauto` command-line tool and pulls in `serialport` and `serde`.
//!
//! ### Transport Features
//! - `serialport`: Enables the real UART transport using the `serialport` crate. The in-memory board simulator is always available.
//!
//! ### Utility Features
//! - `serde`: Enables `serde` support for serializing/deserializing the board state records.
//! - `bin-dependencies`: Enables all features required by the `homeauto` binary executable.

/// Contains error types for the library.
mod error;
/// Defines the UART command protocol for both boards.
pub mod protocol;

pub use error::Error;

/// Single-byte request/response transport contract.
pub mod transport;

/// In-memory board simulator implementing the transport contract.
pub mod simulator;

/// High-level per-board sessions built on top of any transport.
pub mod client;

/// Real UART transport backed by a serial port.
#[cfg_attr(docsrs, doc(cfg(feature = "serialport")))]
#[cfg(feature = "serialport")]
pub mod serialport;
