//! # scalelink-core
//!
//! Core protocol implementation for networked industrial scales.
//!
//! This crate provides the low-level protocol primitives:
//! - Binary packet structure and encoding/decoding
//! - ASCII STX/ETX frame encoding/decoding
//! - The two CRC-16 variants
//! - Command definitions
//! - Protocol constants

pub mod ascii;
pub mod command;
pub mod constants;
pub mod crc;
pub mod error;
pub mod packet;

pub use ascii::AsciiFrame;
pub use command::Command;
pub use error::{Error, Result};
pub use packet::Packet;

/// Default scale port
pub const DEFAULT_PORT: u16 = 5001;
