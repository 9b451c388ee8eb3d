//! Error types for scalelink-core

/// Result type alias for frame codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Frame decoding errors
///
/// None of these are ever corrected; each one fails the current request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Packet did not start with the fixed header
    #[error("Bad packet header: {received:02X?}")]
    BadHeader {
        received: [u8; 3],
    },

    /// Frame or body is too short to be valid
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    Truncated {
        expected: usize,
        actual: usize,
    },

    /// CRC verification failed
    #[error("CRC mismatch: calculated 0x{calculated:04X}, received 0x{received:04X}")]
    CrcMismatch {
        calculated: u16,
        received: u16,
    },

    /// STX/ETX delimiters are not where they belong
    #[error("Bad framing: {0}")]
    BadFraming(String),

    /// Response command differs from the one the request expects
    #[error("Unexpected command: expected 0x{expected:02X}, got 0x{actual:02X}")]
    UnexpectedCommand {
        expected: u8,
        actual: u8,
    },

    /// Payload is not a valid ASCII decimal weight
    #[error("Invalid payload: {0}")]
    PayloadFormat(String),

    /// Unknown command code
    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Body too large for the 16-bit length field
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },
}

impl From<scalelink_types::Error> for Error {
    fn from(err: scalelink_types::Error) -> Self {
        Self::PayloadFormat(err.to_string())
    }
}
