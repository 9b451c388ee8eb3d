//! Protocol constants

/// Binary packet header, identical in both directions
pub const PACKET_HEADER: [u8; 3] = [0xF8, 0x55, 0xCE];

/// Ping request payload byte
pub const PING_PAYLOAD: u8 = 0x04;

/// Default connect timeout (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;

/// Default timeout for a whole connect + request + response round trip (milliseconds)
pub const DEFAULT_ROUND_TRIP_TIMEOUT_MS: u64 = 2000;

/// Weight polls per weighing session
pub const MAX_ATTEMPTS: usize = 10;

/// Pause between unstable weight polls (milliseconds)
pub const POLL_INTERVAL_MS: u64 = 300;

/// Offsets into a weight response body
pub mod weight_body {
    /// Command code (0x10)
    pub const COMMAND: usize = 0;

    /// Raw weight, signed 32-bit little-endian
    pub const RAW: usize = 1;

    /// Division code (0-4)
    pub const DIVISION: usize = 5;

    /// Stability flag (0 = unstable)
    pub const STABLE: usize = 6;

    /// Minimum body length carrying all fields
    pub const MIN_LEN: usize = 7;
}

/// ASCII frame control bytes
pub mod ascii {
    /// Start of text
    pub const STX: u8 = 0x02;

    /// End of text
    pub const ETX: u8 = 0x03;

    /// Default device address
    pub const DEFAULT_ADDRESS: u8 = 0x01;

    /// Default weight request command
    pub const DEFAULT_COMMAND: u8 = b'R';

    /// Largest response accepted in a single read
    pub const MAX_FRAME_LEN: usize = 64;
}
