//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] scalelink_transport::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] scalelink_core::Error),

    #[error("Unexpected response from scale: 0x{0:02X}")]
    UnexpectedResponse(u8),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Check if the scale dropped the connection mid-exchange
    ///
    /// A weighing session gives up on this; every other error is retried.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_disconnect())
    }
}
