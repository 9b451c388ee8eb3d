//! Transport layer for the scale protocol
//!
//! Provides TCP communication with scales and exact-length stream reads.

pub mod error;
pub mod read;
pub mod tcp;

pub use error::{Error, Result};
pub use read::read_exact;
pub use tcp::TcpTransport;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to scale
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from scale
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive exactly `n` bytes (with timeout)
    async fn read_exact(&mut self, n: usize) -> Result<BytesMut>;

    /// Receive whatever a single read yields, at most `max_len` bytes (with timeout)
    async fn receive(&mut self, max_len: usize) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
