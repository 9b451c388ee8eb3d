//! TCP transport

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::{error::*, read::read_exact, Transport};

/// TCP transport for networked scales
pub struct TcpTransport {
    addr: String,
    port: u16,
    socket_addr: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TcpTransport {
    /// Create new TCP transport
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            socket_addr: None,
            stream: None,
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(2),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Resolve address to SocketAddr
    async fn resolve_addr(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.socket_addr {
            return Ok(addr);
        }

        let addr_str = format!("{}:{}", self.addr, self.port);

        let mut addrs = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|source| Error::ConnectFailed {
                addr: addr_str.clone(),
                source,
            })?;

        let addr = addrs.next().ok_or_else(|| Error::ConnectFailed {
            addr: addr_str.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        })?;

        self.socket_addr = Some(addr);
        Ok(addr)
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.resolve_addr().await?;

        debug!("Connecting to {}...", addr);

        let stream = timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::Timeout(self.connect_timeout))?
            .map_err(|source| Error::ConnectFailed {
                addr: addr.to_string(),
                source,
            })?;

        // Disable Nagle's algorithm, requests are tiny
        stream.set_nodelay(true)?;

        debug!("Connected to {}", addr);

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Disconnecting from {}...", self.remote_addr());

            // Graceful shutdown
            let _ = stream.shutdown().await;
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream()?;

        trace!("Sending {} bytes: {}", data.len(), hex::encode(data));

        stream
            .write_all(data)
            .await
            .map_err(|e| Error::from_stream_io(e, 0, 0))?;
        stream.flush().await?;

        Ok(())
    }

    async fn read_exact(&mut self, n: usize) -> Result<BytesMut> {
        let read_timeout = self.read_timeout;
        let stream = self.stream()?;

        let buf = timeout(read_timeout, read_exact(stream, n))
            .await
            .map_err(|_| Error::Timeout(read_timeout))??;

        trace!("Received {} bytes: {}", n, hex::encode(&buf));

        Ok(buf)
    }

    async fn receive(&mut self, max_len: usize) -> Result<BytesMut> {
        let read_timeout = self.read_timeout;
        let stream = self.stream()?;

        let mut buf = BytesMut::with_capacity(max_len);

        // Read with timeout
        let n = timeout(read_timeout, stream.read_buf(&mut buf))
            .await
            .map_err(|_| Error::Timeout(read_timeout))?
            .map_err(|e| Error::from_stream_io(e, max_len, 0))?;

        if n == 0 {
            return Err(Error::Disconnected {
                expected: 1,
                received: 0,
            });
        }

        trace!("Received {} bytes: {}", n, hex::encode(&buf[..n]));

        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        self.socket_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.addr, self.port))
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("TCP transport to {} dropped while still connected", self.remote_addr());
        }
    }
}
