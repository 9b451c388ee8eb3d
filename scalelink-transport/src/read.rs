//! Exact-length reads over byte streams
//!
//! A stream socket may hand back any prefix of what the peer wrote. The binary
//! protocol needs whole fields, so reads loop until the requested count has
//! arrived or the peer closes.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::error::{Error, Result};

/// Read exactly `n` bytes from `source`
///
/// # Errors
///
/// - `Disconnected` if the stream ends (zero-length read) or is reset before
///   `n` bytes arrived. Partial data is discarded, never returned.
/// - `Io` for any other read failure
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use scalelink_transport::read_exact;
///
/// let mut source: &[u8] = &[0xF8, 0x55, 0xCE, 0x01];
/// let header = read_exact(&mut source, 3).await.unwrap();
/// assert_eq!(&header[..], &[0xF8, 0x55, 0xCE]);
/// # }
/// ```
pub async fn read_exact<R>(source: &mut R, n: usize) -> Result<BytesMut>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::zeroed(n);
    let mut filled = 0;

    while filled < n {
        let read = source
            .read(&mut buf[filled..])
            .await
            .map_err(|e| Error::from_stream_io(e, n, filled))?;

        if read == 0 {
            return Err(Error::Disconnected {
                expected: n,
                received: filled,
            });
        }

        filled += read;
        trace!(read, filled, expected = n, "Partial read");
    }

    Ok(buf)
}
