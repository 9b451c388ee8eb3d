//! ASCII protocol frames (STX/ETX delimited)
//!
//! ```text
//! ┌──────┬─────────┬─────────┬──────────────────┬──────┬───────────┐
//! │ STX  │ Address │ Command │ Payload (ASCII)  │ ETX  │    CRC    │
//! │ 0x02 │ 1 byte  │ 1 byte  │  "123.45" ...    │ 0x03 │ (LE u16)  │
//! └──────┴─────────┴─────────┴──────────────────┴──────┴───────────┘
//! ```
//!
//! The CRC is [`crc::crc_variant_b`] over everything before it. Requests carry
//! no payload; responses carry the weight as a decimal number.

use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::trace;

use scalelink_types::DecimalWeight;

use crate::{
    constants::ascii::{ETX, STX},
    crc,
    error::{Error, Result},
};

/// Decoded ASCII response frame
#[derive(Clone, PartialEq, Eq)]
pub struct AsciiFrame {
    /// Device address echoed by the scale
    pub address: u8,

    /// Command byte echoed by the scale
    pub command: u8,

    /// Raw payload bytes between the command byte and ETX
    pub payload: Bytes,

    /// Payload parsed as a decimal weight
    pub weight: DecimalWeight,
}

impl AsciiFrame {
    /// STX, address, command, ETX, two CRC bytes
    pub const MIN_SIZE: usize = 6;

    /// Encode a request frame
    ///
    /// # Examples
    ///
    /// ```
    /// use scalelink_core::AsciiFrame;
    ///
    /// let request = AsciiFrame::encode_request(0x01, b'R');
    /// assert_eq!(&request[..], &[0x02, 0x01, b'R', 0x03, 0x2D, 0x3D]);
    /// ```
    pub fn encode_request(address: u8, command: u8) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::MIN_SIZE);
        buf.put_u8(STX);
        buf.put_u8(address);
        buf.put_u8(command);
        buf.put_u8(ETX);
        let crc = crc::crc_variant_b(&buf);
        buf.put_u16_le(crc);
        buf
    }

    /// Decode a response frame from a single buffer
    ///
    /// Checks run in this order: length, CRC, delimiters, payload.
    ///
    /// # Errors
    ///
    /// - `Truncated` if the buffer is shorter than [`Self::MIN_SIZE`]
    /// - `CrcMismatch` if the trailing CRC is wrong
    /// - `BadFraming` if the first byte is not STX or the byte before the CRC is not ETX
    /// - `PayloadFormat` if the payload is not a decimal number
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::MIN_SIZE {
            return Err(Error::Truncated {
                expected: Self::MIN_SIZE,
                actual: buf.len(),
            });
        }

        let (frame, crc_bytes) = buf.split_at(buf.len() - 2);
        let received = LittleEndian::read_u16(crc_bytes);
        let calculated = crc::crc_variant_b(frame);
        if calculated != received {
            return Err(Error::CrcMismatch {
                calculated,
                received,
            });
        }

        if frame[0] != STX {
            return Err(Error::BadFraming(format!(
                "expected STX at start, got 0x{:02X}",
                frame[0]
            )));
        }

        let etx_pos = frame.len() - 1;
        if frame[etx_pos] != ETX {
            return Err(Error::BadFraming(format!(
                "expected ETX before CRC, got 0x{:02X}",
                frame[etx_pos]
            )));
        }

        let payload = &frame[3..etx_pos];
        let text = std::str::from_utf8(payload)
            .map_err(|_| Error::PayloadFormat(format!("non-ASCII payload {}", hex::encode(payload))))?;
        let weight: DecimalWeight = text.parse()?;

        trace!(
            address = frame[1],
            command = frame[2],
            payload = text,
            "Decoded ASCII frame"
        );

        Ok(Self {
            address: frame[1],
            command: frame[2],
            payload: Bytes::copy_from_slice(payload),
            weight,
        })
    }

    /// Encode a response frame (what a scale sends back)
    pub fn encode_response(address: u8, command: u8, payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::MIN_SIZE + payload.len());
        buf.put_u8(STX);
        buf.put_u8(address);
        buf.put_u8(command);
        buf.put_slice(payload);
        buf.put_u8(ETX);
        let crc = crc::crc_variant_b(&buf);
        buf.put_u16_le(crc);
        buf
    }
}

impl fmt::Debug for AsciiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsciiFrame")
            .field("address", &format!("0x{:02X}", self.address))
            .field("command", &format!("0x{:02X}", self.command))
            .field("payload", &String::from_utf8_lossy(&self.payload))
            .finish()
    }
}
