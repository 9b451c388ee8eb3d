//! Binary protocol packet structure and encoding/decoding

use byteorder::{ByteOrder, LittleEndian};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::trace;

use crate::{
    command::Command,
    constants::PACKET_HEADER,
    crc,
    error::{Error, Result},
};

/// Binary protocol packet
///
/// # Packet Structure
///
/// ```text
/// ┌─────────────┬─────────────┬──────────────────────────┬─────────────┐
/// │   Header    │   Length    │           Body           │     CRC     │
/// │   3 bytes   │   2 bytes   │      Length bytes        │   2 bytes   │
/// │  F8 55 CE   │  (LE u16)   │ [command, payload ...]   │  (LE u16)   │
/// └─────────────┴─────────────┴──────────────────────────┴─────────────┘
/// ```
///
/// `Length` counts the body only. The CRC is [`crc::crc_variant_a`] over the
/// body. The first body byte is the command code.
///
/// # Examples
///
/// ```
/// use scalelink_core::{Packet, Command};
///
/// let packet = Packet::new(Command::GetWeight);
/// let encoded = packet.encode();
/// assert_eq!(&encoded[..], &[0xF8, 0x55, 0xCE, 0x01, 0x00, 0xA0, 0xA0, 0x00]);
///
/// let decoded = Packet::decode(encoded).unwrap();
/// assert_eq!(decoded.body(), packet.body());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    /// Command code followed by command-specific payload
    body: Bytes,
}

impl Packet {
    /// Header size in bytes
    pub const HEADER_SIZE: usize = 3;

    /// Length field size in bytes
    pub const LENGTH_SIZE: usize = 2;

    /// Trailing CRC size in bytes
    pub const CRC_SIZE: usize = 2;

    /// Maximum body size (16-bit length field)
    pub const MAX_BODY_SIZE: usize = u16::MAX as usize;

    /// Create a packet carrying only a command code
    pub fn new(command: Command) -> Self {
        Self {
            body: Bytes::copy_from_slice(&[command.into()]),
        }
    }

    /// Create a packet with payload following the command code
    ///
    /// # Examples
    ///
    /// ```
    /// use scalelink_core::{Packet, Command};
    ///
    /// let packet = Packet::with_payload(Command::Ping, [0x04u8]).unwrap();
    /// assert_eq!(packet.body(), &[0x91, 0x04]);
    /// ```
    pub fn with_payload(command: Command, payload: impl AsRef<[u8]>) -> Result<Self> {
        let payload = payload.as_ref();
        let mut body = BytesMut::with_capacity(1 + payload.len());
        body.put_u8(command.into());
        body.put_slice(payload);
        Self::from_body(body.freeze())
    }

    /// Wrap an already assembled body
    ///
    /// # Errors
    ///
    /// - Body is empty (no command code)
    /// - Body does not fit the 16-bit length field
    pub fn from_body(body: impl Into<Bytes>) -> Result<Self> {
        let body = body.into();

        if body.is_empty() {
            return Err(Error::Truncated {
                expected: 1,
                actual: 0,
            });
        }

        if body.len() > Self::MAX_BODY_SIZE {
            return Err(Error::PayloadTooLarge {
                size: body.len(),
                max: Self::MAX_BODY_SIZE,
            });
        }

        Ok(Self { body })
    }

    /// Rebuild a packet from a body and the CRC received after it
    ///
    /// # Errors
    ///
    /// - Body is empty
    /// - CRC does not match the body
    pub fn from_parts(body: impl Into<Bytes>, received_crc: u16) -> Result<Self> {
        let packet = Self::from_body(body)?;

        let calculated = packet.crc();
        if calculated != received_crc {
            return Err(Error::CrcMismatch {
                calculated,
                received: received_crc,
            });
        }

        trace!(
            command = format!("0x{:02X}", packet.command_code()),
            body = hex::encode(&packet.body),
            "Decoded packet"
        );

        Ok(packet)
    }

    /// Verify the fixed header
    pub fn check_header(header: &[u8]) -> Result<()> {
        if header.len() < Self::HEADER_SIZE {
            return Err(Error::Truncated {
                expected: Self::HEADER_SIZE,
                actual: header.len(),
            });
        }

        if header[..Self::HEADER_SIZE] != PACKET_HEADER {
            let mut received = [0u8; 3];
            received.copy_from_slice(&header[..Self::HEADER_SIZE]);
            return Err(Error::BadHeader { received });
        }

        Ok(())
    }

    /// Read a little-endian 16-bit field (length or CRC)
    pub fn read_u16(field: &[u8]) -> Result<u16> {
        if field.len() < 2 {
            return Err(Error::Truncated {
                expected: 2,
                actual: field.len(),
            });
        }

        Ok(LittleEndian::read_u16(field))
    }

    /// Command code (first body byte)
    pub fn command_code(&self) -> u8 {
        self.body[0]
    }

    /// Command code as a known [`Command`]
    pub fn command(&self) -> Result<Command> {
        Command::try_from(self.command_code())
    }

    /// Complete body, command code included
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Command-specific payload (body without the command code)
    pub fn payload(&self) -> &[u8] {
        &self.body[1..]
    }

    /// Calculate CRC for this packet
    pub fn crc(&self) -> u16 {
        crc::crc_variant_a(&self.body)
    }

    /// Fail unless the command code matches `expected`
    pub fn expect_command(self, expected: Command) -> Result<Self> {
        let actual = self.command_code();
        if actual != u8::from(expected) {
            return Err(Error::UnexpectedCommand {
                expected: expected.into(),
                actual,
            });
        }
        Ok(self)
    }

    /// Encode packet to bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(
            Self::HEADER_SIZE + Self::LENGTH_SIZE + self.body.len() + Self::CRC_SIZE,
        );

        buf.put_slice(&PACKET_HEADER);
        buf.put_u16_le(self.body.len() as u16);
        buf.put_slice(&self.body);
        buf.put_u16_le(self.crc());

        buf
    }

    /// Decode a packet from a complete buffer
    ///
    /// Streams are decoded field by field instead (see the scale client);
    /// this is for buffers already holding exactly one packet.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Header is wrong
    /// - Buffer is shorter than the length field announces
    /// - Bytes follow the CRC
    /// - CRC verification fails
    pub fn decode(mut buf: BytesMut) -> Result<Self> {
        let prefix = Self::HEADER_SIZE + Self::LENGTH_SIZE;
        if buf.len() < prefix {
            return Err(Error::Truncated {
                expected: prefix,
                actual: buf.len(),
            });
        }

        Self::check_header(&buf)?;
        buf.advance(Self::HEADER_SIZE);

        let length = usize::from(buf.get_u16_le());
        let total = prefix + length + Self::CRC_SIZE;
        if buf.len() < length + Self::CRC_SIZE {
            return Err(Error::Truncated {
                expected: total,
                actual: prefix + buf.len(),
            });
        }
        if buf.len() > length + Self::CRC_SIZE {
            return Err(Error::BadFraming(format!(
                "{} trailing bytes after CRC",
                buf.len() - length - Self::CRC_SIZE
            )));
        }

        let body = buf.split_to(length).freeze();
        let received_crc = buf.get_u16_le();

        Self::from_parts(body, received_crc)
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("command", &format!("0x{:02X}", self.command_code()))
            .field("crc", &format!("0x{:04X}", self.crc()))
            .field("body", &hex::encode(&self.body))
            .finish()
    }
}
