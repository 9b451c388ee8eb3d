//! Request encoding and response decoding, bound to one protocol variant
//!
//! The variant is fixed when the codec is built, so a binary response can
//! never be handed to the ASCII decoder or the other way around.

use bytes::BytesMut;
use tracing::trace;

use scalelink_core::constants::PING_PAYLOAD;
use scalelink_core::{AsciiFrame, Command, Packet};
use scalelink_transport::Transport;

use crate::config::{AsciiOptions, ProtocolVariant};
use crate::error::Result;

/// Requests the client can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Ping,
    GetWeight,
}

/// A validated response
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Binary(Packet),
    Ascii(AsciiFrame),
}

/// Frame codec for one protocol variant
#[derive(Debug, Clone)]
pub struct FrameCodec {
    variant: ProtocolVariant,
}

impl FrameCodec {
    pub fn new(variant: ProtocolVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> &ProtocolVariant {
        &self.variant
    }

    /// Encode a request in this codec's framing
    ///
    /// The ASCII protocol has no ping; both requests become a weight request.
    pub fn encode_request(&self, request: Request) -> Result<BytesMut> {
        let encoded = match (&self.variant, request) {
            (ProtocolVariant::Binary, Request::Ping) => {
                Packet::with_payload(Command::Ping, [PING_PAYLOAD])?.encode()
            }
            (ProtocolVariant::Binary, Request::GetWeight) => {
                Packet::new(Command::GetWeight).encode()
            }
            (ProtocolVariant::Ascii(AsciiOptions { address, command, .. }), _) => {
                AsciiFrame::encode_request(*address, *command)
            }
        };

        Ok(encoded)
    }

    /// Read and validate one response from `transport`
    ///
    /// `expected` is only checked by the binary variant; ASCII frames carry
    /// no response code.
    pub async fn read_response<T>(
        &self,
        transport: &mut T,
        expected: Option<Command>,
    ) -> Result<Response>
    where
        T: Transport + ?Sized,
    {
        match &self.variant {
            ProtocolVariant::Binary => {
                let packet = read_packet(transport).await?;
                let packet = match expected {
                    Some(command) => packet.expect_command(command)?,
                    None => packet,
                };
                Ok(Response::Binary(packet))
            }
            ProtocolVariant::Ascii(options) => {
                let buf = transport.receive(options.max_frame_len).await?;
                trace!(len = buf.len(), "ASCII response");
                Ok(Response::Ascii(AsciiFrame::decode(&buf)?))
            }
        }
    }
}

/// Read one binary packet field by field
///
/// Header, length, body and CRC are each read with an exact-length read; the
/// header is checked before anything else is consumed.
pub async fn read_packet<T>(transport: &mut T) -> Result<Packet>
where
    T: Transport + ?Sized,
{
    let header = transport.read_exact(Packet::HEADER_SIZE).await?;
    Packet::check_header(&header)?;

    let length = transport.read_exact(Packet::LENGTH_SIZE).await?;
    let length = usize::from(Packet::read_u16(&length)?);

    let body = transport.read_exact(length).await?;

    let crc = transport.read_exact(Packet::CRC_SIZE).await?;
    let crc = Packet::read_u16(&crc)?;

    Ok(Packet::from_parts(body.freeze(), crc)?)
}
