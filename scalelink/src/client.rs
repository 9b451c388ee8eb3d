//! Scale client
//!
//! Every operation is one self-contained round trip: connect, send one
//! request, read one response, disconnect. No connection outlives a call.

use async_trait::async_trait;
use byteorder::{ByteOrder, LittleEndian};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use scalelink_core::constants::weight_body;
use scalelink_core::{Command, Error as FrameError, Packet};
use scalelink_transport::{Error as TransportError, TcpTransport, Transport};
use scalelink_types::WeightReading;

use crate::codec::{FrameCodec, Request, Response};
use crate::config::{ProtocolVariant, ScaleConfig};
use crate::error::{Error, Result};

/// Operations a weighing session needs from a scale
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Scale: Send + Sync {
    /// Best-effort connectivity probe
    async fn ping(&self) -> bool;

    /// Request and decode one weight reading
    async fn read_weight(&self) -> Result<WeightReading>;
}

/// TCP client for one scale
///
/// # Examples
///
/// ```no_run
/// use scalelink::{Scale, ScaleClient, ScaleConfig};
///
/// #[tokio::main]
/// async fn main() -> scalelink::Result<()> {
///     let client = ScaleClient::new(ScaleConfig::new("192.168.4.137"));
///
///     if client.ping().await {
///         let reading = client.read_weight().await?;
///         println!("{}", reading);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScaleClient {
    config: ScaleConfig,
    codec: FrameCodec,
}

impl ScaleClient {
    pub fn new(config: ScaleConfig) -> Self {
        let codec = FrameCodec::new(config.variant.clone());
        Self { config, codec }
    }

    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// Ping the scale and report why it failed
    ///
    /// [`Scale::ping`] collapses this into a boolean.
    pub async fn probe(&self) -> Result<()> {
        self.exchange(Request::Ping, Command::Ping.expected_response()).await?;
        Ok(())
    }

    /// Run one request/response exchange on a fresh connection
    ///
    /// The round-trip timeout covers connect, send and receive. The
    /// connection is closed on every path, including timeouts.
    async fn exchange(&self, request: Request, expected: Option<Command>) -> Result<Response> {
        let round_trip_timeout = self.config.round_trip_timeout;
        let mut transport = TcpTransport::new(self.config.host.clone(), self.config.port)
            .with_connect_timeout(self.config.connect_timeout)
            .with_read_timeout(round_trip_timeout);

        let result = timeout(
            round_trip_timeout,
            self.round_trip(&mut transport, request, expected),
        )
        .await
        .unwrap_or_else(|_| Err(TransportError::Timeout(round_trip_timeout).into()));

        if let Err(e) = transport.disconnect().await {
            warn!("Failed to close connection to {}: {}", self.config.addr(), e);
        }

        result
    }

    async fn round_trip<T>(
        &self,
        transport: &mut T,
        request: Request,
        expected: Option<Command>,
    ) -> Result<Response>
    where
        T: Transport + ?Sized,
    {
        transport.connect().await?;

        let data = self.codec.encode_request(request)?;
        trace!("Sending {:?} ({} bytes)", request, data.len());
        transport.send(&data).await?;

        let response = self.codec.read_response(transport, expected).await?;
        trace!("Received: {:?}", response);

        Ok(response)
    }

    /// Decode a binary weight response body
    fn decode_weight_packet(packet: &Packet) -> Result<WeightReading> {
        let body = packet.body();

        let code = body[weight_body::COMMAND];
        if code != u8::from(Command::WeightResponse) {
            return Err(Error::UnexpectedResponse(code));
        }

        if body.len() < weight_body::MIN_LEN {
            return Err(FrameError::Truncated {
                expected: weight_body::MIN_LEN,
                actual: body.len(),
            }
            .into());
        }

        let raw = LittleEndian::read_i32(&body[weight_body::RAW..weight_body::DIVISION]);

        Ok(WeightReading::new(
            raw,
            body[weight_body::DIVISION],
            body[weight_body::STABLE] != 0,
        ))
    }
}

#[async_trait]
impl Scale for ScaleClient {
    async fn ping(&self) -> bool {
        match self.probe().await {
            Ok(()) => {
                debug!("Scale {} answered ping", self.config.addr());
                true
            }
            Err(e) => {
                debug!("Scale {} did not answer ping: {}", self.config.addr(), e);
                false
            }
        }
    }

    async fn read_weight(&self) -> Result<WeightReading> {
        let response = self.exchange(Request::GetWeight, None).await?;

        let reading = match (response, &self.config.variant) {
            (Response::Binary(packet), _) => Self::decode_weight_packet(&packet)?,
            (Response::Ascii(frame), ProtocolVariant::Ascii(options)) => {
                let stable = frame.weight.weight_kg() > options.stable_threshold_kg;
                frame.weight.into_reading(stable)
            }
            // The codec only yields ASCII frames for an ASCII configuration
            (Response::Ascii(frame), ProtocolVariant::Binary) => frame.weight.into_reading(false),
        };

        debug!("Weight: {}", reading);
        Ok(reading)
    }
}
