//! # scalelink
//!
//! Client for networked industrial weighing scales, plus a button-driven
//! weighing station built on it.
//!
//! ## Features
//!
//! - Binary (length-prefixed) and ASCII (STX/ETX) framing, each with its own CRC
//! - Async/await API using Tokio
//! - One short-lived TCP connection per request
//! - Weighing sessions that poll until the reading is stable
//! - Control loop driving a digital output pulse from a push button
//!
//! ## Quick Start
//!
//! ```no_run
//! use scalelink::{Scale, ScaleClient, ScaleConfig};
//!
//! #[tokio::main]
//! async fn main() -> scalelink::Result<()> {
//!     let client = ScaleClient::new(ScaleConfig::new("192.168.4.137"));
//!
//!     if client.ping().await {
//!         let reading = client.read_weight().await?;
//!         println!("{}", reading);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod control;
pub mod error;
pub mod gpio;
pub mod session;

// Re-exports
pub use client::{Scale, ScaleClient};
pub use codec::{FrameCodec, Request, Response};
pub use config::{AsciiOptions, ControlConfig, ProtocolVariant, ScaleConfig, SessionConfig};
pub use control::ControlLoop;
pub use error::{Error, Result};
pub use gpio::{DigitalIo, InputState, MemoryIo, OutputState, SysfsGpio};
pub use session::{SessionOutcome, SessionReport, SessionState, WeighingSession};

// Re-export lower layers
pub use scalelink_core::{AsciiFrame, Command, Error as FrameError, Packet};
pub use scalelink_transport::Error as TransportError;
pub use scalelink_types::{DecimalWeight, WeightReading};
