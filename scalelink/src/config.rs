//! Client, session and control loop configuration
//!
//! All settings are plain immutable values handed to constructors. Nothing is
//! read from process-wide state except by [`ScaleConfig::from_env`].

use std::time::Duration;

use scalelink_core::constants::{
    self, ascii, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_ROUND_TRIP_TIMEOUT_MS,
};
use scalelink_core::DEFAULT_PORT;

use crate::error::{Error, Result};

/// Options of the ASCII (STX/ETX) protocol variant
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiOptions {
    /// Device address sent in every request
    pub address: u8,

    /// Weight request command byte
    pub command: u8,

    /// A reading counts as stable once its weight exceeds this (kg)
    ///
    /// The ASCII protocol has no stability field, so this is a policy on the
    /// host side and does not mean the load has settled.
    pub stable_threshold_kg: f64,

    /// Largest response accepted from a single read
    pub max_frame_len: usize,
}

impl Default for AsciiOptions {
    fn default() -> Self {
        Self {
            address: ascii::DEFAULT_ADDRESS,
            command: ascii::DEFAULT_COMMAND,
            stable_threshold_kg: 0.0,
            max_frame_len: ascii::MAX_FRAME_LEN,
        }
    }
}

/// Framing scheme spoken by the scale
///
/// A deployment uses exactly one of them.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProtocolVariant {
    /// Length-prefixed packets with CRC variant A
    #[default]
    Binary,

    /// STX/ETX frames with CRC variant B
    Ascii(AsciiOptions),
}

impl ProtocolVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Ascii(_) => "ascii",
        }
    }
}

/// Scale client configuration
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use scalelink::ScaleConfig;
///
/// let config = ScaleConfig::new("192.168.4.137")
///     .with_port(5001)
///     .with_round_trip_timeout(Duration::from_secs(3));
/// assert_eq!(config.addr(), "192.168.4.137:5001");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleConfig {
    pub host: String,
    pub port: u16,

    /// Bound on establishing the TCP connection
    pub connect_timeout: Duration,

    /// Bound on the whole connect + request + response exchange
    pub round_trip_timeout: Duration,

    pub variant: ProtocolVariant,
}

impl ScaleConfig {
    /// Configuration for a binary-protocol scale on the default port
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            round_trip_timeout: Duration::from_millis(DEFAULT_ROUND_TRIP_TIMEOUT_MS),
            variant: ProtocolVariant::Binary,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_round_trip_timeout(mut self, timeout: Duration) -> Self {
        self.round_trip_timeout = timeout;
        self
    }

    pub fn with_variant(mut self, variant: ProtocolVariant) -> Self {
        self.variant = variant;
        self
    }

    /// `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build a configuration from environment variables
    ///
    /// | Variable           | Meaning                         | Default  |
    /// |--------------------|---------------------------------|----------|
    /// | `SCALE_HOST`       | scale address                   | required |
    /// | `SCALE_PORT`       | TCP port                        | 5001     |
    /// | `SCALE_TIMEOUT_MS` | connect and round-trip timeout  | 2000     |
    /// | `SCALE_PROTOCOL`   | `binary` or `ascii`             | binary   |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("SCALE_HOST")
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| Error::Config("SCALE_HOST is not set".into()))?;

        let mut config = Self::new(host.trim());

        if let Some(port) = lookup("SCALE_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("SCALE_PORT is not a port: {:?}", port)))?;
        }

        if let Some(ms) = lookup("SCALE_TIMEOUT_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("SCALE_TIMEOUT_MS is not a number: {:?}", ms)))?;
            config.connect_timeout = Duration::from_millis(ms);
            config.round_trip_timeout = Duration::from_millis(ms);
        }

        if let Some(protocol) = lookup("SCALE_PROTOCOL") {
            config.variant = match protocol.trim().to_ascii_lowercase().as_str() {
                "binary" => ProtocolVariant::Binary,
                "ascii" => ProtocolVariant::Ascii(AsciiOptions::default()),
                other => {
                    return Err(Error::Config(format!("unknown SCALE_PROTOCOL: {:?}", other)));
                }
            };
        }

        Ok(config)
    }
}

/// Weighing session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Weight polls before giving up on stabilization
    pub max_attempts: usize,

    /// Pause after an unstable poll
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::MAX_ATTEMPTS,
            poll_interval: Duration::from_millis(constants::POLL_INTERVAL_MS),
        }
    }
}

/// Control loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlConfig {
    /// Input line sampling period
    pub poll_interval: Duration,

    /// How long the output stays active after a stable weight
    pub pulse_duration: Duration,

    /// Pause after every handled press, before waiting for release
    pub cooldown: Duration,

    pub session: SessionConfig,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(60),
            pulse_duration: Duration::from_secs(1),
            cooldown: Duration::from_secs(1),
            session: SessionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ScaleConfig::new("10.0.0.5");
        assert_eq!(config.port, 5001);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.round_trip_timeout, Duration::from_secs(2));
        assert_eq!(config.variant, ProtocolVariant::Binary);

        let session = SessionConfig::default();
        assert_eq!(session.max_attempts, 10);
        assert_eq!(session.poll_interval, Duration::from_millis(300));

        let control = ControlConfig::default();
        assert_eq!(control.poll_interval, Duration::from_millis(60));
        assert_eq!(control.pulse_duration, Duration::from_secs(1));
    }

    #[test]
    fn test_from_env_full() {
        let config = ScaleConfig::from_lookup(lookup(&[
            ("SCALE_HOST", "192.168.4.137"),
            ("SCALE_PORT", "6000"),
            ("SCALE_TIMEOUT_MS", "3000"),
            ("SCALE_PROTOCOL", "ASCII"),
        ]))
        .unwrap();

        assert_eq!(config.addr(), "192.168.4.137:6000");
        assert_eq!(config.round_trip_timeout, Duration::from_secs(3));
        assert_eq!(config.variant, ProtocolVariant::Ascii(AsciiOptions::default()));
    }

    #[test]
    fn test_from_env_requires_host() {
        let result = ScaleConfig::from_lookup(lookup(&[("SCALE_PORT", "5001")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_env_rejects_bad_values() {
        let bad_port = ScaleConfig::from_lookup(lookup(&[
            ("SCALE_HOST", "scale"),
            ("SCALE_PORT", "70000"),
        ]));
        assert!(matches!(bad_port, Err(Error::Config(_))));

        let bad_protocol = ScaleConfig::from_lookup(lookup(&[
            ("SCALE_HOST", "scale"),
            ("SCALE_PROTOCOL", "modbus"),
        ]));
        assert!(matches!(bad_protocol, Err(Error::Config(_))));
    }
}
