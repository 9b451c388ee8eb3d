//! Binary protocol command codes

use crate::error::{Error, Result};

/// Command codes carried in the first body byte of a binary packet
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    // Requests (host to scale)
    Ping = 0x91,
    GetWeight = 0xA0,

    // Responses (scale to host)
    PingAck = 0x51,
    WeightResponse = 0x10,
}

impl Command {
    /// Response code the scale answers this request with
    pub fn expected_response(self) -> Option<Command> {
        match self {
            Self::Ping => Some(Self::PingAck),
            Self::GetWeight => Some(Self::WeightResponse),
            _ => None,
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x91 => Ok(Self::Ping),
            0xA0 => Ok(Self::GetWeight),
            0x51 => Ok(Self::PingAck),
            0x10 => Ok(Self::WeightResponse),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}
