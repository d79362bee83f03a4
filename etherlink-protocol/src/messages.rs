//! Message type conventions for the Etherlink protocol
//!
//! Message types are a plain byte. By convention they fall into ranges:
//! - 0x00-0x0F: System (ping, pong, version, error)
//! - 0x10-0x7F: Telemetry (device → host)
//! - 0x80-0xFE: Commands (host → device)
//! - 0xFF: Reserved
//!
//! The parser and serializer never look at the type. Interpreting it is up
//! to the application.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::frame::{Frame, FrameError, FrameRef, MAX_PAYLOAD_SIZE};

// System message IDs
pub const MSG_PING: u8 = 0x00;
pub const MSG_PONG: u8 = 0x01;
pub const MSG_VERSION: u8 = 0x02;
pub const MSG_ERROR: u8 = 0x0F;

/// First telemetry ID
pub const TELEMETRY_START: u8 = 0x10;
/// First command ID
pub const COMMAND_START: u8 = 0x80;
/// Reserved ID
pub const MSG_RESERVED: u8 = 0xFF;

/// Protocol version reported in response to a version query
pub const PROTOCOL_VERSION: (u8, u8) = (1, 0);

/// Range a message type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageClass {
    System,
    Telemetry,
    Command,
    Reserved,
}

impl MessageClass {
    /// Classify a message type
    pub fn of(msg_type: u8) -> Self {
        match msg_type {
            0x00..=0x0F => MessageClass::System,
            0x10..=0x7F => MessageClass::Telemetry,
            0x80..=0xFE => MessageClass::Command,
            0xFF => MessageClass::Reserved,
        }
    }
}

/// Errors from decoding a payload into a typed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// Value did not fit into a single frame
    Encode,
    /// Payload bytes are not a valid encoding of the target type
    Decode,
    /// Frame carries a different message type
    UnexpectedType { expected: u8, actual: u8 },
}

/// A payload type bound to a fixed message ID
///
/// Payloads are encoded with postcard.
pub trait TypedMessage: Serialize + DeserializeOwned {
    /// Message type used on the wire
    const MSG_TYPE: u8;

    /// Encode into an owned frame
    fn to_frame(&self) -> Result<Frame, PayloadError> {
        let mut buffer = [0u8; MAX_PAYLOAD_SIZE];
        let payload = postcard::to_slice(self, &mut buffer).map_err(|_| PayloadError::Encode)?;
        Frame::new(Self::MSG_TYPE, payload).map_err(|_| PayloadError::Encode)
    }

    /// Decode from a received frame, checking the message type
    fn from_frame(frame: FrameRef<'_>) -> Result<Self, PayloadError> {
        if frame.msg_type != Self::MSG_TYPE {
            return Err(PayloadError::UnexpectedType {
                expected: Self::MSG_TYPE,
                actual: frame.msg_type,
            });
        }
        decode_payload(frame.payload)
    }
}

/// Decode a postcard payload
///
/// Trailing bytes are ignored, so a newer peer may append fields.
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, PayloadError> {
    postcard::from_bytes(payload).map_err(|_| PayloadError::Decode)
}

/// System messages (0x00-0x0F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemMessage {
    /// Heartbeat request
    Ping,
    /// Heartbeat response
    Pong,
    /// Version request (empty payload)
    VersionQuery,
    /// Version response: [major][minor]
    Version { major: u8, minor: u8 },
    /// Error report: [code]
    Error { code: u8 },
}

impl SystemMessage {
    /// Parse a system message from a frame
    pub fn from_frame(frame: FrameRef<'_>) -> Result<Self, FrameError> {
        match (frame.msg_type, frame.payload) {
            (MSG_PING, _) => Ok(SystemMessage::Ping),
            (MSG_PONG, _) => Ok(SystemMessage::Pong),
            (MSG_VERSION, []) => Ok(SystemMessage::VersionQuery),
            (MSG_VERSION, [major, minor, ..]) => Ok(SystemMessage::Version {
                major: *major,
                minor: *minor,
            }),
            (MSG_ERROR, [code, ..]) => Ok(SystemMessage::Error { code: *code }),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            SystemMessage::Ping => Ok(Frame::empty(MSG_PING)),
            SystemMessage::Pong => Ok(Frame::empty(MSG_PONG)),
            SystemMessage::VersionQuery => Ok(Frame::empty(MSG_VERSION)),
            SystemMessage::Version { major, minor } => Frame::new(MSG_VERSION, &[*major, *minor]),
            SystemMessage::Error { code } => Frame::new(MSG_ERROR, &[*code]),
        }
    }

    /// Version response for this implementation
    pub fn current_version() -> Self {
        let (major, minor) = PROTOCOL_VERSION;
        SystemMessage::Version { major, minor }
    }
}
