//! Frame layout and encoding for the Etherlink protocol.
//!
//! Frame format:
//! - SYNC (1 byte): 0xA5 synchronization byte
//! - TYPE (1 byte): message type identifier
//! - LENGTH (1 byte): payload length (0-250)
//! - PAYLOAD (0-250 bytes): application data
//! - CHECKSUM (1 byte): CRC-8 over TYPE, LENGTH and PAYLOAD (not SYNC)

use heapless::Vec;

use crate::crc::crc8;

/// Frame synchronization byte
pub const SYNC_BYTE: u8 = 0xA5;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Bytes added around the payload (SYNC + TYPE + LENGTH + CHECKSUM)
pub const FRAME_OVERHEAD: usize = 4;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = FRAME_OVERHEAD + MAX_PAYLOAD_SIZE;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload handed to the encoder exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge { len: usize },
    /// Received length byte exceeds [`MAX_PAYLOAD_SIZE`]
    InvalidLength { len: u8 },
    /// Received checksum does not match the running CRC
    ChecksumMismatch { expected: u8, actual: u8 },
    /// Frame contents do not form the expected message
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A constructed frame that owns its payload
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

/// A received frame borrowed from the parser's buffer
///
/// Only valid until the next byte is fed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameRef<'a> {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: &'a [u8],
}

impl FrameRef<'_> {
    /// Copy the view into an owned [`Frame`]
    ///
    /// Fails with [`FrameError::PayloadTooLarge`] for a hand-built view
    /// longer than [`MAX_PAYLOAD_SIZE`].
    pub fn to_owned_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(self.msg_type, self.payload)
    }
}

impl Frame {
    /// Create a new frame with the given message type and payload
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge { len: payload.len() })?;

        Ok(Self {
            msg_type,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// Borrow this frame as a [`FrameRef`]
    pub fn view(&self) -> FrameRef<'_> {
        FrameRef {
            msg_type: self.msg_type,
            payload: &self.payload,
        }
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        encode_into(self.msg_type, &self.payload, buffer)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Lay out `SYNC | TYPE | LENGTH | PAYLOAD | CRC` into `buffer`
///
/// Returns the number of bytes written.
pub fn encode_into(msg_type: u8, payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge { len: payload.len() });
    }

    let frame_len = FRAME_OVERHEAD + payload.len();
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    let end = 3 + payload.len();
    buffer[0] = SYNC_BYTE;
    buffer[1] = msg_type;
    buffer[2] = payload.len() as u8;
    buffer[3..end].copy_from_slice(payload);
    buffer[end] = crc8(&buffer[1..end]);

    Ok(frame_len)
}
