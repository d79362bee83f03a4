//! Byte-at-a-time frame parser
//!
//! The parser only looks for [`SYNC_BYTE`] while idle. A sync-valued byte
//! inside the type, length, payload or checksum field is plain data, so a
//! corrupted stream stays out of step until the machine gets back to
//! [`ParseState::Idle`] and happens upon the next 0xA5. There is no
//! byte-stuffing on the wire to make this any tighter.

use heapless::Vec;

use crate::crc::{crc8_update, CRC8_INIT};
use crate::frame::{FrameError, FrameRef, MAX_PAYLOAD_SIZE, SYNC_BYTE};

/// Parser position within a frame
///
/// Each state carries only what has been received so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    /// Waiting for SYNC byte
    Idle,
    /// Got SYNC, waiting for TYPE
    GotSync,
    /// Got TYPE, waiting for LENGTH
    GotType { msg_type: u8 },
    /// Collecting `len` payload bytes
    GotLength { msg_type: u8, len: u8 },
    /// Payload complete, waiting for CHECKSUM
    GotPayload { msg_type: u8 },
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    crc: u8,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub const fn new() -> Self {
        Self {
            state: ParseState::Idle,
            crc: CRC8_INIT,
            buffer: Vec::new(),
        }
    }

    /// Drop any partial frame and wait for the next SYNC byte
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
        self.crc = CRC8_INIT;
        self.buffer.clear();
    }

    /// Current state
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// True when no frame is in progress
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::Idle
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when the frame in
    /// progress was rejected. The parser is idle again after `Some` or `Err`.
    pub fn feed(&mut self, byte: u8) -> Result<Option<FrameRef<'_>>, FrameError> {
        match self.state {
            ParseState::Idle => {
                if byte == SYNC_BYTE {
                    self.crc = CRC8_INIT;
                    self.state = ParseState::GotSync;
                }
                // Silently ignore non-SYNC bytes while waiting
                Ok(None)
            }
            ParseState::GotSync => {
                self.crc = crc8_update(self.crc, byte);
                self.state = ParseState::GotType { msg_type: byte };
                Ok(None)
            }
            ParseState::GotType { msg_type } => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::InvalidLength { len: byte });
                }
                self.crc = crc8_update(self.crc, byte);
                self.buffer.clear();
                self.state = if byte == 0 {
                    ParseState::GotPayload { msg_type }
                } else {
                    ParseState::GotLength { msg_type, len: byte }
                };
                Ok(None)
            }
            ParseState::GotLength { msg_type, len } => {
                // Cannot overflow: len was checked against MAX_PAYLOAD_SIZE
                let _ = self.buffer.push(byte);
                self.crc = crc8_update(self.crc, byte);
                if self.buffer.len() == len as usize {
                    self.state = ParseState::GotPayload { msg_type };
                }
                Ok(None)
            }
            ParseState::GotPayload { msg_type } => {
                let expected = self.crc;
                self.state = ParseState::Idle;

                if byte != expected {
                    self.buffer.clear();
                    return Err(FrameError::ChecksumMismatch {
                        expected,
                        actual: byte,
                    });
                }

                Ok(Some(FrameRef {
                    msg_type,
                    payload: &self.buffer,
                }))
            }
        }
    }
}
