//! Etherlink framing engine
//!
//! A minimal framed-message protocol for exchanging typed binary messages
//! over an ordered but unreliable byte stream such as a UART or a BLE
//! characteristic. Each frame is checked with a CRC-8; there is no
//! retransmission, escaping or fragmentation.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌──────┬──────┬────────┬─────────────┬──────────┐
//! │ SYNC │ TYPE │ LENGTH │ PAYLOAD     │ CHECKSUM │
//! │ 0xA5 │ 1B   │ 1B     │ 0–250B      │ 1B       │
//! └──────┴──────┴────────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is CRC-8 (poly 0x07, init 0x00) over TYPE, LENGTH and
//! PAYLOAD.
//!
//! # Usage
//!
//! ```
//! use etherlink_protocol::Etherlink;
//!
//! let mut wire = heapless::Vec::<u8, 64>::new();
//! let mut ctx = Etherlink::new(
//!     |frame: &[u8]| {
//!         let _ = wire.extend_from_slice(frame);
//!     },
//!     |msg_type: u8, payload: &[u8]| {
//!         let _ = (msg_type, payload);
//!     },
//! );
//! ctx.send(0x01, &[]).unwrap();
//! ctx.consume_all(&[0xA5, 0x01, 0x00, 0x15]);
//! assert_eq!(ctx.stats().rx_frames, 1);
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod context;
pub mod crc;
pub mod frame;
pub mod messages;
pub mod parser;

pub use context::{Builder, Etherlink, FrameSink, InitError, MessageHandler, SendError, Stats};
pub use crc::{crc8, crc8_update};
pub use frame::{
    Frame, FrameError, FrameRef, FRAME_OVERHEAD, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, SYNC_BYTE,
};
pub use messages::{MessageClass, PayloadError, SystemMessage, TypedMessage};
pub use parser::{FrameParser, ParseState};
