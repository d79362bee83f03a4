//! Etherlink transport glue
//!
//! Connects the framing engine in `etherlink-protocol` to byte streams
//! described by the `embedded-io` traits:
//!
//! - [`IoSink`], [`ChunkedSink`] - frame sinks for UART-like and
//!   MTU-limited (BLE notification) writers
//! - [`RxPump`] - blocking and async receive loops
//! - [`LinkMonitor`] - connect/disconnect tracking that resets the parser
//!   and keeps a [`LinkSink`] in step with the link
//! - [`MessageQueue`], [`Responder`] - bounded hand-off of received
//!   messages to another task, with automatic PING/version replies
//!
//! Chip drivers and BLE stack setup stay in the application.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod link;
pub mod queue;
pub mod responder;
pub mod rx;
pub mod sink;

#[cfg(test)]
mod testing;

pub use link::{LinkConfig, LinkMonitor, LinkSink, LinkState};
pub use queue::MessageQueue;
pub use responder::Responder;
pub use rx::RxPump;
pub use sink::{ChunkedSink, IoSink, LinkError};
