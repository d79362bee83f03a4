//! Protocol context
//!
//! [`Etherlink`] ties a [`FrameParser`] to the two collaborators supplied by
//! the application: a [`FrameSink`] that puts bytes on the wire and a
//! [`MessageHandler`] that receives validated messages. It also keeps the
//! receive/transmit statistics.
//!
//! The context is single-threaded. Bytes arriving from an interrupt or a
//! second task must be funnelled into one caller of [`Etherlink::consume`].
//! The handler runs inline, before `consume` returns, so it should be short.

use core::convert::Infallible;

use serde::Serialize;

use crate::frame::{encode_into, Frame, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
use crate::messages::TypedMessage;
use crate::parser::{FrameParser, ParseState};

/// Destination for encoded frames (UART TX, BLE notify, ...)
pub trait FrameSink {
    /// Error type reported by the transport
    type Error;

    /// Transmit one complete frame
    ///
    /// Called exactly once per successful send with the whole frame.
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
}

impl<F> FrameSink for F
where
    F: FnMut(&[u8]),
{
    type Error = Infallible;

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self(frame);
        Ok(())
    }
}

/// Receiver for validated messages
pub trait MessageHandler {
    /// Called once per frame that passed the checksum
    ///
    /// `payload` points into the parser's buffer and is only valid for the
    /// duration of the call.
    fn on_message(&mut self, msg_type: u8, payload: &[u8]);
}

impl<F> MessageHandler for F
where
    F: FnMut(u8, &[u8]),
{
    fn on_message(&mut self, msg_type: u8, payload: &[u8]) {
        self(msg_type, payload)
    }
}

/// Frame statistics
///
/// Counters only go up (saturating) and survive [`Etherlink::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    /// Frames received with a valid checksum
    pub rx_frames: u32,
    /// Frames rejected (bad length or checksum)
    pub rx_errors: u32,
    /// Frames handed to the sink
    pub tx_frames: u32,
}

/// Errors returned by the send functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]; nothing was written
    PayloadTooLarge { len: usize },
    /// Typed payload could not be serialized into a single frame
    Encode,
    /// The sink failed to take the frame
    Sink(E),
}

/// Errors returned by [`Builder::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// No frame sink was supplied
    MissingSink,
    /// No message handler was supplied
    MissingHandler,
}

/// Builder for an [`Etherlink`] context
pub struct Builder<S, H> {
    sink: Option<S>,
    handler: Option<H>,
}

impl<S, H> Default for Builder<S, H> {
    fn default() -> Self {
        Self {
            sink: None,
            handler: None,
        }
    }
}

impl<S: FrameSink, H: MessageHandler> Builder<S, H> {
    /// Set the byte sink used for transmission
    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the handler for received messages
    pub fn on_message(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Build the context
    ///
    /// Fails if either collaborator is missing.
    pub fn build(self) -> Result<Etherlink<S, H>, InitError> {
        let sink = self.sink.ok_or(InitError::MissingSink)?;
        let handler = self.handler.ok_or(InitError::MissingHandler)?;
        Ok(Etherlink::new(sink, handler))
    }
}

/// One protocol endpoint
pub struct Etherlink<S, H> {
    parser: FrameParser,
    sink: S,
    handler: H,
    stats: Stats,
}

impl<S: FrameSink, H: MessageHandler> Etherlink<S, H> {
    /// Create a context in the idle state with zeroed counters
    pub fn new(sink: S, handler: H) -> Self {
        Self {
            parser: FrameParser::new(),
            sink,
            handler,
            stats: Stats::default(),
        }
    }

    /// Start a [`Builder`]
    pub fn builder() -> Builder<S, H> {
        Builder::default()
    }

    /// Drop any partial frame (call on disconnect/reconnect)
    ///
    /// Statistics are kept.
    pub fn reset(&mut self) {
        if !self.parser.is_idle() {
            debug!("Parser reset mid-frame");
        }
        self.parser.reset();
    }

    /// Process one received byte
    ///
    /// Rejected frames are counted in [`Stats::rx_errors`] and never reach
    /// the handler.
    pub fn consume(&mut self, byte: u8) {
        match self.parser.feed(byte) {
            Ok(Some(frame)) => {
                trace!("RX type={:#x} len={}", frame.msg_type, frame.payload.len());
                self.handler.on_message(frame.msg_type, frame.payload);
                self.stats.rx_frames = self.stats.rx_frames.saturating_add(1);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Frame rejected: {:?}", e);
                self.stats.rx_errors = self.stats.rx_errors.saturating_add(1);
            }
        }
    }

    /// Process received bytes in order
    pub fn consume_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.consume(byte);
        }
    }

    /// Encode and transmit a message
    ///
    /// The whole frame goes to the sink in a single call. On error nothing is
    /// counted as sent.
    pub fn send(&mut self, msg_type: u8, payload: &[u8]) -> Result<(), SendError<S::Error>> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            warn!("TX payload too large: {}", payload.len());
            return Err(SendError::PayloadTooLarge { len: payload.len() });
        }

        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = encode_into(msg_type, payload, &mut buffer)
            .map_err(|_| SendError::PayloadTooLarge { len: payload.len() })?;

        self.sink.write_frame(&buffer[..len]).map_err(SendError::Sink)?;
        self.stats.tx_frames = self.stats.tx_frames.saturating_add(1);
        trace!("TX type={:#x} len={}", msg_type, payload.len());
        Ok(())
    }

    /// Transmit an owned frame
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), SendError<S::Error>> {
        self.send(frame.msg_type, &frame.payload)
    }

    /// Serialize `value` with postcard and send it as `msg_type`
    pub fn send_message<T>(&mut self, msg_type: u8, value: &T) -> Result<(), SendError<S::Error>>
    where
        T: Serialize + ?Sized,
    {
        let mut buffer = [0u8; MAX_PAYLOAD_SIZE];
        let payload = postcard::to_slice(value, &mut buffer).map_err(|_| SendError::Encode)?;
        self.send(msg_type, payload)
    }

    /// Send a [`TypedMessage`] under its own message type
    pub fn send_typed<T: TypedMessage>(&mut self, value: &T) -> Result<(), SendError<S::Error>> {
        self.send_message(T::MSG_TYPE, value)
    }

    /// Snapshot of the frame counters
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Current parser state
    pub fn parser_state(&self) -> ParseState {
        self.parser.state()
    }

    /// True when no frame is in progress
    pub fn is_idle(&self) -> bool {
        self.parser.is_idle()
    }

    /// Borrow the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the sink (e.g. to update a negotiated MTU)
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Borrow the message handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutably borrow the message handler
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Tear down the context and give back the collaborators
    pub fn into_parts(self) -> (S, H) {
        (self.sink, self.handler)
    }
}
