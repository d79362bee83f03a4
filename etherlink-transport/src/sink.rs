//! Frame sinks over `embedded-io` writers

use embedded_io::Write;
use etherlink_protocol::FrameSink;

use crate::link::{LinkConfig, LinkSink, LinkState};

/// Sink that writes each frame in full, then flushes
///
/// Suitable for a UART TX half or any other byte-oriented writer.
pub struct IoSink<W> {
    writer: W,
}

impl<W: Write> IoSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Borrow the writer
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for IoSink<W> {
    type Error = W::Error;

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.writer.write_all(frame)?;
        self.writer.flush()
    }
}

/// Errors from a link-aware sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// No peer connected
    Disconnected,
    /// Writer failed
    Io(E),
}

/// Sink that splits frames into MTU-sized pieces
///
/// Mirrors BLE notifications, where one write carries at most
/// `mtu - att_overhead` bytes. The receiver's parser reassembles the pieces
/// because it is fed byte by byte.
///
/// The sink starts disconnected and refuses frames until a [`LinkMonitor`]
/// reports a connection. The MTU always follows the monitor.
///
/// [`LinkMonitor`]: crate::link::LinkMonitor
pub struct ChunkedSink<W> {
    writer: W,
    config: LinkConfig,
    state: LinkState,
}

impl<W: Write> ChunkedSink<W> {
    /// Wrap a writer
    pub fn new(writer: W, config: &LinkConfig) -> Self {
        Self {
            writer,
            config: *config,
            state: LinkState::Disconnected,
        }
    }

    /// Current MTU, or the default when disconnected
    pub fn mtu(&self) -> u16 {
        match self.state {
            LinkState::Connected { mtu } => mtu,
            LinkState::Disconnected => self.config.default_mtu,
        }
    }

    /// True while frames can be sent
    pub fn is_connected(&self) -> bool {
        matches!(self.state, LinkState::Connected { .. })
    }

    /// Largest piece written at once
    pub fn chunk_size(&self) -> usize {
        usize::from(self.mtu().saturating_sub(self.config.att_overhead)).max(1)
    }

    /// Borrow the writer
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for ChunkedSink<W> {
    type Error = LinkError<W::Error>;

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        if !self.is_connected() {
            warn!("TX while disconnected");
            return Err(LinkError::Disconnected);
        }
        for piece in frame.chunks(self.chunk_size()) {
            self.writer.write_all(piece).map_err(LinkError::Io)?;
        }
        self.writer.flush().map_err(LinkError::Io)
    }
}

impl<W: Write> LinkSink for ChunkedSink<W> {
    fn link_changed(&mut self, state: LinkState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::DEFAULT_MTU;
    use crate::testing::RecordingWriter;
    use etherlink_protocol::{Etherlink, SendError, MAX_FRAME_SIZE};

    #[test]
    fn test_io_sink_writes_whole_frame() {
        let sink = IoSink::new(RecordingWriter::default());
        let mut ctx = Etherlink::new(sink, |_: u8, _: &[u8]| {});
        ctx.send(0x01, &[]).unwrap();

        let writer = ctx.sink().writer();
        assert_eq!(writer.bytes, [0xA5, 0x01, 0x00, 0x15]);
        assert_eq!(writer.flushes, 1);
    }

    #[test]
    fn test_io_sink_into_slice() {
        let mut buf = [0u8; 8];
        {
            let mut sink = IoSink::new(&mut buf[..]);
            sink.write_frame(&[1, 2, 3]).unwrap();
        }
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_io_sink_error_propagates() {
        let mut buf = [0u8; 2];
        let mut ctx = Etherlink::new(IoSink::new(&mut buf[..]), |_: u8, _: &[u8]| {});
        assert!(ctx.send(0x10, &[1, 2, 3]).is_err());
        assert_eq!(ctx.stats().tx_frames, 0);
    }

    fn connected(mtu: u16) -> ChunkedSink<RecordingWriter> {
        let mut sink = ChunkedSink::new(RecordingWriter::default(), &LinkConfig::default());
        sink.link_changed(LinkState::Connected { mtu });
        sink
    }

    #[test]
    fn test_chunked_sink_default_mtu() {
        let mut sink = connected(DEFAULT_MTU);
        assert_eq!(sink.chunk_size(), 20);

        let frame = [0x5Au8; 45];
        sink.write_frame(&frame).unwrap();

        let writer = sink.writer();
        assert_eq!(writer.writes, [20, 20, 5]);
        assert_eq!(writer.bytes.len(), 45);
        assert_eq!(writer.flushes, 1);
    }

    #[test]
    fn test_chunked_sink_large_mtu_single_write() {
        let mut sink = connected(517);
        assert_eq!(sink.mtu(), 517);

        sink.write_frame(&[0u8; MAX_FRAME_SIZE]).unwrap();
        assert_eq!(sink.writer().writes, [MAX_FRAME_SIZE]);
    }

    #[test]
    fn test_chunked_sink_degenerate_mtu() {
        let mut sink = connected(2);
        assert_eq!(sink.chunk_size(), 1);
        sink.write_frame(&[1, 2, 3]).unwrap();
        assert_eq!(sink.writer().writes, [1, 1, 1]);
    }

    #[test]
    fn test_chunked_sink_refuses_while_disconnected() {
        let sink = ChunkedSink::new(RecordingWriter::default(), &LinkConfig::default());
        assert!(!sink.is_connected());
        assert_eq!(sink.mtu(), DEFAULT_MTU);

        let mut ctx = Etherlink::new(sink, |_: u8, _: &[u8]| {});
        assert_eq!(ctx.send(0x01, &[]), Err(SendError::Sink(LinkError::Disconnected)));
        assert_eq!(ctx.stats().tx_frames, 0);
        assert!(ctx.sink().writer().writes.is_empty());
    }

    #[test]
    fn test_chunked_sink_io_error() {
        let mut buf = [0u8; 2];
        let mut sink = ChunkedSink::new(&mut buf[..], &LinkConfig::default());
        sink.link_changed(LinkState::Connected { mtu: DEFAULT_MTU });
        assert!(matches!(sink.write_frame(&[1, 2, 3]), Err(LinkError::Io(_))));
    }
}
