//! Receive pump
//!
//! Reads whatever the transport has buffered and feeds it to the parser in
//! arrival order. The pump owns the scratch buffer so a receive task needs
//! no other state.

use embedded_io::Error as _;
use etherlink_protocol::{Etherlink, FrameSink, MessageHandler};

/// Default scratch buffer size for one read
pub const DEFAULT_RX_BUF: usize = 64;

/// Byte pump from a reader into an [`Etherlink`] context
pub struct RxPump<const N: usize = DEFAULT_RX_BUF> {
    buf: [u8; N],
}

impl<const N: usize> Default for RxPump<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RxPump<N> {
    /// Create a pump with an `N` byte read buffer
    pub const fn new() -> Self {
        Self { buf: [0u8; N] }
    }

    /// Do one read and consume the bytes
    ///
    /// Returns the number of bytes read. Zero means the reader had nothing
    /// (or reached end of stream).
    pub fn poll<R, S, H>(&mut self, reader: &mut R, ctx: &mut Etherlink<S, H>) -> Result<usize, R::Error>
    where
        R: embedded_io::Read,
        S: FrameSink,
        H: MessageHandler,
    {
        match reader.read(&mut self.buf) {
            Ok(n) => {
                if n > 0 {
                    trace!("RX: {} bytes", n);
                    ctx.consume_all(&self.buf[..n]);
                }
                Ok(n)
            }
            Err(e) => {
                warn!("Read error: {:?}", e.kind());
                Err(e)
            }
        }
    }

    /// Read until the reader reports end of stream
    ///
    /// Returns the total number of bytes consumed.
    pub fn drain<R, S, H>(&mut self, reader: &mut R, ctx: &mut Etherlink<S, H>) -> Result<usize, R::Error>
    where
        R: embedded_io::Read,
        S: FrameSink,
        H: MessageHandler,
    {
        let mut total = 0;
        loop {
            match self.poll(reader, ctx)? {
                0 => return Ok(total),
                n => total += n,
            }
        }
    }

    /// Async variant of [`RxPump::poll`]
    pub async fn poll_async<R, S, H>(
        &mut self,
        reader: &mut R,
        ctx: &mut Etherlink<S, H>,
    ) -> Result<usize, R::Error>
    where
        R: embedded_io_async::Read,
        S: FrameSink,
        H: MessageHandler,
    {
        match reader.read(&mut self.buf).await {
            Ok(n) => {
                if n > 0 {
                    trace!("RX: {} bytes", n);
                    ctx.consume_all(&self.buf[..n]);
                }
                Ok(n)
            }
            Err(e) => {
                warn!("Read error: {:?}", e.kind());
                Err(e)
            }
        }
    }

    /// Async variant of [`RxPump::drain`]
    pub async fn drain_async<R, S, H>(
        &mut self,
        reader: &mut R,
        ctx: &mut Etherlink<S, H>,
    ) -> Result<usize, R::Error>
    where
        R: embedded_io_async::Read,
        S: FrameSink,
        H: MessageHandler,
    {
        let mut total = 0;
        loop {
            match self.poll_async(reader, ctx).await? {
                0 => return Ok(total),
                n => total += n,
            }
        }
    }
}
