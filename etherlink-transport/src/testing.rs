//! Host-side doubles for transport tests

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_io::ErrorType;

/// Writer that records every write call
#[derive(Default)]
pub struct RecordingWriter {
    pub bytes: Vec<u8>,
    pub writes: Vec<usize>,
    pub flushes: usize,
}

impl ErrorType for RecordingWriter {
    type Error = Infallible;
}

impl embedded_io::Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.bytes.extend_from_slice(buf);
        self.writes.push(buf.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// Reader that hands out pre-arranged chunks, then reports end of stream
pub struct ChunkReader {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkReader {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
        }
    }

    fn next_chunk(&mut self, buf: &mut [u8]) -> usize {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return 0;
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        n
    }
}

impl ErrorType for ChunkReader {
    type Error = Infallible;
}

impl embedded_io::Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.next_chunk(buf))
    }
}

impl embedded_io_async::Read for ChunkReader {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.next_chunk(buf))
    }
}

/// Reader whose every read fails
pub struct FailingReader;

impl ErrorType for FailingReader {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Err(embedded_io::ErrorKind::Other)
    }
}

/// Handler that records every message
#[derive(Default)]
pub struct Inbox {
    pub messages: Vec<(u8, Vec<u8>)>,
}

impl etherlink_protocol::MessageHandler for Inbox {
    fn on_message(&mut self, msg_type: u8, payload: &[u8]) {
        self.messages.push((msg_type, payload.to_vec()));
    }
}
