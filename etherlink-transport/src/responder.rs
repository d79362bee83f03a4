//! Automatic answers to system messages
//!
//! Pulls frames off a [`MessageQueue`](crate::queue::MessageQueue) channel,
//! answers `PING` with `PONG` and a version query with
//! [`PROTOCOL_VERSION`], and hands every other frame to the caller.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use etherlink_protocol::messages::{MSG_PONG, MSG_VERSION, PROTOCOL_VERSION};
use etherlink_protocol::{Etherlink, Frame, FrameSink, MessageHandler, SendError, SystemMessage};

/// Drains queued frames and replies to system requests
pub struct Responder<'a, M: RawMutex, const N: usize> {
    channel: &'a Channel<M, Frame, N>,
    answered: u32,
}

impl<'a, M: RawMutex, const N: usize> Responder<'a, M, N> {
    /// Read from `channel`
    pub fn new(channel: &'a Channel<M, Frame, N>) -> Self {
        Self {
            channel,
            answered: 0,
        }
    }

    /// Requests answered so far
    pub fn answered(&self) -> u32 {
        self.answered
    }

    /// Answer `frame` if it is a system request
    ///
    /// Returns the frame back when it is meant for the application.
    pub fn answer<S, H>(
        &mut self,
        ctx: &mut Etherlink<S, H>,
        frame: Frame,
    ) -> Result<Option<Frame>, SendError<S::Error>>
    where
        S: FrameSink,
        H: MessageHandler,
    {
        match SystemMessage::from_frame(frame.view()) {
            Ok(SystemMessage::Ping) => {
                trace!("PING received");
                ctx.send(MSG_PONG, &[])?;
            }
            Ok(SystemMessage::VersionQuery) => {
                debug!("Version query received");
                let (major, minor) = PROTOCOL_VERSION;
                ctx.send(MSG_VERSION, &[major, minor])?;
            }
            _ => return Ok(Some(frame)),
        }
        self.answered = self.answered.saturating_add(1);
        Ok(None)
    }

    /// Process queued frames without waiting
    ///
    /// Returns the first application frame, or `None` once the queue is empty.
    pub fn poll<S, H>(&mut self, ctx: &mut Etherlink<S, H>) -> Result<Option<Frame>, SendError<S::Error>>
    where
        S: FrameSink,
        H: MessageHandler,
    {
        while let Ok(frame) = self.channel.try_receive() {
            if let Some(frame) = self.answer(ctx, frame)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Wait for the next application frame, answering system requests meanwhile
    pub async fn next<S, H>(&mut self, ctx: &mut Etherlink<S, H>) -> Result<Frame, SendError<S::Error>>
    where
        S: FrameSink,
        H: MessageHandler,
    {
        loop {
            let frame = self.channel.receive().await;
            if let Some(frame) = self.answer(ctx, frame)? {
                return Ok(frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::MessageQueue;
    use crate::sink::IoSink;
    use crate::testing::RecordingWriter;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use etherlink_protocol::messages::MSG_PING;

    fn encoded(frame: Frame) -> heapless::Vec<u8, 254> {
        frame.encode_to_vec().unwrap()
    }

    #[test]
    fn test_ping_answered_with_pong() {
        let channel: Channel<NoopRawMutex, Frame, 4> = Channel::new();
        let mut ctx = Etherlink::new(IoSink::new(RecordingWriter::default()), MessageQueue::new(&channel));
        let mut responder = Responder::new(&channel);

        ctx.consume_all(&encoded(Frame::empty(MSG_PING)));
        assert_eq!(responder.poll(&mut ctx), Ok(None));

        assert_eq!(responder.answered(), 1);
        assert_eq!(ctx.stats().tx_frames, 1);
        assert_eq!(ctx.sink().writer().bytes, [0xA5, 0x01, 0x00, 0x15]);
    }

    #[test]
    fn test_version_query_answered() {
        let channel: Channel<NoopRawMutex, Frame, 4> = Channel::new();
        let mut ctx = Etherlink::new(IoSink::new(RecordingWriter::default()), MessageQueue::new(&channel));
        let mut responder = Responder::new(&channel);

        ctx.consume_all(&encoded(SystemMessage::VersionQuery.to_frame().unwrap()));
        assert_eq!(responder.poll(&mut ctx), Ok(None));

        let reply = &ctx.sink().writer().bytes;
        let (major, minor) = PROTOCOL_VERSION;
        assert_eq!(&reply[..5], &[0xA5, MSG_VERSION, 2, major, minor]);
    }

    #[test]
    fn test_application_frames_passed_through() {
        let channel: Channel<NoopRawMutex, Frame, 4> = Channel::new();
        let mut ctx = Etherlink::new(IoSink::new(RecordingWriter::default()), MessageQueue::new(&channel));
        let mut responder = Responder::new(&channel);

        ctx.consume_all(&encoded(Frame::empty(MSG_PING)));
        ctx.consume_all(&encoded(Frame::new(0x20, &[9]).unwrap()));
        ctx.consume_all(&encoded(Frame::empty(MSG_PONG)));

        let app = responder.poll(&mut ctx).unwrap().unwrap();
        assert_eq!(app.msg_type, 0x20);
        // Pong is a reply, not a request: it goes to the application too
        let pong = responder.poll(&mut ctx).unwrap().unwrap();
        assert_eq!(pong.msg_type, MSG_PONG);
        assert_eq!(responder.poll(&mut ctx), Ok(None));
        assert_eq!(responder.answered(), 1);
    }

    #[test]
    fn test_next_async() {
        let channel: Channel<NoopRawMutex, Frame, 4> = Channel::new();
        let mut ctx = Etherlink::new(IoSink::new(RecordingWriter::default()), MessageQueue::new(&channel));
        let mut responder = Responder::new(&channel);

        ctx.consume_all(&encoded(Frame::empty(MSG_PING)));
        ctx.consume_all(&encoded(Frame::new(0x90, &[1, 2]).unwrap()));

        let frame = block_on(responder.next(&mut ctx)).unwrap();
        assert_eq!(frame.msg_type, 0x90);
        assert_eq!(ctx.stats().tx_frames, 1);
    }
}
