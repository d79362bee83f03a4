//! Bounded queue of received messages
//!
//! Decouples message processing from the receive path. The parser only
//! copies each validated frame into an `embassy-sync` channel; a separate
//! task drains it. When the channel is full the newest message is dropped
//! and counted.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use etherlink_protocol::{Frame, FrameRef, MessageHandler};

/// [`MessageHandler`] that forwards owned frames into a channel
pub struct MessageQueue<'a, M: RawMutex, const N: usize> {
    channel: &'a Channel<M, Frame, N>,
    dropped: u32,
}

impl<'a, M: RawMutex, const N: usize> MessageQueue<'a, M, N> {
    /// Forward into `channel`
    pub fn new(channel: &'a Channel<M, Frame, N>) -> Self {
        Self {
            channel,
            dropped: 0,
        }
    }

    /// Messages lost because the channel was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<M: RawMutex, const N: usize> MessageHandler for MessageQueue<'_, M, N> {
    fn on_message(&mut self, msg_type: u8, payload: &[u8]) {
        let Ok(frame) = (FrameRef { msg_type, payload }).to_owned_frame() else {
            self.dropped = self.dropped.saturating_add(1);
            warn!("Payload of type {:#x} too large to queue", msg_type);
            return;
        };
        if self.channel.try_send(frame).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            warn!("Message queue full, dropping type {:#x}", msg_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use etherlink_protocol::Etherlink;

    #[test]
    fn test_frames_queued_in_order() {
        let channel: Channel<NoopRawMutex, Frame, 4> = Channel::new();
        let mut ctx = Etherlink::new(|_: &[u8]| {}, MessageQueue::new(&channel));

        ctx.consume_all(&Frame::new(0x10, &[1]).unwrap().encode_to_vec().unwrap());
        ctx.consume_all(&Frame::new(0x11, &[2, 3]).unwrap().encode_to_vec().unwrap());

        let first = channel.try_receive().unwrap();
        assert_eq!(first.msg_type, 0x10);
        assert_eq!(&first.payload[..], &[1]);

        let second = block_on(channel.receive());
        assert_eq!(second.msg_type, 0x11);
        assert_eq!(&second.payload[..], &[2, 3]);

        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn test_overflow_counts_drops() {
        let channel: Channel<NoopRawMutex, Frame, 2> = Channel::new();
        let mut ctx = Etherlink::new(|_: &[u8]| {}, MessageQueue::new(&channel));

        let ping = Frame::empty(0x00).encode_to_vec().unwrap();
        for _ in 0..5 {
            ctx.consume_all(&ping);
        }

        // The parser accepted all five; the queue kept two
        assert_eq!(ctx.stats().rx_frames, 5);
        assert_eq!(ctx.handler().dropped(), 3);
        assert_eq!(channel.len(), 2);
    }

    #[test]
    fn test_oversized_payload_dropped() {
        let channel: Channel<NoopRawMutex, Frame, 2> = Channel::new();
        let mut queue = MessageQueue::new(&channel);

        queue.on_message(0x10, &[0u8; 251]);

        assert_eq!(queue.dropped(), 1);
        assert!(channel.try_receive().is_err());
    }
}
