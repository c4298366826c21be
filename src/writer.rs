//! Outbound framer.
//!
//! Builds a full 255-byte frame from a kind and payload and hands it to the
//! transport in one bounded send. There is no queueing and no retry: a
//! transport failure is counted and returned to the caller.
//!
//! # Architecture
//!
//! ```text
//! send_*() ─► build_frame() ─► Transport::send(frame, timeout) ─► link
//! ```

use std::time::Duration;

use crate::codec::WirePayload;
use crate::error::Result;
use crate::protocol::{build_frame, MessageKind};
use crate::transport::Transport;

/// Outbound counters kept by the writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterCounters {
    pub bytes_sent: u64,
    pub messages_sent: u64,
    pub send_errors: u64,
}

/// Frames payloads and sends them over a [`Transport`].
pub struct FrameWriter<T> {
    transport: T,
    counters: WriterCounters,
}

impl<T: Transport> FrameWriter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            counters: WriterCounters::default(),
        }
    }

    /// Frame `payload` as `kind` and send it within `timeout`.
    ///
    /// An oversized payload is rejected before anything reaches the link and
    /// does not count as a send error.
    pub async fn send_frame(
        &mut self,
        kind: MessageKind,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<()> {
        let frame = build_frame(kind, payload)?;

        match self.transport.send(&frame, timeout).await {
            Ok(()) => {
                self.counters.bytes_sent += frame.len() as u64;
                self.counters.messages_sent += 1;
                tracing::trace!("Sent {:?} frame ({} payload bytes)", kind, payload.len());
                Ok(())
            }
            Err(e) => {
                self.counters.send_errors += 1;
                tracing::warn!("Failed to send {:?} frame: {}", kind, e);
                Err(e)
            }
        }
    }

    /// Encode and send a typed payload under its own kind.
    pub async fn send_payload<P: WirePayload>(&mut self, payload: &P, timeout: Duration) -> Result<()> {
        let bytes = payload.encode();
        self.send_frame(P::KIND, &bytes, timeout).await
    }

    /// Send a frame with no payload (Ack, Nack, Heartbeat).
    pub async fn send_empty(&mut self, kind: MessageKind, timeout: Duration) -> Result<()> {
        self.send_frame(kind, &[], timeout).await
    }

    pub fn counters(&self) -> WriterCounters {
        self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters = WriterCounters::default();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ChatMessage;
    use crate::error::LinkError;
    use crate::protocol::{ingress, Frame, FRAME_SIZE, MAX_PAYLOAD_SIZE};
    use crate::transport::LoopbackTransport;

    const TIMEOUT: Duration = Duration::from_millis(100);

    fn read_frame(reader: &crate::protocol::IngressReader) -> [u8; FRAME_SIZE] {
        let mut raw = [0u8; FRAME_SIZE];
        for slot in raw.iter_mut() {
            *slot = reader.try_recv().unwrap();
        }
        raw
    }

    #[tokio::test]
    async fn test_send_payload_frames_correctly() {
        let (port, reader) = ingress(1024);
        let mut writer = FrameWriter::new(LoopbackTransport::new(port));

        let chat = ChatMessage::new("gg", "alice", "lobby", 3);
        writer.send_payload(&chat, TIMEOUT).await.unwrap();

        assert_eq!(reader.available(), FRAME_SIZE);
        let frame = Frame::decode(&read_frame(&reader)).unwrap();
        assert_eq!(frame.kind(), MessageKind::Chat);
        assert_eq!(ChatMessage::decode(frame.payload()).unwrap(), chat);

        let counters = writer.counters();
        assert_eq!(counters.bytes_sent, FRAME_SIZE as u64);
        assert_eq!(counters.messages_sent, 1);
        assert_eq!(counters.send_errors, 0);
    }

    #[tokio::test]
    async fn test_empty_frame() {
        let (port, reader) = ingress(1024);
        let mut writer = FrameWriter::new(LoopbackTransport::new(port));

        writer.send_empty(MessageKind::Heartbeat, TIMEOUT).await.unwrap();

        let frame = Frame::decode(&read_frame(&reader)).unwrap();
        assert_eq!(frame.kind(), MessageKind::Heartbeat);
        assert_eq!(frame.payload_len(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_counted_and_returned() {
        let (port, reader) = ingress(1024);
        let mut transport = LoopbackTransport::new(port);
        transport.set_busy(true);
        let mut writer = FrameWriter::new(transport);

        let result = writer.send_empty(MessageKind::Ack, TIMEOUT).await;

        assert!(matches!(result, Err(LinkError::TransportBusy)));
        assert_eq!(writer.counters().send_errors, 1);
        assert_eq!(writer.counters().messages_sent, 0);
        assert_eq!(reader.available(), 0);
    }

    #[tokio::test]
    async fn test_oversized_payload_rejected_before_send() {
        let (port, reader) = ingress(1024);
        let mut writer = FrameWriter::new(LoopbackTransport::new(port));

        let result = writer
            .send_frame(MessageKind::Data, &[0u8; MAX_PAYLOAD_SIZE + 1], TIMEOUT)
            .await;

        assert!(matches!(result, Err(LinkError::PayloadTooLarge { .. })));
        assert_eq!(writer.counters(), WriterCounters::default());
        assert_eq!(reader.available(), 0);
    }

    #[tokio::test]
    async fn test_reset_counters() {
        let (port, _reader) = ingress(1024);
        let mut writer = FrameWriter::new(LoopbackTransport::new(port));

        writer.send_empty(MessageKind::Nack, TIMEOUT).await.unwrap();
        writer.reset_counters();

        assert_eq!(writer.counters(), WriterCounters::default());
    }
}
