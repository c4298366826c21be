//! Transport over a tokio byte stream.
//!
//! # Example
//!
//! ```
//! use console_link::protocol::ingress;
//! use console_link::transport::attach;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (console_side, _network_side) = tokio::io::duplex(1024);
//! let (port, reader) = ingress(1024);
//! let (transport, pump) = attach(console_side, port);
//! # drop((transport, reader));
//! # pump.abort();
//! # }
//! ```

use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::task::JoinHandle;

use super::Transport;
use crate::error::{LinkError, Result};
use crate::protocol::IngressPort;

/// Read chunk size for the receive pump.
const RX_CHUNK: usize = 64;

/// Write side of a byte stream.
pub struct StreamTransport<W> {
    writer: W,
}

impl<W> StreamTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W> Transport for StreamTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, bytes: &[u8], timeout: Duration) -> Result<()> {
        let writer = &mut self.writer;
        let write = async move {
            writer.write_all(bytes).await?;
            writer.flush().await
        };

        match tokio::time::timeout(timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => Err(LinkError::ConnectionClosed),
            Ok(Err(e)) => Err(LinkError::Io(e)),
            Err(_) => Err(LinkError::TransportTimeout(timeout)),
        }
    }
}

/// Spawn the receive pump: every byte read from `reader` goes through the
/// non-blocking producer side of the ingress ring.
///
/// Bytes the ring cannot take are dropped and counted by the ring. The task
/// ends with `Ok(())` on EOF.
pub fn spawn_rx_pump<R>(mut reader: R, port: IngressPort) -> JoinHandle<Result<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; RX_CHUNK];
        loop {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                tracing::debug!("Receive stream closed");
                return Ok(());
            }
            port.try_send_all(&chunk[..n]);
        }
    })
}

/// Split a bidirectional stream into a transport and a running receive pump.
pub fn attach<S>(
    stream: S,
    port: IngressPort,
) -> (StreamTransport<WriteHalf<S>>, JoinHandle<Result<()>>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let pump = spawn_rx_pump(read_half, port);
    (StreamTransport::new(write_half), pump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, ingress, MessageKind, FRAME_SIZE};
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_send_writes_whole_frame() {
        let (client, mut server) = duplex(1024);
        let mut transport = StreamTransport::new(client);

        let frame = build_frame(MessageKind::Heartbeat, &[]).unwrap();
        transport.send(&frame, Duration::from_secs(1)).await.unwrap();

        let mut buf = [0u8; FRAME_SIZE];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, frame);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_times_out_when_peer_stalls() {
        // Duplex buffer smaller than one frame and nobody reading.
        let (client, _server) = duplex(16);
        let mut transport = StreamTransport::new(client);

        let frame = build_frame(MessageKind::Heartbeat, &[]).unwrap();
        let result = transport.send(&frame, Duration::from_millis(100)).await;

        assert!(matches!(
            result,
            Err(LinkError::TransportTimeout(t)) if t == Duration::from_millis(100)
        ));
    }

    #[tokio::test]
    async fn test_send_after_peer_dropped() {
        let (client, server) = duplex(1024);
        let mut transport = StreamTransport::new(client);
        drop(server);

        let frame = build_frame(MessageKind::Ack, &[]).unwrap();
        let result = transport.send(&frame, Duration::from_secs(1)).await;

        assert!(matches!(result, Err(LinkError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_rx_pump_feeds_ring_and_stops_on_eof() {
        let (mut client, server) = duplex(1024);
        let (port, reader) = ingress(1024);
        let pump = spawn_rx_pump(server, port);

        client.write_all(&[1, 2, 3, 4]).await.unwrap();
        drop(client);

        pump.await.unwrap().unwrap();

        assert_eq!(reader.available(), 4);
        assert_eq!(reader.try_recv(), Some(1));
    }

    #[tokio::test]
    async fn test_rx_pump_counts_overflow() {
        let (mut client, server) = duplex(1024);
        let (port, reader) = ingress(8);
        let pump = spawn_rx_pump(server, port);

        client.write_all(&[0u8; 10]).await.unwrap();
        drop(client);
        pump.await.unwrap().unwrap();

        assert_eq!(reader.available(), 8);
        assert_eq!(reader.overflow_count(), 2);
    }

    #[tokio::test]
    async fn test_attach_round_trip() {
        let (a, b) = duplex(1024);
        let (port_a, reader_a) = ingress(1024);
        let (port_b, reader_b) = ingress(1024);
        let (mut tx_a, pump_a) = attach(a, port_a);
        let (mut tx_b, pump_b) = attach(b, port_b);

        tx_a.send(b"ping", Duration::from_secs(1)).await.unwrap();
        tx_b.send(b"pong!", Duration::from_secs(1)).await.unwrap();

        for _ in 0..500 {
            if reader_a.available() == 5 && reader_b.available() == 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert_eq!(reader_b.available(), 4);
        assert_eq!(reader_a.available(), 5);

        pump_a.abort();
        pump_b.abort();
    }
}
