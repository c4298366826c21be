//! Transport module - the byte link under the framer.
//!
//! The engine only needs two things from the link:
//! - a bounded-time [`Transport::send`] for outbound frames
//! - something that pushes each received byte into an [`IngressPort`]
//!
//! Host-side implementations:
//! - [`StreamTransport`] + [`spawn_rx_pump`] over any tokio byte stream
//!   (serial device, socket, `tokio::io::duplex`)
//! - [`LoopbackTransport`] wiring two engines together in one process
//!
//! [`IngressPort`]: crate::protocol::IngressPort

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

mod loopback;
mod stream;

pub use loopback::LoopbackTransport;
pub use stream::{attach, spawn_rx_pump, StreamTransport};

/// Outbound byte link with a bounded send.
///
/// A send either completes within `timeout` or fails with
/// [`LinkError::TransportBusy`], [`LinkError::TransportTimeout`] or
/// [`LinkError::Io`]. It is never retried by the caller.
///
/// [`LinkError::TransportBusy`]: crate::LinkError::TransportBusy
/// [`LinkError::TransportTimeout`]: crate::LinkError::TransportTimeout
/// [`LinkError::Io`]: crate::LinkError::Io
pub trait Transport: Send {
    fn send(&mut self, bytes: &[u8], timeout: Duration) -> impl Future<Output = Result<()>> + Send;
}
