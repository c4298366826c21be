//! In-process transport delivering straight into a peer's ingress ring.

use std::time::Duration;

use super::Transport;
use crate::error::{LinkError, Result};
use crate::protocol::IngressPort;

/// Hands every sent byte to the peer's byte-received notification.
///
/// Delivery is synchronous: when `send` returns, the bytes are in the
/// peer's ring (or counted there as overflow).
#[derive(Debug)]
pub struct LoopbackTransport {
    peer: IngressPort,
    busy: bool,
}

impl LoopbackTransport {
    pub fn new(peer: IngressPort) -> Self {
        Self { peer, busy: false }
    }

    /// Simulate a transmitter that is still busy; sends fail until cleared.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn peer(&self) -> &IngressPort {
        &self.peer
    }
}

impl Transport for LoopbackTransport {
    async fn send(&mut self, bytes: &[u8], _timeout: Duration) -> Result<()> {
        if self.busy {
            return Err(LinkError::TransportBusy);
        }
        self.peer.try_send_all(bytes);
        Ok(())
    }
}
