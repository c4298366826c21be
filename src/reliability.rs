//! Reliability primitives layered on the frame path.
//!
//! This module provides the three pieces the engine uses to keep the two
//! nodes in step without a retransmission protocol:
//!
//! - [`AckSignal`]: binary wait primitive for the startup handshake. Any
//!   context may signal it; only the handshake waits on it.
//! - [`HeartbeatTimer`]: tells the poll loop when the next liveness frame is due.
//! - [`NetworkErrorMonitor`]: debounces link-loss notices so repeated
//!   notices inside the cooldown do not re-trigger the UI.
//!
//! # Configuration
//!
//! - Handshake timeout: [`DEFAULT_ACK_TIMEOUT`] (3s)
//! - Heartbeat interval: [`DEFAULT_HEARTBEAT_INTERVAL`] (30s)
//! - Error cooldown: [`DEFAULT_ERROR_COOLDOWN`] (5s)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Default time to wait for the handshake acknowledgement.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(3000);

/// Default heartbeat period.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Default window in which repeated link-loss notices are suppressed.
pub const DEFAULT_ERROR_COOLDOWN: Duration = Duration::from_millis(5000);

/// Outcome of a send that waits for an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    Acknowledged,
    TimedOut,
}

/// Binary semaphore signalled when an `Ack` arrives.
///
/// Signalling never blocks and holds at most one pending permit, so several
/// acks arriving before a wait collapse into one.
#[derive(Debug, Clone)]
pub struct AckSignal {
    permits: Arc<Semaphore>,
}

impl AckSignal {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
        }
    }

    /// Signal the waiter. Safe from any context.
    pub fn signal(&self) {
        if self.permits.available_permits() == 0 {
            self.permits.add_permits(1);
        }
    }

    /// Consume a pending signal without waiting.
    pub fn try_take(&self) -> bool {
        match self.permits.try_acquire() {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Drop any stale signal before starting a new wait.
    pub fn clear(&self) {
        while self.try_take() {}
    }

    /// Wait up to `timeout` for a signal. Returns whether one arrived.
    pub async fn wait(&self, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, self.permits.acquire()).await {
            Ok(Ok(permit)) => {
                permit.forget();
                true
            }
            // Closed semaphore or timeout
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.permits.available_permits() > 0
    }
}

impl Default for AckSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-interval heartbeat schedule.
#[derive(Debug, Clone)]
pub struct HeartbeatTimer {
    interval: Duration,
    last: Instant,
    enabled: bool,
}

impl HeartbeatTimer {
    /// The first heartbeat falls one interval after `start`.
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            interval: DEFAULT_HEARTBEAT_INTERVAL,
            last: Instant::now(),
            enabled: false,
        }
    }

    /// Whether a heartbeat is due at `now`.
    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        self.enabled && now.saturating_duration_since(self.last) >= self.interval
    }

    /// Record that a heartbeat went out at `now`.
    pub fn mark_sent(&mut self, now: Instant) {
        self.last = now;
    }

}

/// Debounced "network error" indicator for the UI layer.
#[derive(Debug, Clone)]
pub struct NetworkErrorMonitor {
    cooldown: Duration,
    last_report: Option<Instant>,
    active: bool,
    message: String,
}

impl NetworkErrorMonitor {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_report: None,
            active: false,
            message: String::new(),
        }
    }

    /// Report a link-loss notice.
    ///
    /// Returns `true` if the error was surfaced. A notice is suppressed only
    /// while an error is already showing and the previous surfaced report is
    /// younger than the cooldown.
    pub fn report(&mut self, now: Instant, message: &str) -> bool {
        if self.active {
            if let Some(last) = self.last_report {
                if now.saturating_duration_since(last) < self.cooldown {
                    return false;
                }
            }
        }
        self.last_report = Some(now);
        self.active = true;
        self.message = message.to_string();
        true
    }

    /// Clear on a connected status. Returns whether an error was active.
    pub fn clear(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.message.clear();
        was_active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reset(&mut self) {
        self.last_report = None;
        self.clear();
    }
}

impl Default for NetworkErrorMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_COOLDOWN)
    }
}
