//! Error types for console-link.

use std::time::Duration;

use thiserror::Error;

use crate::protocol::MessageKind;

/// Main error type for all link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// I/O error from a stream transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config and diagnostics only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The transport is still busy with a previous transmission.
    #[error("Transport busy")]
    TransportBusy,

    /// The transport did not finish the transmission in time.
    #[error("Transport timed out after {0:?}")]
    TransportTimeout(Duration),

    /// Payload does not fit in the frame payload area.
    #[error("Payload of {len} bytes exceeds the {max} byte payload area")]
    PayloadTooLarge { len: usize, max: usize },

    /// Typed payload could not be decoded.
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Operation requires an initialized engine.
    #[error("Engine not initialized")]
    NotInitialized,

    /// Peer side of a host transport went away.
    #[error("Connection closed")]
    ConnectionClosed,
}

/// Structural frame validation failure.
///
/// These indicate transmission corruption. The frame is dropped and the
/// parse error counter incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("Bad start marker 0x{0:02X}")]
    BadStartMarker(u8),

    #[error("Bad end marker 0x{0:02X}")]
    BadEndMarker(u8),

    #[error("Unknown message kind 0x{0:02X}")]
    UnknownKind(u8),

    #[error("Declared length {0} exceeds maximum")]
    LengthOutOfRange(u8),

    #[error("Checksum mismatch: frame carries 0x{expected:02X}, computed 0x{computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },
}

/// Semantic payload failure: the frame was intact but its contents do not
/// match what its kind requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("{kind:?} payload must be {expected} bytes, got {actual}")]
    LengthMismatch {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },
}

/// Result type alias using LinkError.
pub type Result<T> = std::result::Result<T, LinkError>;
