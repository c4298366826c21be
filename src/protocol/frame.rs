//! Frame struct with typed accessors.
//!
//! A [`Frame`] is the validated, decoded form of one fixed-size wire frame.
//! It keeps the whole payload area inline so frames can sit in the inbound
//! queue without heap allocation.
//!
//! # Example
//!
//! ```
//! use console_link::protocol::{build_frame, Frame, MessageKind, FRAME_SIZE};
//!
//! let raw = build_frame(MessageKind::Chat, b"hello").unwrap();
//! assert_eq!(raw.len(), FRAME_SIZE);
//!
//! let frame = Frame::decode(&raw).unwrap();
//! assert_eq!(frame.kind(), MessageKind::Chat);
//! assert_eq!(frame.payload(), b"hello");
//! ```

use super::wire_format::{
    checksum, validate_frame, MessageKind, CHECKSUM_OFFSET, END_MARKER, END_OFFSET, FRAME_SIZE,
    KIND_OFFSET, LENGTH_OFFSET, MAX_PAYLOAD_SIZE, PAYLOAD_OFFSET, START_MARKER,
};
use crate::error::{FrameError, LinkError, Result};

/// A complete, validated protocol frame.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    kind: MessageKind,
    length: u8,
    payload: [u8; MAX_PAYLOAD_SIZE],
}

impl Frame {
    /// Create a frame from a kind and payload bytes.
    ///
    /// Fails if the payload does not fit in the payload area.
    pub fn new(kind: MessageKind, payload: &[u8]) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(LinkError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let mut area = [0u8; MAX_PAYLOAD_SIZE];
        area[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            kind,
            length: payload.len() as u8,
            payload: area,
        })
    }

    /// Create a frame with an empty payload.
    pub fn empty(kind: MessageKind) -> Self {
        Self {
            kind,
            length: 0,
            payload: [0u8; MAX_PAYLOAD_SIZE],
        }
    }

    /// Validate and decode a raw wire frame.
    pub fn decode(raw: &[u8; FRAME_SIZE]) -> std::result::Result<Self, FrameError> {
        validate_frame(raw)?;

        let kind = MessageKind::from_u8(raw[KIND_OFFSET])
            .ok_or(FrameError::UnknownKind(raw[KIND_OFFSET]))?;
        let mut payload = [0u8; MAX_PAYLOAD_SIZE];
        payload.copy_from_slice(&raw[PAYLOAD_OFFSET..CHECKSUM_OFFSET]);

        Ok(Self {
            kind,
            length: raw[LENGTH_OFFSET],
            payload,
        })
    }

    /// Encode into the fixed-size wire representation.
    pub fn encode(&self) -> [u8; FRAME_SIZE] {
        let mut raw = [0u8; FRAME_SIZE];
        raw[0] = START_MARKER;
        raw[KIND_OFFSET] = self.kind.as_u8();
        raw[LENGTH_OFFSET] = self.length;
        raw[PAYLOAD_OFFSET..CHECKSUM_OFFSET].copy_from_slice(&self.payload);
        raw[CHECKSUM_OFFSET] = checksum(&raw[..CHECKSUM_OFFSET]);
        raw[END_OFFSET] = END_MARKER;
        raw
    }

    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// The meaningful part of the payload area (first `length` bytes).
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.length as usize]
    }

    /// Declared payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.length as usize
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("kind", &self.kind)
            .field("length", &self.length)
            .finish()
    }
}

/// Build a complete wire frame from a kind and payload.
///
/// The payload area is always transmitted in full; bytes past the payload
/// are zero.
pub fn build_frame(kind: MessageKind, payload: &[u8]) -> Result<[u8; FRAME_SIZE]> {
    Ok(Frame::new(kind, payload)?.encode())
}
