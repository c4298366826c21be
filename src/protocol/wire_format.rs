//! Wire format constants, message kinds, checksum and validation.
//!
//! Every frame has the same size on the wire, whatever its declared length:
//! ```text
//! ┌───────┬──────┬────────┬──────────────┬──────────┬─────┐
//! │ Start │ Kind │ Length │ Payload area │ Checksum │ End │
//! │ 1     │ 1    │ 1      │ 250          │ 1        │ 1   │
//! │ 0xAA  │      │ 0..250 │ zero padded  │ XOR      │0x55 │
//! └───────┴──────┴────────┴──────────────┴──────────┴─────┘
//! ```
//!
//! The checksum is the exclusive-OR of every byte before it. It catches any
//! single flipped byte but not two identical flips in the same bit position,
//! nor transposed bytes. Both nodes must agree on it, so changing it means
//! bumping the protocol.

use crate::codec::{
    ChatMessage, CommandMessage, ConnectionMessage, GameData, StatusMessage, TileSizeValidation,
    WirePayload,
};
use crate::error::FrameError;

/// Start-of-frame marker.
pub const START_MARKER: u8 = 0xAA;

/// End-of-frame marker.
pub const END_MARKER: u8 = 0x55;

/// Size of the payload area (and maximum declared length).
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Total frame size on the wire (fixed, exactly 255).
pub const FRAME_SIZE: usize = 3 + MAX_PAYLOAD_SIZE + 2;

/// Offset of the message kind byte.
pub const KIND_OFFSET: usize = 1;

/// Offset of the declared length byte.
pub const LENGTH_OFFSET: usize = 2;

/// Offset of the first payload byte.
pub const PAYLOAD_OFFSET: usize = 3;

/// Offset of the checksum byte.
pub const CHECKSUM_OFFSET: usize = PAYLOAD_OFFSET + MAX_PAYLOAD_SIZE;

/// Offset of the end marker.
pub const END_OFFSET: usize = CHECKSUM_OFFSET + 1;

/// Closed set of message kinds carried by the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Data = 0x01,
    Command = 0x02,
    Status = 0x03,
    Connection = 0x04,
    Ack = 0x05,
    Nack = 0x06,
    Heartbeat = 0x07,
    Chat = 0x08,
    TileSizeValidation = 0x09,
}

impl MessageKind {
    /// All kinds, in wire order.
    pub const ALL: [MessageKind; 9] = [
        MessageKind::Data,
        MessageKind::Command,
        MessageKind::Status,
        MessageKind::Connection,
        MessageKind::Ack,
        MessageKind::Nack,
        MessageKind::Heartbeat,
        MessageKind::Chat,
        MessageKind::TileSizeValidation,
    ];

    /// Decode a kind byte. Accepts the full range `Data..=TileSizeValidation`.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(MessageKind::Data),
            0x02 => Some(MessageKind::Command),
            0x03 => Some(MessageKind::Status),
            0x04 => Some(MessageKind::Connection),
            0x05 => Some(MessageKind::Ack),
            0x06 => Some(MessageKind::Nack),
            0x07 => Some(MessageKind::Heartbeat),
            0x08 => Some(MessageKind::Chat),
            0x09 => Some(MessageKind::TileSizeValidation),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Exact payload length a frame of this kind must declare.
    pub fn expected_payload_len(self) -> usize {
        match self {
            MessageKind::Data => GameData::SIZE,
            MessageKind::Command => CommandMessage::SIZE,
            MessageKind::Status => StatusMessage::SIZE,
            MessageKind::Connection => ConnectionMessage::SIZE,
            MessageKind::Chat => ChatMessage::SIZE,
            MessageKind::TileSizeValidation => TileSizeValidation::SIZE,
            MessageKind::Ack | MessageKind::Nack | MessageKind::Heartbeat => 0,
        }
    }

    /// Whether receipt of this kind is answered with an automatic `Ack`.
    pub fn is_auto_acked(self) -> bool {
        matches!(
            self,
            MessageKind::Data
                | MessageKind::Chat
                | MessageKind::Command
                | MessageKind::Connection
                | MessageKind::Heartbeat
        )
    }
}

/// XOR of every byte in `bytes`.
#[inline]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Validate a raw frame.
///
/// Checks, in order: markers, kind range, declared length, checksum.
pub fn validate_frame(raw: &[u8; FRAME_SIZE]) -> Result<(), FrameError> {
    if raw[0] != START_MARKER {
        return Err(FrameError::BadStartMarker(raw[0]));
    }
    if raw[END_OFFSET] != END_MARKER {
        return Err(FrameError::BadEndMarker(raw[END_OFFSET]));
    }

    if MessageKind::from_u8(raw[KIND_OFFSET]).is_none() {
        return Err(FrameError::UnknownKind(raw[KIND_OFFSET]));
    }

    if raw[LENGTH_OFFSET] as usize > MAX_PAYLOAD_SIZE {
        return Err(FrameError::LengthOutOfRange(raw[LENGTH_OFFSET]));
    }

    let computed = checksum(&raw[..CHECKSUM_OFFSET]);
    let expected = raw[CHECKSUM_OFFSET];
    if computed != expected {
        return Err(FrameError::ChecksumMismatch { expected, computed });
    }

    Ok(())
}
