//! Typed payloads and their explicit wire layouts.
//!
//! Layouts are packed with no implicit padding. Integers are little-endian.
//!
//! | payload              | layout                                              | bytes |
//! |----------------------|-----------------------------------------------------|-------|
//! | [`GameData`]         | data_type[16] data[64] metadata[32] sequence:u32    | 116   |
//! | [`ChatMessage`]      | message[96] sender[32] chat_type[16] timestamp:u32  | 148   |
//! | [`CommandMessage`]   | name[32] parameters[64]                             | 96    |
//! | [`StatusMessage`]    | status:u8 error_code:u8 message[32]                 | 34    |
//! | [`ConnectionMessage`]| client_id[7] message[64] timestamp:u32              | 75    |
//! | [`TileSizeValidation`]| tile_size:u16 timestamp:u32                        | 6     |

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::FixedText;
use crate::control::StatusCode;
use crate::error::PayloadError;
use crate::protocol::MessageKind;

/// A payload with a fixed wire size, bound to one message kind.
pub trait WirePayload: Sized {
    /// Message kind that carries this payload.
    const KIND: MessageKind;
    /// Exact encoded size in bytes.
    const SIZE: usize;

    /// Append the encoded payload (exactly `SIZE` bytes).
    fn encode_into(&self, buf: &mut BytesMut);

    /// Decode from `bytes`, which must be exactly `SIZE` long.
    fn decode(bytes: &[u8]) -> Result<Self, PayloadError>;

    /// Encode into a fresh buffer.
    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), Self::SIZE);
        buf.freeze()
    }
}

fn check_len<P: WirePayload>(bytes: &[u8]) -> Result<(), PayloadError> {
    if bytes.len() != P::SIZE {
        return Err(PayloadError::LengthMismatch {
            kind: P::KIND,
            expected: P::SIZE,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Game state update exchanged between the nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameData {
    pub data_type: String,
    pub data: String,
    pub metadata: String,
    pub sequence: u32,
}

impl GameData {
    pub const DATA_TYPE_WIDTH: usize = 16;
    pub const DATA_WIDTH: usize = 64;
    pub const METADATA_WIDTH: usize = 32;

    pub fn new(data_type: &str, data: &str, metadata: &str, sequence: u32) -> Self {
        Self {
            data_type: data_type.to_string(),
            data: data.to_string(),
            metadata: metadata.to_string(),
            sequence,
        }
    }
}

impl WirePayload for GameData {
    const KIND: MessageKind = MessageKind::Data;
    const SIZE: usize = Self::DATA_TYPE_WIDTH + Self::DATA_WIDTH + Self::METADATA_WIDTH + 4;

    fn encode_into(&self, buf: &mut BytesMut) {
        FixedText::put(buf, &self.data_type, Self::DATA_TYPE_WIDTH);
        FixedText::put(buf, &self.data, Self::DATA_WIDTH);
        FixedText::put(buf, &self.metadata, Self::METADATA_WIDTH);
        buf.put_u32_le(self.sequence);
    }

    fn decode(mut bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len::<Self>(bytes)?;
        Ok(Self {
            data_type: FixedText::get(&mut bytes, Self::DATA_TYPE_WIDTH),
            data: FixedText::get(&mut bytes, Self::DATA_WIDTH),
            metadata: FixedText::get(&mut bytes, Self::METADATA_WIDTH),
            sequence: bytes.get_u32_le(),
        })
    }
}

/// In-game chat line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    pub message: String,
    pub sender: String,
    pub chat_type: String,
    pub timestamp: u32,
}

impl ChatMessage {
    pub const MESSAGE_WIDTH: usize = 96;
    pub const SENDER_WIDTH: usize = 32;
    pub const CHAT_TYPE_WIDTH: usize = 16;

    pub fn new(message: &str, sender: &str, chat_type: &str, timestamp: u32) -> Self {
        Self {
            message: message.to_string(),
            sender: sender.to_string(),
            chat_type: chat_type.to_string(),
            timestamp,
        }
    }
}

impl WirePayload for ChatMessage {
    const KIND: MessageKind = MessageKind::Chat;
    const SIZE: usize = Self::MESSAGE_WIDTH + Self::SENDER_WIDTH + Self::CHAT_TYPE_WIDTH + 4;

    fn encode_into(&self, buf: &mut BytesMut) {
        FixedText::put(buf, &self.message, Self::MESSAGE_WIDTH);
        FixedText::put(buf, &self.sender, Self::SENDER_WIDTH);
        FixedText::put(buf, &self.chat_type, Self::CHAT_TYPE_WIDTH);
        buf.put_u32_le(self.timestamp);
    }

    fn decode(mut bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len::<Self>(bytes)?;
        Ok(Self {
            message: FixedText::get(&mut bytes, Self::MESSAGE_WIDTH),
            sender: FixedText::get(&mut bytes, Self::SENDER_WIDTH),
            chat_type: FixedText::get(&mut bytes, Self::CHAT_TYPE_WIDTH),
            timestamp: bytes.get_u32_le(),
        })
    }
}

/// Named command with free-form parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMessage {
    pub name: String,
    pub parameters: String,
}

impl CommandMessage {
    pub const NAME_WIDTH: usize = 32;
    pub const PARAMETERS_WIDTH: usize = 64;

    pub fn new(name: &str, parameters: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: parameters.to_string(),
        }
    }
}

impl WirePayload for CommandMessage {
    const KIND: MessageKind = MessageKind::Command;
    const SIZE: usize = Self::NAME_WIDTH + Self::PARAMETERS_WIDTH;

    fn encode_into(&self, buf: &mut BytesMut) {
        FixedText::put(buf, &self.name, Self::NAME_WIDTH);
        FixedText::put(buf, &self.parameters, Self::PARAMETERS_WIDTH);
    }

    fn decode(mut bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len::<Self>(bytes)?;
        Ok(Self {
            name: FixedText::get(&mut bytes, Self::NAME_WIDTH),
            parameters: FixedText::get(&mut bytes, Self::PARAMETERS_WIDTH),
        })
    }
}

/// System status report. The status byte drives the connectivity state.
///
/// The raw byte is kept so that codes this build does not know about still
/// reach the status handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMessage {
    pub status: u8,
    pub error_code: u8,
    pub message: String,
}

impl StatusMessage {
    pub const MESSAGE_WIDTH: usize = 32;

    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status: status.as_u8(),
            error_code: 0,
            message: message.to_string(),
        }
    }

    pub fn with_error_code(mut self, error_code: u8) -> Self {
        self.error_code = error_code;
        self
    }

    /// Decoded status code, if known.
    pub fn code(&self) -> Option<StatusCode> {
        StatusCode::from_u8(self.status)
    }
}

impl WirePayload for StatusMessage {
    const KIND: MessageKind = MessageKind::Status;
    const SIZE: usize = 2 + Self::MESSAGE_WIDTH;

    fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_u8(self.status);
        buf.put_u8(self.error_code);
        FixedText::put(buf, &self.message, Self::MESSAGE_WIDTH);
    }

    fn decode(mut bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len::<Self>(bytes)?;
        Ok(Self {
            status: bytes.get_u8(),
            error_code: bytes.get_u8(),
            message: FixedText::get(&mut bytes, Self::MESSAGE_WIDTH),
        })
    }
}

/// Connection notice carrying the client id the server assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionMessage {
    pub client_id: String,
    pub message: String,
    pub timestamp: u32,
}

impl ConnectionMessage {
    /// Six characters plus terminator.
    pub const CLIENT_ID_WIDTH: usize = 7;
    pub const MESSAGE_WIDTH: usize = 64;

    pub fn new(client_id: &str, message: &str, timestamp: u32) -> Self {
        Self {
            client_id: client_id.to_string(),
            message: message.to_string(),
            timestamp,
        }
    }
}

impl WirePayload for ConnectionMessage {
    const KIND: MessageKind = MessageKind::Connection;
    const SIZE: usize = Self::CLIENT_ID_WIDTH + Self::MESSAGE_WIDTH + 4;

    fn encode_into(&self, buf: &mut BytesMut) {
        FixedText::put(buf, &self.client_id, Self::CLIENT_ID_WIDTH);
        FixedText::put(buf, &self.message, Self::MESSAGE_WIDTH);
        buf.put_u32_le(self.timestamp);
    }

    fn decode(mut bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len::<Self>(bytes)?;
        Ok(Self {
            client_id: FixedText::get(&mut bytes, Self::CLIENT_ID_WIDTH),
            message: FixedText::get(&mut bytes, Self::MESSAGE_WIDTH),
            timestamp: bytes.get_u32_le(),
        })
    }
}

/// Tile size check so both nodes agree on the playfield grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileSizeValidation {
    pub tile_size: u16,
    pub timestamp: u32,
}

impl TileSizeValidation {
    pub fn new(tile_size: u16, timestamp: u32) -> Self {
        Self {
            tile_size,
            timestamp,
        }
    }
}

impl WirePayload for TileSizeValidation {
    const KIND: MessageKind = MessageKind::TileSizeValidation;
    const SIZE: usize = 2 + 4;

    fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_u16_le(self.tile_size);
        buf.put_u32_le(self.timestamp);
    }

    fn decode(mut bytes: &[u8]) -> Result<Self, PayloadError> {
        check_len::<Self>(bytes)?;
        Ok(Self {
            tile_size: bytes.get_u16_le(),
            timestamp: bytes.get_u32_le(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MAX_PAYLOAD_SIZE;

    #[test]
    fn test_sizes() {
        assert_eq!(GameData::SIZE, 116);
        assert_eq!(ChatMessage::SIZE, 148);
        assert_eq!(CommandMessage::SIZE, 96);
        assert_eq!(StatusMessage::SIZE, 34);
        assert_eq!(ConnectionMessage::SIZE, 75);
        assert_eq!(TileSizeValidation::SIZE, 6);

        for size in [
            GameData::SIZE,
            ChatMessage::SIZE,
            CommandMessage::SIZE,
            StatusMessage::SIZE,
            ConnectionMessage::SIZE,
            TileSizeValidation::SIZE,
        ] {
            assert!(size <= MAX_PAYLOAD_SIZE);
        }
    }

    #[test]
    fn test_game_data_roundtrip() {
        let msg = GameData::new("snake_move", "x=4;y=9;dir=L", "p1", 0xDEAD_BEEF);
        let encoded = msg.encode();
        assert_eq!(encoded.len(), GameData::SIZE);
        assert_eq!(GameData::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_chat_roundtrip() {
        let msg = ChatMessage::new("good game!", "alice", "global", 1_700_000_000);
        assert_eq!(ChatMessage::decode(&msg.encode()).unwrap(), msg);
    }

    #[test]
    fn test_command_roundtrip() {
        let msg = CommandMessage::new("start_game", "mode=pacman");
        assert_eq!(CommandMessage::decode(&msg.encode()).unwrap(), msg);
    }

    #[test]
    fn test_status_roundtrip() {
        let msg = StatusMessage::new(StatusCode::LinkConnected, "wifi up").with_error_code(3);
        let decoded = StatusMessage::decode(&msg.encode()).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.code(), Some(StatusCode::LinkConnected));
    }

    #[test]
    fn test_connection_roundtrip() {
        let msg = ConnectionMessage::new("A1B2C3", "welcome", 42);
        assert_eq!(ConnectionMessage::decode(&msg.encode()).unwrap(), msg);
    }

    #[test]
    fn test_tile_size_roundtrip() {
        let msg = TileSizeValidation::new(16, 123_456);
        assert_eq!(TileSizeValidation::decode(&msg.encode()).unwrap(), msg);
    }

    #[test]
    fn test_little_endian_integers() {
        let encoded = TileSizeValidation::new(0x0102, 0x0304_0506).encode();
        assert_eq!(&encoded[..], &[0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);

        let encoded = GameData::new("", "", "", 0x0A0B_0C0D).encode();
        assert_eq!(&encoded[112..], &[0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn test_oversized_fields_truncated() {
        let long_tag = "t".repeat(40);
        let encoded = GameData::new(&long_tag, "d", "m", 1).encode();
        assert_eq!(encoded.len(), GameData::SIZE);

        let decoded = GameData::decode(&encoded).unwrap();
        assert_eq!(decoded.data_type, "t".repeat(GameData::DATA_TYPE_WIDTH - 1));
        assert_eq!(decoded.data, "d");
        assert_eq!(decoded.sequence, 1);
    }

    #[test]
    fn test_client_id_limited_to_six_chars() {
        let encoded = ConnectionMessage::new("ABCDEFGH", "", 0).encode();
        let decoded = ConnectionMessage::decode(&encoded).unwrap();
        assert_eq!(decoded.client_id, "ABCDEF");
    }

    #[test]
    fn test_length_mismatch() {
        let result = StatusMessage::decode(&[0u8; 10]);
        assert_eq!(
            result,
            Err(PayloadError::LengthMismatch {
                kind: MessageKind::Status,
                expected: 34,
                actual: 10,
            })
        );
    }

    #[test]
    fn test_unknown_status_code_preserved() {
        let status = StatusMessage {
            status: 0x77,
            error_code: 0,
            message: String::new(),
        };
        let decoded = StatusMessage::decode(&status.encode()).unwrap();
        assert_eq!(decoded.status, 0x77);
        assert_eq!(decoded.code(), None);
    }
}
