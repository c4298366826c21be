//! Codec module - typed payloads carried inside frames.
//!
//! - [`FixedText`] - NUL-padded fixed-width text fields
//! - [`WirePayload`] - explicit encode/decode for each payload shape
//!
//! # Design
//!
//! Payload layouts are written out field by field with an explicit byte
//! order instead of relying on two compilers agreeing on struct layout.
//!
//! # Example
//!
//! ```
//! use console_link::codec::{ChatMessage, WirePayload};
//!
//! let chat = ChatMessage::new("gg", "bob", "lobby", 7);
//! let bytes = chat.encode();
//! assert_eq!(bytes.len(), ChatMessage::SIZE);
//! assert_eq!(ChatMessage::decode(&bytes).unwrap(), chat);
//! ```

mod payloads;
mod text;

pub use payloads::{
    ChatMessage, CommandMessage, ConnectionMessage, GameData, StatusMessage, TileSizeValidation,
    WirePayload,
};
pub use text::FixedText;
