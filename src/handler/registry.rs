//! Handler registry for dispatching payloads by message kind.
//!
//! The registry holds exactly one slot per forwarded kind. Registering a
//! handler replaces whatever the slot held; dispatching to an empty slot
//! does nothing.
//!
//! # Example
//!
//! ```
//! use console_link::codec::ChatMessage;
//! use console_link::handler::HandlerRegistry;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.on_chat(|chat: &ChatMessage| println!("{}: {}", chat.sender, chat.message));
//!
//! let delivered = registry.dispatch_chat(&ChatMessage::new("hi", "bob", "lobby", 0));
//! assert!(delivered);
//! ```

use crate::codec::{ChatMessage, CommandMessage, ConnectionMessage, GameData, StatusMessage};
use crate::protocol::MessageKind;

/// Callback for one payload type.
pub trait Handler<M>: Send + 'static {
    fn call(&mut self, message: &M);
}

impl<M, F> Handler<M> for F
where
    F: FnMut(&M) + Send + 'static,
{
    fn call(&mut self, message: &M) {
        self(message)
    }
}

/// A single handler slot; last registration wins.
struct Slot<M> {
    handler: Option<Box<dyn Handler<M>>>,
}

impl<M: 'static> Slot<M> {
    const fn empty() -> Self {
        Self { handler: None }
    }

    fn set<H: Handler<M>>(&mut self, handler: H) {
        self.handler = Some(Box::new(handler));
    }

    fn call(&mut self, message: &M) -> bool {
        match self.handler.as_mut() {
            Some(handler) => {
                handler.call(message);
                true
            }
            None => false,
        }
    }

    fn is_set(&self) -> bool {
        self.handler.is_some()
    }
}

/// Registry of the externally owned per-kind callbacks.
pub struct HandlerRegistry {
    data: Slot<GameData>,
    chat: Slot<ChatMessage>,
    command: Slot<CommandMessage>,
    connection: Slot<ConnectionMessage>,
    status: Slot<StatusMessage>,
}

impl HandlerRegistry {
    /// Create a registry with every slot empty.
    pub const fn new() -> Self {
        Self {
            data: Slot::empty(),
            chat: Slot::empty(),
            command: Slot::empty(),
            connection: Slot::empty(),
            status: Slot::empty(),
        }
    }

    pub fn on_data<H: Handler<GameData>>(&mut self, handler: H) {
        self.data.set(handler);
    }

    pub fn on_chat<H: Handler<ChatMessage>>(&mut self, handler: H) {
        self.chat.set(handler);
    }

    pub fn on_command<H: Handler<CommandMessage>>(&mut self, handler: H) {
        self.command.set(handler);
    }

    pub fn on_connection<H: Handler<ConnectionMessage>>(&mut self, handler: H) {
        self.connection.set(handler);
    }

    pub fn on_status<H: Handler<StatusMessage>>(&mut self, handler: H) {
        self.status.set(handler);
    }

    /// Returns whether a handler was invoked.
    pub fn dispatch_data(&mut self, message: &GameData) -> bool {
        self.data.call(message)
    }

    pub fn dispatch_chat(&mut self, message: &ChatMessage) -> bool {
        self.chat.call(message)
    }

    pub fn dispatch_command(&mut self, message: &CommandMessage) -> bool {
        self.command.call(message)
    }

    pub fn dispatch_connection(&mut self, message: &ConnectionMessage) -> bool {
        self.connection.call(message)
    }

    pub fn dispatch_status(&mut self, message: &StatusMessage) -> bool {
        self.status.call(message)
    }

    /// Whether a handler is registered for `kind`.
    ///
    /// Kinds handled internally (Ack, Nack, Heartbeat, TileSizeValidation)
    /// never have a slot.
    pub fn is_registered(&self, kind: MessageKind) -> bool {
        match kind {
            MessageKind::Data => self.data.is_set(),
            MessageKind::Chat => self.chat.is_set(),
            MessageKind::Command => self.command.is_set(),
            MessageKind::Connection => self.connection.is_set(),
            MessageKind::Status => self.status.is_set(),
            MessageKind::Ack
            | MessageKind::Nack
            | MessageKind::Heartbeat
            | MessageKind::TileSizeValidation => false,
        }
    }

    /// Remove every handler.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_unregistered_is_noop() {
        let mut registry = HandlerRegistry::new();

        assert!(!registry.dispatch_data(&GameData::default()));
        assert!(!registry.dispatch_status(&StatusMessage::default()));
        assert!(!registry.is_registered(MessageKind::Data));
    }

    #[test]
    fn test_handler_receives_message() {
        let mut registry = HandlerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        registry.on_command(move |cmd: &CommandMessage| {
            sink.lock().unwrap().push(cmd.name.clone());
        });

        assert!(registry.dispatch_command(&CommandMessage::new("pause", "")));
        assert!(registry.dispatch_command(&CommandMessage::new("resume", "")));
        assert_eq!(*seen.lock().unwrap(), vec!["pause", "resume"]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = HandlerRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        registry.on_data(move |_: &GameData| {
            f.fetch_add(1, Ordering::SeqCst);
        });
        let s = second.clone();
        registry.on_data(move |_: &GameData| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch_data(&GameData::default());

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut registry = HandlerRegistry::new();
        registry.on_chat(|_: &ChatMessage| {});

        assert!(registry.is_registered(MessageKind::Chat));
        assert!(!registry.is_registered(MessageKind::Connection));
        assert!(!registry.dispatch_connection(&ConnectionMessage::default()));
        assert!(!registry.is_registered(MessageKind::Heartbeat));
    }

    #[test]
    fn test_clear() {
        let mut registry = HandlerRegistry::new();
        registry.on_status(|_: &StatusMessage| {});
        registry.on_chat(|_: &ChatMessage| {});

        registry.clear();

        assert!(!registry.is_registered(MessageKind::Status));
        assert!(!registry.is_registered(MessageKind::Chat));
    }
}
