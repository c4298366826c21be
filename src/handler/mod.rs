//! Handler module - per-kind callbacks owned by the application.
//!
//! Provides:
//! - [`Handler`] - the callback capability for one payload type
//! - [`HandlerRegistry`] - one slot per forwarded message kind
//!
//! # Example
//!
//! ```
//! use console_link::codec::{GameData, StatusMessage};
//! use console_link::handler::HandlerRegistry;
//!
//! let mut registry = HandlerRegistry::new();
//!
//! // Game state updates from the peer
//! registry.on_data(|update: &GameData| {
//!     let _ = (&update.data_type, update.sequence);
//! });
//!
//! // Status reports, after the state machine has seen them
//! registry.on_status(|status: &StatusMessage| {
//!     let _ = status.code();
//! });
//! ```

mod registry;

pub use registry::{Handler, HandlerRegistry};
