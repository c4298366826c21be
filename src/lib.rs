//! # console-link
//!
//! Serial link protocol between a game console's main controller (the
//! console node) and its network companion controller (the network node).
//!
//! Every message crosses one asynchronous serial line as a fixed 255-byte
//! frame. Both nodes run the same [`Engine`]: bytes arrive through a
//! non-blocking ingress port, are reassembled and validated, and are
//! dispatched in order to the state machine and the application handlers.
//!
//! ## Architecture
//!
//! ```text
//! link ─► IngressPort ─► ring ─► FrameAssembler ─► FrameQueue ─► dispatch ─► handlers
//!                                                                   │
//! link ◄─ Transport ◄──────────── FrameWriter ◄── send_* / replies ◄┘
//! ```
//!
//! ## Example
//!
//! ```
//! use console_link::protocol::ingress;
//! use console_link::transport::LoopbackTransport;
//! use console_link::{Engine, NodeRole};
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> Result<(), console_link::LinkError> {
//! let (console_port, console_rx) = ingress(1024);
//! let (network_port, network_rx) = ingress(1024);
//!
//! let mut console = Engine::builder()
//!     .role(NodeRole::Console)
//!     .build(LoopbackTransport::new(network_port), console_rx);
//! let mut network = Engine::builder()
//!     .role(NodeRole::Network)
//!     .build(LoopbackTransport::new(console_port), network_rx);
//!
//! console.init();
//! network.init();
//!
//! // The network node answers the handshake while the console waits.
//! let peer = async {
//!     for _ in 0..20 {
//!         network.poll().await;
//!         tokio::time::sleep(std::time::Duration::from_millis(5)).await;
//!     }
//! };
//! let (outcome, ()) = tokio::join!(console.announce_startup(), peer);
//! outcome?;
//!
//! assert!(console.is_peer_ready());
//! assert!(network.is_peer_ready());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod reliability;
pub mod transport;
pub mod writer;

mod engine;

pub use config::{EngineConfig, NodeRole};
pub use control::{ProtocolState, StatusCode};
pub use diagnostics::Stats;
pub use engine::{Engine, EngineBuilder};
pub use error::{FrameError, LinkError, PayloadError, Result};
pub use reliability::HandshakeOutcome;
