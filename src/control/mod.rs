//! Control module - connectivity state and session bookkeeping.
//!
//! Status frames are the control plane of the link:
//! - [`StatusCode`] - the status byte values
//! - [`StateMachine`] - the `(state, status) -> state` table
//! - [`SessionContext`] - side-channel data that does not move the state

mod session;
mod state;
mod status;

pub use session::{PlayerInfo, SessionContext, TILE_SIZE_ACCEPTED};
pub use state::{next_state, ProtocolState, Reply, StateMachine, Transition};
pub use status::StatusCode;
