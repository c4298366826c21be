//! Connectivity state machine.
//!
//! All transitions live in one `(state, status) -> state` table. A status
//! that has no row for the current state is ignored, so out-of-order codes
//! never corrupt the state.
//!
//! Two rules sit outside the table:
//! - A link-loss code moves any state to `Error`.
//! - From `Error`, a connected-type code re-enters the state its own table
//!   row leads to, whatever that row's source state is. This is the only
//!   way out of `Error` short of a reset.

use super::StatusCode;
use ProtocolState as S;

/// Connectivity lifecycle stage of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolState {
    #[default]
    Init,
    PeerReady,
    LinkConnecting,
    LinkConnected,
    SessionConnecting,
    SessionConnected,
    SessionReady,
    SessionActive,
    Error,
}

impl ProtocolState {
    /// Peer has started and the link layer is usable.
    pub fn is_peer_ready(self) -> bool {
        !matches!(self, ProtocolState::Init | ProtocolState::Error)
    }

    /// Network node reports the upstream link as connected.
    pub fn is_link_connected(self) -> bool {
        matches!(
            self,
            ProtocolState::LinkConnected
                | ProtocolState::SessionConnecting
                | ProtocolState::SessionConnected
                | ProtocolState::SessionReady
                | ProtocolState::SessionActive
        )
    }

    /// A multiplayer session is established.
    pub fn is_session_connected(self) -> bool {
        matches!(
            self,
            ProtocolState::SessionConnected
                | ProtocolState::SessionReady
                | ProtocolState::SessionActive
        )
    }

    pub fn is_session_active(self) -> bool {
        self == ProtocolState::SessionActive
    }
}

/// Outbound reply a transition asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    None,
    /// Acknowledge the status frame.
    Ack,
    /// Answer with our own `LocalReady` status.
    LocalReady,
}

struct Rule {
    from: ProtocolState,
    on: StatusCode,
    to: ProtocolState,
    reply: Reply,
}

const fn rule(from: ProtocolState, on: StatusCode, to: ProtocolState, reply: Reply) -> Rule {
    Rule {
        from,
        on,
        to,
        reply,
    }
}

const TRANSITIONS: &[Rule] = &[
    rule(S::Init, StatusCode::PeerStarted, S::PeerReady, Reply::None),
    rule(S::PeerReady, StatusCode::PeerInitComplete, S::PeerReady, Reply::Ack),
    rule(S::PeerReady, StatusCode::LinkConnecting, S::LinkConnecting, Reply::None),
    rule(S::LinkConnecting, StatusCode::LinkConnected, S::LinkConnected, Reply::None),
    rule(S::LinkConnected, StatusCode::SessionConnecting, S::SessionConnecting, Reply::None),
    rule(S::SessionConnecting, StatusCode::SessionConnected, S::SessionConnected, Reply::None),
    rule(S::SessionConnected, StatusCode::SessionReady, S::SessionReady, Reply::LocalReady),
    rule(S::SessionReady, StatusCode::SessionActive, S::SessionActive, Reply::None),
    rule(S::SessionActive, StatusCode::SessionEnded, S::SessionConnected, Reply::None),
];

/// Result of applying a status code that matched a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ProtocolState,
    pub to: ProtocolState,
    pub reply: Reply,
}

impl Transition {
    #[inline]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Look up the next state for `code` in `state`.
///
/// Returns `None` when the code is ignored in this state.
pub fn next_state(state: ProtocolState, code: StatusCode) -> Option<(ProtocolState, Reply)> {
    if code.is_link_loss() {
        return Some((ProtocolState::Error, Reply::None));
    }

    if let Some(r) = TRANSITIONS.iter().find(|r| r.from == state && r.on == code) {
        return Some((r.to, r.reply));
    }

    // Soft recovery out of Error.
    if state == ProtocolState::Error && code.is_connected() {
        return TRANSITIONS
            .iter()
            .find(|r| r.on == code)
            .map(|r| (r.to, r.reply));
    }

    None
}

/// Holds the current state of one node.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: ProtocolState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Apply a received status code.
    pub fn apply(&mut self, code: StatusCode) -> Option<Transition> {
        let (to, reply) = next_state(self.state, code)?;
        let transition = Transition {
            from: self.state,
            to,
            reply,
        };
        self.state = to;
        Some(transition)
    }

    /// Local move to `PeerReady` once our own startup announcement went out.
    ///
    /// Only valid from `Init`; returns whether the state changed.
    pub fn enter_peer_ready(&mut self) -> bool {
        if self.state == ProtocolState::Init {
            self.state = ProtocolState::PeerReady;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.state = ProtocolState::Init;
    }
}
