//! Status codes carried in the first byte of a `Status` payload.

/// Known status codes.
///
/// Connectivity codes drive the state table; the rest update session
/// context or flags without moving the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StatusCode {
    PeerStarted = 0x01,
    PeerInitComplete = 0x02,
    LinkConnecting = 0x03,
    LinkConnected = 0x04,
    LinkDisconnected = 0x05,
    SessionConnecting = 0x06,
    SessionConnected = 0x07,
    SessionDisconnected = 0x08,
    SessionReady = 0x09,
    SessionActive = 0x0A,
    SessionEnded = 0x0B,
    PlayerAssignment = 0x0C,
    OpponentConnected = 0x0D,
    OpponentDisconnected = 0x0E,
    TileSizeResponse = 0x0F,
    SessionTimeout = 0x10,
    LocalReady = 0x11,
    GeneralError = 0xFF,
}

impl StatusCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0x01 => StatusCode::PeerStarted,
            0x02 => StatusCode::PeerInitComplete,
            0x03 => StatusCode::LinkConnecting,
            0x04 => StatusCode::LinkConnected,
            0x05 => StatusCode::LinkDisconnected,
            0x06 => StatusCode::SessionConnecting,
            0x07 => StatusCode::SessionConnected,
            0x08 => StatusCode::SessionDisconnected,
            0x09 => StatusCode::SessionReady,
            0x0A => StatusCode::SessionActive,
            0x0B => StatusCode::SessionEnded,
            0x0C => StatusCode::PlayerAssignment,
            0x0D => StatusCode::OpponentConnected,
            0x0E => StatusCode::OpponentDisconnected,
            0x0F => StatusCode::TileSizeResponse,
            0x10 => StatusCode::SessionTimeout,
            0x11 => StatusCode::LocalReady,
            0xFF => StatusCode::GeneralError,
            _ => return None,
        })
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Codes that signal loss of the link or session.
    pub fn is_link_loss(self) -> bool {
        matches!(
            self,
            StatusCode::LinkDisconnected
                | StatusCode::SessionDisconnected
                | StatusCode::GeneralError
        )
    }

    /// Codes that report a (re)established connection and clear a network error.
    pub fn is_connected(self) -> bool {
        matches!(
            self,
            StatusCode::LinkConnected
                | StatusCode::SessionConnected
                | StatusCode::SessionReady
                | StatusCode::SessionActive
        )
    }
}
