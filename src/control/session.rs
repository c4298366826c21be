//! Session context parsed from status text.
//!
//! Player assignment and opponent notices carry colon-delimited text:
//! `player_id:session_id:player_count:color`, e.g. `P1:ROOM42:2:green`.
//! None of these updates move the connectivity state.

/// One player's assignment within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    pub player_id: String,
    pub session_id: String,
    pub player_count: u8,
    pub color: String,
    /// `false` until a successful parse.
    pub valid: bool,
}

impl PlayerInfo {
    /// Parse `player_id:session_id:player_count:color`.
    ///
    /// Returns `None` unless there are exactly four fields, the id fields are
    /// non-empty and the player count is a number.
    pub fn parse(text: &str) -> Option<Self> {
        let mut fields = text.trim().split(':');
        let player_id = fields.next()?.trim();
        let session_id = fields.next()?.trim();
        let player_count = fields.next()?.trim().parse::<u8>().ok()?;
        let color = fields.next()?.trim();

        if fields.next().is_some() || player_id.is_empty() || session_id.is_empty() {
            return None;
        }

        Some(Self {
            player_id: player_id.to_string(),
            session_id: session_id.to_string(),
            player_count,
            color: color.to_string(),
            valid: true,
        })
    }
}

/// Literal text in a `TileSizeResponse` status that confirms the tile size.
pub const TILE_SIZE_ACCEPTED: &str = "OK";

/// Per-node session data kept alongside the connectivity state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Client id assigned by the server, from the last connection message.
    pub client_id: Option<String>,
    pub local: PlayerInfo,
    pub opponent: PlayerInfo,
    pub opponent_connected: bool,
    pub game_over: bool,
    /// Set when the peer disagrees on tile size; consumed by the game layer.
    pub session_invalid: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a player assignment. Leaves the context untouched on bad text.
    pub fn assign_local(&mut self, text: &str) -> bool {
        match PlayerInfo::parse(text) {
            Some(info) => {
                self.local = info;
                true
            }
            None => {
                tracing::debug!("Ignoring malformed player assignment {:?}", text);
                false
            }
        }
    }

    /// Record that the opponent joined, keeping their details if parseable.
    pub fn opponent_joined(&mut self, text: &str) {
        self.opponent_connected = true;
        match PlayerInfo::parse(text) {
            Some(info) => self.opponent = info,
            None => tracing::debug!("Opponent joined without assignment details: {:?}", text),
        }
    }

    pub fn opponent_left(&mut self) {
        self.opponent_connected = false;
        self.opponent = PlayerInfo::default();
    }

    /// Record the peer's tile size verdict.
    pub fn record_tile_size_response(&mut self, text: &str) {
        if text.trim() != TILE_SIZE_ACCEPTED {
            self.session_invalid = true;
        }
    }

    pub fn set_client_id(&mut self, client_id: &str) {
        self.client_id = Some(client_id.to_string());
    }

    /// Forget everything, as on a disconnect notice or protocol reset.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let info = PlayerInfo::parse("P1:ROOM42:2:green").unwrap();
        assert_eq!(info.player_id, "P1");
        assert_eq!(info.session_id, "ROOM42");
        assert_eq!(info.player_count, 2);
        assert_eq!(info.color, "green");
        assert!(info.valid);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PlayerInfo::parse("").is_none());
        assert!(PlayerInfo::parse("P1:ROOM42:2").is_none());
        assert!(PlayerInfo::parse("P1:ROOM42:two:red").is_none());
        assert!(PlayerInfo::parse("P1:ROOM42:2:red:extra").is_none());
        assert!(PlayerInfo::parse(":ROOM42:2:red").is_none());
    }

    #[test]
    fn test_invalid_until_first_parse() {
        let mut ctx = SessionContext::new();
        assert!(!ctx.local.valid);

        assert!(!ctx.assign_local("garbage"));
        assert!(!ctx.local.valid);

        assert!(ctx.assign_local("P2:ABC:2:blue"));
        assert!(ctx.local.valid);

        // A later bad assignment keeps the previous one.
        assert!(!ctx.assign_local("nope"));
        assert_eq!(ctx.local.player_id, "P2");
    }

    #[test]
    fn test_opponent_lifecycle() {
        let mut ctx = SessionContext::new();
        ctx.opponent_joined("P1:ABC:2:red");
        assert!(ctx.opponent_connected);
        assert_eq!(ctx.opponent.color, "red");

        ctx.opponent_left();
        assert!(!ctx.opponent_connected);
        assert!(!ctx.opponent.valid);
    }

    #[test]
    fn test_tile_size_response() {
        let mut ctx = SessionContext::new();
        ctx.record_tile_size_response("OK");
        assert!(!ctx.session_invalid);

        ctx.record_tile_size_response("MISMATCH");
        assert!(ctx.session_invalid);
    }

    #[test]
    fn test_clear() {
        let mut ctx = SessionContext::new();
        ctx.set_client_id("A1B2C3");
        ctx.assign_local("P1:S:2:red");
        ctx.game_over = true;

        ctx.clear();

        assert!(ctx.client_id.is_none());
        assert!(!ctx.local.valid);
        assert!(!ctx.game_over);
    }
}
