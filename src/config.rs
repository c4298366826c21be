//! Engine configuration.
//!
//! Durations are expressed in milliseconds when read from JSON:
//!
//! ```
//! use console_link::config::{EngineConfig, NodeRole};
//!
//! let config = EngineConfig::from_json(r#"{"role": "network", "heartbeat_interval": 500}"#).unwrap();
//! assert_eq!(config.role, NodeRole::Network);
//! assert_eq!(config.heartbeat_interval.as_millis(), 500);
//! assert_eq!(config.queue_depth, 8);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::DEFAULT_QUEUE_DEPTH;
use crate::reliability::{DEFAULT_ACK_TIMEOUT, DEFAULT_ERROR_COOLDOWN, DEFAULT_HEARTBEAT_INTERVAL};

/// Default bounded transmit timeout for ordinary sends.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default tile size accepted by `TileSizeValidation`.
pub const DEFAULT_TILE_SIZE: u16 = 16;

/// Which end of the link this node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Game console main controller.
    #[default]
    Console,
    /// Network companion controller.
    Network,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::Console => "console",
            NodeRole::Network => "network",
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for one protocol engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub role: NodeRole,
    /// Inbound frame queue depth.
    pub queue_depth: usize,
    #[serde(with = "millis")]
    pub send_timeout: Duration,
    /// Default wait for the startup handshake acknowledgement.
    #[serde(with = "millis")]
    pub ack_timeout: Duration,
    #[serde(with = "millis")]
    pub heartbeat_interval: Duration,
    pub heartbeat_enabled: bool,
    /// Window in which repeated link-loss notices are suppressed.
    #[serde(with = "millis")]
    pub error_cooldown: Duration,
    pub accepted_tile_size: u16,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON object. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            role: NodeRole::default(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            heartbeat_enabled: true,
            error_cooldown: DEFAULT_ERROR_COOLDOWN,
            accepted_tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
