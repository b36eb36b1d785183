//! Server behavior configuration types.

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_dispatch_follow_up_delay_ms, default_max_logs, default_reconnect_grace_secs,
};

/// Server configuration for room coordination behavior.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Reconnect grace window: a player who disconnects and reconnects to
    /// the same room within this many seconds keeps their presence entry.
    #[serde(default = "default_reconnect_grace_secs")]
    pub reconnect_grace_secs: u64,
    /// Maximum adventure-log entries retained per room.
    #[serde(default = "default_max_logs")]
    pub max_logs: usize,
    /// Delay inserted before the log-removal/prompt-clear follow-up
    /// broadcasts after a `dice_roll`, so client UIs see the primary
    /// broadcast first.
    #[serde(default = "default_dispatch_follow_up_delay_ms")]
    pub dispatch_follow_up_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            reconnect_grace_secs: default_reconnect_grace_secs(),
            max_logs: default_max_logs(),
            dispatch_follow_up_delay_ms: default_dispatch_follow_up_delay_ms(),
        }
    }
}
