use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::player::PlayerName;
use super::room::RoomId;

/// Classification of an adventure-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogType {
    System,
    PlayerRoll,
    DungeonMaster,
}

/// A single entry in a room's bounded, append-only narrative ledger.
///
/// `log_id` is a microsecond-monotonic integer (matching the original
/// system's ordering key): two entries in the same room never share one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdventureLogEntry {
    pub log_id: i64,
    pub room_id: RoomId,
    pub message: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub timestamp: DateTime<Utc>,
    pub player_name: Option<PlayerName>,
    pub prompt_id: Option<String>,
}

/// Aggregate statistics over a room's adventure log.
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total: usize,
    pub types: BTreeSet<LogType>,
    pub players: BTreeSet<PlayerName>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}
