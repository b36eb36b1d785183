//! Domain types for rooms, audio channels, active maps and the adventure log.
//!
//! Wire format stays JSON (`serde`); internal state is typed structs with
//! explicit discriminators instead of untyped maps, per the "tagged
//! records with optional fields" approach used for signed envelopes
//! elsewhere in this crate's protocol layer.

mod log;
mod map;
mod patch;
mod player;
mod room;

pub use log::{AdventureLogEntry, LogStats, LogType};
pub use map::{ActiveMap, GridConfig, MapImageConfig};
pub use patch::{deserialize_patch_field, Patch};
pub use player::PlayerName;
pub use room::{ActiveDisplay, AudioChannelRecord, PlaybackState, Room, RoomId};

/// Normalizes a player-supplied name for storage and comparison.
///
/// Per the resolved "seat name case" design decision: always lowercase on
/// ingress, never again on egress comparison. Every WebSocket frame parse
/// and HTTP body parse that carries a player name routes through this
/// function, so downstream comparisons can use plain equality.
#[must_use]
pub fn normalize_player_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub const SEAT_EMPTY: &str = "empty";
