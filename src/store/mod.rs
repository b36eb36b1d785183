//! Document store abstraction.
//!
//! `RoomStore` is the async-trait seam that lets the rest of the crate stay
//! ignorant of MongoDB: production wiring uses [`mongo::MongoRoomStore`],
//! tests use [`memory::InMemoryRoomStore`]. Atomicity is at single-document
//! granularity only — there are no cross-document transactions, matching
//! the single-writer-per-room model described for `SetActiveMap`.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::domain::{ActiveMap, AdventureLogEntry, LogStats, LogType, PlayerName, Room, RoomId};
use crate::error::GameResult;

/// Patch input for a partial map-config update; re-exported here so trait
/// signatures don't have to reach across modules for it.
pub use crate::domain::Patch;

#[async_trait]
pub trait RoomStore: Send + Sync {
    // ---- rooms -----------------------------------------------------
    async fn create_room(&self, room: Room) -> GameResult<()>;
    async fn get_room(&self, room_id: &RoomId) -> GameResult<Option<Room>>;
    async fn delete_room(&self, room_id: &RoomId) -> GameResult<bool>;
    async fn replace_room(&self, room: Room) -> GameResult<()>;

    // ---- active maps -------------------------------------------------
    async fn get_active_map(&self, room_id: &RoomId) -> GameResult<Option<ActiveMap>>;
    async fn get_map(&self, room_id: &RoomId, filename: &str) -> GameResult<Option<ActiveMap>>;
    async fn deactivate_all_maps(&self, room_id: &RoomId) -> GameResult<()>;
    async fn upsert_map(&self, map: ActiveMap) -> GameResult<()>;
    async fn update_map_config(
        &self,
        room_id: &RoomId,
        filename: &str,
        grid_config: Patch<crate::domain::GridConfig>,
        map_image_config: Patch<crate::domain::MapImageConfig>,
    ) -> GameResult<bool>;

    // ---- adventure log -------------------------------------------------
    async fn insert_log_entry(&self, entry: AdventureLogEntry) -> GameResult<()>;
    async fn prune_room_logs(&self, room_id: &RoomId, max_logs: usize) -> GameResult<()>;
    async fn get_room_logs(
        &self,
        room_id: &RoomId,
        limit: usize,
        skip: usize,
    ) -> GameResult<(Vec<AdventureLogEntry>, usize)>;
    async fn remove_log_by_prompt_id(&self, room_id: &RoomId, prompt_id: &str) -> GameResult<u64>;
    async fn clear_logs_of_type(
        &self,
        room_id: &RoomId,
        log_type: Option<LogType>,
    ) -> GameResult<u64>;
    async fn log_stats(&self, room_id: &RoomId) -> GameResult<LogStats>;
}

/// Allocates the next `log_id` for a room: a microsecond-monotonic integer,
/// matching the ordering key used by the system this was distilled from.
#[must_use]
pub fn next_log_id() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Resolves a player's role bits against a room document. Kept here rather
/// than as trait methods because role checks never need to touch the
/// store once the room document is in hand — `RoomService` loads the room
/// once, then answers `IsHost`/`IsModerator`/`IsDM` from memory.
#[must_use]
pub fn role_bits(room: &Room, player: &PlayerName) -> (bool, bool, bool) {
    (room.is_host(player), room.is_moderator(player), room.is_dm(player))
}
