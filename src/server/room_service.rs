//! Thin CRUD and role queries over the `rooms` document, plus the
//! displacement-free half of seat/colour management (the HTTP handler in
//! [`crate::http::seats`] owns the displacement algorithm itself and calls
//! [`RoomService::update_seat_count`] only to persist the final layout).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{normalize_player_name, AudioChannelRecord, PlayerName, Room, RoomId};
use crate::error::{GameError, GameResult};
use crate::store::RoomStore;

/// Input for [`RoomService::create_room`]. Mirrors the subset of `Room`
/// fields a caller supplies; everything else (`seat_colors`, `audio_state`,
/// `created_at`) starts empty/now.
#[derive(Debug, Clone, Default)]
pub struct CreateRoomInput {
    pub max_players: u8,
    pub dungeon_master: Option<String>,
    pub room_host: Option<String>,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RoleBits {
    pub is_host: bool,
    pub is_moderator: bool,
    pub is_dm: bool,
}

pub struct RoomService {
    store: Arc<dyn RoomStore>,
}

impl RoomService {
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Creates a room. If `id` is supplied (catalog-assigned) it is used as
    /// the primary key; otherwise a fresh UUID is minted. All player-name
    /// fields are normalized to lowercase, and the dungeon master (if any)
    /// is implicitly added to `moderators`.
    pub async fn create_room(
        &self,
        settings: CreateRoomInput,
        id: Option<RoomId>,
    ) -> GameResult<RoomId> {
        if !(1..=8).contains(&settings.max_players) {
            return Err(GameError::Validation(
                "max_players must be between 1 and 8".to_string(),
            ));
        }
        let room_id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut room = Room::new(room_id.clone(), settings.max_players);
        if let Some(dm) = settings.dungeon_master {
            let dm = PlayerName::new(&dm);
            room.moderators.insert(dm.clone());
            room.dungeon_master = Some(dm);
        }
        if let Some(host) = settings.room_host {
            room.room_host = Some(PlayerName::new(&host));
        }
        self.store.create_room(room).await?;
        Ok(room_id)
    }

    pub async fn get_room(&self, id: &RoomId) -> GameResult<Option<Room>> {
        self.store.get_room(id).await
    }

    pub async fn delete_room(&self, id: &RoomId) -> GameResult<bool> {
        self.store.delete_room(id).await
    }

    async fn load_required(&self, id: &RoomId) -> GameResult<Room> {
        self.store
            .get_room(id)
            .await?
            .ok_or_else(|| GameError::NotFound(format!("room {id} not found")))
    }

    /// Persists a new seat layout. Length must not exceed `max_players`;
    /// all non-sentinel entries are lowercased.
    pub async fn update_seat_layout(&self, id: &RoomId, layout: Vec<String>) -> GameResult<Room> {
        let mut room = self.load_required(id).await?;
        if layout.len() > room.max_players as usize {
            return Err(GameError::Validation(format!(
                "seat layout length {} exceeds max_players {}",
                layout.len(),
                room.max_players
            )));
        }
        room.seat_layout = layout
            .into_iter()
            .map(|entry| {
                if entry == crate::domain::SEAT_EMPTY {
                    entry
                } else {
                    normalize_player_name(&entry)
                }
            })
            .collect();
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }

    /// Persists a pre-computed seat count and layout. The caller (the
    /// `PUT /seats` HTTP handler) is responsible for computing the
    /// displaced-players list and the resized layout before calling this.
    pub async fn update_seat_count(
        &self,
        id: &RoomId,
        new_max: u8,
        new_seats: Vec<String>,
    ) -> GameResult<Room> {
        let mut room = self.load_required(id).await?;
        room.max_players = new_max;
        room.seat_layout = new_seats;
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }

    pub async fn update_seat_colors(
        &self,
        id: &RoomId,
        colors: BTreeMap<String, String>,
    ) -> GameResult<Room> {
        for (seat, color) in &colors {
            if !is_hex_color(color) {
                return Err(GameError::Validation(format!(
                    "seat {seat} has invalid color {color}, expected #RRGGBB"
                )));
            }
        }
        let mut room = self.load_required(id).await?;
        room.seat_colors = colors;
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }

    pub async fn role_bits(&self, id: &RoomId, player: &PlayerName) -> GameResult<RoleBits> {
        let room = self.load_required(id).await?;
        let (is_host, is_moderator, is_dm) = crate::store::role_bits(&room, player);
        Ok(RoleBits {
            is_host,
            is_moderator,
            is_dm,
        })
    }

    pub async fn add_moderator(&self, id: &RoomId, target: &PlayerName) -> GameResult<Room> {
        let mut room = self.load_required(id).await?;
        room.moderators.insert(target.clone());
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }

    pub async fn remove_moderator(&self, id: &RoomId, target: &PlayerName) -> GameResult<Room> {
        let mut room = self.load_required(id).await?;
        room.moderators.remove(target);
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }

    pub async fn set_dm(&self, id: &RoomId, target: &PlayerName) -> GameResult<Room> {
        let mut room = self.load_required(id).await?;
        room.dungeon_master = Some(target.clone());
        room.moderators.insert(target.clone());
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }

    pub async fn unset_dm(&self, id: &RoomId) -> GameResult<Room> {
        let mut room = self.load_required(id).await?;
        room.dungeon_master = None;
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }

    /// Replaces a single audio channel atomically. Callers that need
    /// read-modify-write (pause/resume) must fetch `room.audio_state`
    /// first, mutate the `AudioChannelRecord`, and pass the result back in.
    pub async fn update_audio_state(
        &self,
        id: &RoomId,
        channel_id: &str,
        record: AudioChannelRecord,
    ) -> GameResult<Room> {
        let mut room = self.load_required(id).await?;
        room.audio_state.insert(channel_id.to_string(), record);
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }

    /// Replaces the whole `audio_state` map in one write, used by
    /// `remote_audio_batch` so a multi-operation scene change persists as a
    /// single document write instead of one per operation.
    pub async fn replace_audio_state(
        &self,
        id: &RoomId,
        audio_state: BTreeMap<String, AudioChannelRecord>,
    ) -> GameResult<Room> {
        let mut room = self.load_required(id).await?;
        room.audio_state = audio_state;
        self.store.replace_room(room.clone()).await?;
        Ok(room)
    }
}

fn is_hex_color(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryRoomStore;

    fn service() -> RoomService {
        RoomService::new(Arc::new(InMemoryRoomStore::new()))
    }

    #[tokio::test]
    async fn create_room_normalizes_dm_and_adds_as_moderator() {
        let svc = service();
        let id = svc
            .create_room(
                CreateRoomInput {
                    max_players: 4,
                    dungeon_master: Some(" Gary ".to_string()),
                    room_host: None,
                },
                Some("room-1".to_string()),
            )
            .await
            .unwrap();
        let room = svc.get_room(&id).await.unwrap().unwrap();
        assert_eq!(room.dungeon_master, Some(PlayerName::new("gary")));
        assert!(room.moderators.contains(&PlayerName::new("gary")));
    }

    #[tokio::test]
    async fn update_seat_layout_rejects_oversized_layout() {
        let svc = service();
        let id = svc
            .create_room(
                CreateRoomInput {
                    max_players: 2,
                    ..Default::default()
                },
                Some("room-1".to_string()),
            )
            .await
            .unwrap();
        let err = svc
            .update_seat_layout(&id, vec!["a".into(), "b".into(), "c".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[tokio::test]
    async fn update_seat_colors_rejects_bad_hex() {
        let svc = service();
        let id = svc
            .create_room(
                CreateRoomInput {
                    max_players: 2,
                    ..Default::default()
                },
                Some("room-1".to_string()),
            )
            .await
            .unwrap();
        let mut colors = BTreeMap::new();
        colors.insert("0".to_string(), "red".to_string());
        let err = svc.update_seat_colors(&id, colors).await.unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }
}
