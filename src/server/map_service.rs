//! Active-map document management: at most one row per room has
//! `active == true`; setting a new active map deactivates all others in
//! the same logical step.

use std::sync::Arc;

use crate::domain::{ActiveDisplay, ActiveMap, GridConfig, MapImageConfig, Patch, Room, RoomId};
use crate::error::{GameError, GameResult};
use crate::store::RoomStore;

pub struct MapService {
    store: Arc<dyn RoomStore>,
}

impl MapService {
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// Deactivates all prior rows for the room, then upserts `map` with
    /// `active = true` and flips `rooms.active_display` to `"map"`. If a
    /// row already existed for `(room, filename)` with a stored
    /// `grid_config` and the caller didn't explicitly provide one, the
    /// stored grid is preserved — maps remember their grid across reloads.
    pub async fn set_active_map(&self, room_id: &RoomId, mut map: ActiveMap) -> GameResult<ActiveMap> {
        if let Some(existing) = self.store.get_map(room_id, &map.filename).await? {
            if map.grid_config.is_none() {
                map.grid_config = existing.grid_config;
            }
            if map.map_image_config.is_none() {
                map.map_image_config = existing.map_image_config;
            }
        }
        self.store.deactivate_all_maps(room_id).await?;
        map.active = true;
        self.store.upsert_map(map.clone()).await?;

        if let Some(mut room) = self.store.get_room(room_id).await? {
            room.active_display = ActiveDisplay::Map;
            self.store.replace_room(room).await?;
        }
        Ok(map)
    }

    pub async fn get_active_map(&self, room_id: &RoomId) -> GameResult<Option<ActiveMap>> {
        self.store.get_active_map(room_id).await
    }

    /// Partial update. Returns `false` if `(room, filename)` doesn't exist.
    pub async fn update_map_config(
        &self,
        room_id: &RoomId,
        filename: &str,
        grid_config: Patch<GridConfig>,
        map_image_config: Patch<MapImageConfig>,
    ) -> GameResult<bool> {
        self.store
            .update_map_config(room_id, filename, grid_config, map_image_config)
            .await
    }

    /// Atomic full-document replacement, used by the HTTP `PUT` path.
    /// Returns `NotFound` if the room itself doesn't exist.
    pub async fn update_complete_map(
        &self,
        room_id: &RoomId,
        map: ActiveMap,
    ) -> GameResult<ActiveMap> {
        let room: Option<Room> = self.store.get_room(room_id).await?;
        if room.is_none() {
            return Err(GameError::NotFound(format!("room {room_id} not found")));
        }
        self.set_active_map(room_id, map).await
    }

    pub async fn clear_active_map(&self, room_id: &RoomId) -> GameResult<()> {
        self.store.deactivate_all_maps(room_id).await?;
        if let Some(mut room) = self.store.get_room(room_id).await? {
            room.active_display = ActiveDisplay::None;
            self.store.replace_room(room).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerName;
    use crate::store::memory::InMemoryRoomStore;

    fn map(room_id: &str, filename: &str) -> ActiveMap {
        ActiveMap {
            room_id: room_id.to_string(),
            filename: filename.to_string(),
            original_filename: filename.to_string(),
            file_path: format!("/maps/{filename}"),
            grid_config: None,
            map_image_config: None,
            uploaded_by: PlayerName::new("dm"),
            active: false,
        }
    }

    #[tokio::test]
    async fn reloading_a_map_preserves_its_stored_grid() {
        let store = Arc::new(InMemoryRoomStore::new());
        store
            .create_room(Room::new("room-1".to_string(), 4))
            .await
            .unwrap();
        let svc = MapService::new(store);

        let mut first = map("room-1", "dungeon.png");
        first.grid_config = Some(GridConfig {
            width: 40.0,
            height: 30.0,
            opacity: 0.5,
            offset_x: 0.0,
            offset_y: 0.0,
        });
        svc.set_active_map(&"room-1".to_string(), first)
            .await
            .unwrap();

        // Reload without an explicit grid_config.
        let reload = map("room-1", "dungeon.png");
        let result = svc
            .set_active_map(&"room-1".to_string(), reload)
            .await
            .unwrap();
        assert_eq!(result.grid_config.unwrap().width, 40.0);
    }

    #[tokio::test]
    async fn setting_active_map_deactivates_others() {
        let store = Arc::new(InMemoryRoomStore::new());
        store
            .create_room(Room::new("room-1".to_string(), 4))
            .await
            .unwrap();
        let svc = MapService::new(store.clone());

        svc.set_active_map(&"room-1".to_string(), map("room-1", "a.png"))
            .await
            .unwrap();
        svc.set_active_map(&"room-1".to_string(), map("room-1", "b.png"))
            .await
            .unwrap();

        let a = store
            .get_map(&"room-1".to_string(), "a.png")
            .await
            .unwrap()
            .unwrap();
        assert!(!a.active);
        let active = svc.get_active_map(&"room-1".to_string()).await.unwrap().unwrap();
        assert_eq!(active.filename, "b.png");
    }
}
