//! In-memory [`RoomStore`] used by unit and integration tests so they don't
//! need a live MongoDB instance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{
    ActiveMap, AdventureLogEntry, GridConfig, LogStats, LogType, MapImageConfig, Patch, Room,
    RoomId,
};
use crate::error::{GameError, GameResult};

use super::RoomStore;

#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: RwLock<HashMap<RoomId, Room>>,
    maps: RwLock<HashMap<(RoomId, String), ActiveMap>>,
    logs: RwLock<HashMap<RoomId, Vec<AdventureLogEntry>>>,
}

impl InMemoryRoomStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn create_room(&self, room: Room) -> GameResult<()> {
        let mut rooms = self.rooms.write().unwrap();
        if rooms.contains_key(&room.room_id) {
            return Err(GameError::Conflict(format!(
                "room {} already exists",
                room.room_id
            )));
        }
        rooms.insert(room.room_id.clone(), room);
        Ok(())
    }

    async fn get_room(&self, room_id: &RoomId) -> GameResult<Option<Room>> {
        Ok(self.rooms.read().unwrap().get(room_id).cloned())
    }

    async fn delete_room(&self, room_id: &RoomId) -> GameResult<bool> {
        let removed = self.rooms.write().unwrap().remove(room_id).is_some();
        self.maps.write().unwrap().retain(|(rid, _), _| rid != room_id);
        self.logs.write().unwrap().remove(room_id);
        Ok(removed)
    }

    async fn replace_room(&self, room: Room) -> GameResult<()> {
        self.rooms.write().unwrap().insert(room.room_id.clone(), room);
        Ok(())
    }

    async fn get_active_map(&self, room_id: &RoomId) -> GameResult<Option<ActiveMap>> {
        Ok(self
            .maps
            .read()
            .unwrap()
            .values()
            .find(|m| &m.room_id == room_id && m.active)
            .cloned())
    }

    async fn get_map(&self, room_id: &RoomId, filename: &str) -> GameResult<Option<ActiveMap>> {
        Ok(self
            .maps
            .read()
            .unwrap()
            .get(&(room_id.clone(), filename.to_string()))
            .cloned())
    }

    async fn deactivate_all_maps(&self, room_id: &RoomId) -> GameResult<()> {
        let mut maps = self.maps.write().unwrap();
        for map in maps.values_mut().filter(|m| &m.room_id == room_id) {
            map.active = false;
        }
        Ok(())
    }

    async fn upsert_map(&self, map: ActiveMap) -> GameResult<()> {
        let key = (map.room_id.clone(), map.filename.clone());
        self.maps.write().unwrap().insert(key, map);
        Ok(())
    }

    async fn update_map_config(
        &self,
        room_id: &RoomId,
        filename: &str,
        grid_config: Patch<GridConfig>,
        map_image_config: Patch<MapImageConfig>,
    ) -> GameResult<bool> {
        let mut maps = self.maps.write().unwrap();
        let Some(map) = maps.get_mut(&(room_id.clone(), filename.to_string())) else {
            return Ok(false);
        };
        map.grid_config = grid_config.apply(map.grid_config.take());
        map.map_image_config = map_image_config.apply(map.map_image_config.take());
        Ok(true)
    }

    async fn insert_log_entry(&self, entry: AdventureLogEntry) -> GameResult<()> {
        self.logs
            .write()
            .unwrap()
            .entry(entry.room_id.clone())
            .or_default()
            .push(entry);
        Ok(())
    }

    async fn prune_room_logs(&self, room_id: &RoomId, max_logs: usize) -> GameResult<()> {
        let mut logs = self.logs.write().unwrap();
        if let Some(entries) = logs.get_mut(room_id) {
            entries.sort_by_key(|e| e.log_id);
            if entries.len() > max_logs {
                let excess = entries.len() - max_logs;
                entries.drain(0..excess);
            }
        }
        Ok(())
    }

    async fn get_room_logs(
        &self,
        room_id: &RoomId,
        limit: usize,
        skip: usize,
    ) -> GameResult<(Vec<AdventureLogEntry>, usize)> {
        let logs = self.logs.read().unwrap();
        let Some(entries) = logs.get(room_id) else {
            return Ok((Vec::new(), 0));
        };
        let total = entries.len();
        let mut sorted: Vec<AdventureLogEntry> = entries.clone();
        sorted.sort_by_key(|e| std::cmp::Reverse(e.log_id));
        let page = sorted.into_iter().skip(skip).take(limit).collect();
        Ok((page, total))
    }

    async fn remove_log_by_prompt_id(&self, room_id: &RoomId, prompt_id: &str) -> GameResult<u64> {
        let mut logs = self.logs.write().unwrap();
        let Some(entries) = logs.get_mut(room_id) else {
            return Ok(0);
        };
        let before = entries.len();
        entries.retain(|e| e.prompt_id.as_deref() != Some(prompt_id));
        Ok((before - entries.len()) as u64)
    }

    async fn clear_logs_of_type(
        &self,
        room_id: &RoomId,
        log_type: Option<LogType>,
    ) -> GameResult<u64> {
        let mut logs = self.logs.write().unwrap();
        let Some(entries) = logs.get_mut(room_id) else {
            return Ok(0);
        };
        let before = entries.len();
        match log_type {
            Some(t) => entries.retain(|e| e.log_type != t),
            None => entries.clear(),
        }
        Ok((before - entries.len()) as u64)
    }

    async fn log_stats(&self, room_id: &RoomId) -> GameResult<LogStats> {
        let logs = self.logs.read().unwrap();
        let entries = logs.get(room_id).cloned().unwrap_or_default();
        let mut stats = LogStats {
            total: entries.len(),
            types: Default::default(),
            players: Default::default(),
            earliest: None,
            latest: None,
        };
        for entry in &entries {
            stats.types.insert(entry.log_type);
            if let Some(player) = &entry.player_name {
                stats.players.insert(player.clone());
            }
            stats.earliest = Some(stats.earliest.map_or(entry.timestamp, |e| e.min(entry.timestamp)));
            stats.latest = Some(stats.latest.map_or(entry.timestamp, |l| l.max(entry.timestamp)));
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Room;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryRoomStore::new();
        let room = Room::new("room-1".to_string(), 4);
        store.create_room(room.clone()).await.unwrap();
        let fetched = store.get_room(&"room-1".to_string()).await.unwrap().unwrap();
        assert_eq!(fetched.max_players, 4);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let store = InMemoryRoomStore::new();
        let room = Room::new("room-1".to_string(), 4);
        store.create_room(room.clone()).await.unwrap();
        let err = store.create_room(room).await.unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));
    }

    #[tokio::test]
    async fn prune_keeps_only_newest() {
        let store = InMemoryRoomStore::new();
        let room_id = "room-1".to_string();
        for i in 0..5 {
            store
                .insert_log_entry(AdventureLogEntry {
                    log_id: i,
                    room_id: room_id.clone(),
                    message: format!("entry {i}"),
                    log_type: LogType::System,
                    timestamp: chrono::Utc::now(),
                    player_name: None,
                    prompt_id: None,
                })
                .await
                .unwrap();
        }
        store.prune_room_logs(&room_id, 2).await.unwrap();
        let (logs, total) = store.get_room_logs(&room_id, 10, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].log_id, 4);
        assert_eq!(logs[1].log_id, 3);
    }
}
