//! Bounded, per-room, append-only adventure log, keyed by a
//! microsecond-monotonic `log_id`.

use std::sync::Arc;

use crate::domain::{AdventureLogEntry, LogStats, LogType, PlayerName, RoomId};
use crate::error::GameResult;
use crate::metrics::Metrics;
use crate::store::{next_log_id, RoomStore};

pub struct AdventureLogService {
    store: Arc<dyn RoomStore>,
    metrics: Arc<Metrics>,
    max_logs: usize,
}

impl AdventureLogService {
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>, metrics: Arc<Metrics>, max_logs: usize) -> Self {
        Self {
            store,
            metrics,
            max_logs,
        }
    }

    /// Inserts unconditionally, then prunes down to `max_logs` newest
    /// entries for the room.
    ///
    /// Retention is insert-then-prune: under a high write burst the window
    /// can momentarily exceed `max_logs` between the insert and the prune
    /// query landing. Prune-then-insert would close that window at the
    /// cost of one extra query per insert; this implementation keeps the
    /// cheaper ordering and documents the gap here instead of "fixing" it.
    pub async fn add_entry(
        &self,
        room_id: &RoomId,
        message: String,
        log_type: LogType,
        player_name: Option<PlayerName>,
        prompt_id: Option<String>,
    ) -> GameResult<AdventureLogEntry> {
        let entry = AdventureLogEntry {
            log_id: next_log_id(),
            room_id: room_id.clone(),
            message,
            log_type,
            timestamp: chrono::Utc::now(),
            player_name,
            prompt_id,
        };
        self.store.insert_log_entry(entry.clone()).await?;
        self.metrics.add_adventure_log_entries(1);
        let pruned = self.store.prune_room_logs(room_id, self.max_logs).await;
        if pruned.is_ok() {
            self.metrics.add_adventure_log_pruned(1);
        }
        pruned?;
        Ok(entry)
    }

    pub async fn get_room_logs(
        &self,
        room_id: &RoomId,
        limit: usize,
        skip: usize,
    ) -> GameResult<(Vec<AdventureLogEntry>, usize)> {
        self.store.get_room_logs(room_id, limit, skip).await
    }

    pub async fn remove_by_prompt_id(&self, room_id: &RoomId, prompt_id: &str) -> GameResult<u64> {
        self.store.remove_log_by_prompt_id(room_id, prompt_id).await
    }

    pub async fn clear_system_messages(&self, room_id: &RoomId) -> GameResult<u64> {
        self.store
            .clear_logs_of_type(room_id, Some(LogType::System))
            .await
    }

    pub async fn clear_all(&self, room_id: &RoomId) -> GameResult<u64> {
        self.store.clear_logs_of_type(room_id, None).await
    }

    pub async fn stats(&self, room_id: &RoomId) -> GameResult<LogStats> {
        self.store.log_stats(room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryRoomStore;

    fn service(max_logs: usize) -> AdventureLogService {
        AdventureLogService::new(Arc::new(InMemoryRoomStore::new()), Arc::new(Metrics::new()), max_logs)
    }

    #[tokio::test]
    async fn add_entry_prunes_to_max_logs() {
        let svc = service(2);
        let room = "room-1".to_string();
        for i in 0..5 {
            svc.add_entry(&room, format!("entry {i}"), LogType::System, None, None)
                .await
                .unwrap();
        }
        let (logs, total) = svc.get_room_logs(&room, 10, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(logs.len(), 2);
    }

    #[tokio::test]
    async fn remove_by_prompt_id_deletes_single_entry() {
        let svc = service(200);
        let room = "room-1".to_string();
        svc.add_entry(
            &room,
            "DM asks bob to roll".to_string(),
            LogType::DungeonMaster,
            None,
            Some("p1".to_string()),
        )
        .await
        .unwrap();
        let removed = svc.remove_by_prompt_id(&room, "p1").await.unwrap();
        assert_eq!(removed, 1);
        let (logs, _) = svc.get_room_logs(&room, 10, 0).await.unwrap();
        assert!(logs.is_empty());
    }
}
