//! MongoDB-backed [`RoomStore`].
//!
//! Collections: `rooms` (one document per room, keyed by `room_id`),
//! `active_maps` (indexed on `(room_id)` and `(room_id, active)`, unique
//! per `(room_id, filename)`), `adventure_logs` (indexed on
//! `(room_id, log_id desc)` and `(room_id, timestamp desc)`).
//!
//! Every call is wrapped in the bounded selection/operation timeouts from
//! [`crate::config::MongoConfig`] via [`crate::retry::with_timeout`], so the
//! calling code path — not just the driver's own
//! `server_selection_timeout` — enforces the documented best-effort-vs-
//! surface-error behavior per call site.

use std::time::Duration;

use async_trait::async_trait;
use bson::doc;
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::{Client, Collection};

use crate::config::MongoConfig;
use crate::domain::{
    ActiveMap, AdventureLogEntry, GridConfig, LogStats, LogType, MapImageConfig, Patch, Room,
    RoomId,
};
use crate::error::{GameError, GameResult};
use crate::retry::with_timeout;

use super::RoomStore;

pub struct MongoRoomStore {
    rooms: Collection<Room>,
    maps: Collection<ActiveMap>,
    logs: Collection<AdventureLogEntry>,
    selection_timeout: Duration,
    operation_timeout: Duration,
}

impl MongoRoomStore {
    /// Connects to MongoDB and ensures the indexes described in the module
    /// doc comment exist. Index creation is idempotent, so this is safe to
    /// call on every startup.
    pub async fn connect(config: &MongoConfig) -> GameResult<Self> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| GameError::Transient(format!("mongo connect failed: {e}")))?;
        let db = client.database(&config.database);

        let store = Self {
            rooms: db.collection("rooms"),
            maps: db.collection("active_maps"),
            logs: db.collection("adventure_logs"),
            selection_timeout: Duration::from_secs(config.selection_timeout_secs),
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> GameResult<()> {
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let map_index = IndexModel::builder()
            .keys(doc! { "room_id": 1, "filename": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.maps
            .create_index(map_index)
            .await
            .map_err(|e| GameError::Transient(format!("index creation failed: {e}")))?;

        let log_index = IndexModel::builder()
            .keys(doc! { "room_id": 1, "log_id": -1 })
            .build();
        self.logs
            .create_index(log_index)
            .await
            .map_err(|e| GameError::Transient(format!("index creation failed: {e}")))?;
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.selection_timeout + self.operation_timeout
    }
}

#[async_trait]
impl RoomStore for MongoRoomStore {
    async fn create_room(&self, room: Room) -> GameResult<()> {
        with_timeout(self.timeout(), self.rooms.insert_one(room))
            .await
            .map_err(|e| GameError::Transient(format!("create_room failed: {e}")))?;
        Ok(())
    }

    async fn get_room(&self, room_id: &RoomId) -> GameResult<Option<Room>> {
        with_timeout(
            self.timeout(),
            self.rooms.find_one(doc! { "room_id": room_id }),
        )
        .await
        .map_err(|e| GameError::Transient(format!("get_room failed: {e}")))
    }

    async fn delete_room(&self, room_id: &RoomId) -> GameResult<bool> {
        let result = with_timeout(
            self.timeout(),
            self.rooms.delete_one(doc! { "room_id": room_id }),
        )
        .await
        .map_err(|e| GameError::Transient(format!("delete_room failed: {e}")))?;

        with_timeout(
            self.timeout(),
            self.maps.delete_many(doc! { "room_id": room_id }),
        )
        .await
        .ok();
        with_timeout(
            self.timeout(),
            self.logs.delete_many(doc! { "room_id": room_id }),
        )
        .await
        .ok();
        Ok(result.deleted_count > 0)
    }

    async fn replace_room(&self, room: Room) -> GameResult<()> {
        with_timeout(
            self.timeout(),
            self.rooms.replace_one(doc! { "room_id": &room.room_id }, room),
        )
        .await
        .map_err(|e| GameError::Transient(format!("replace_room failed: {e}")))?;
        Ok(())
    }

    async fn get_active_map(&self, room_id: &RoomId) -> GameResult<Option<ActiveMap>> {
        let opts = FindOneOptions::default();
        with_timeout(
            self.timeout(),
            self.maps
                .find_one(doc! { "room_id": room_id, "active": true })
                .with_options(opts),
        )
        .await
        .map_err(|e| GameError::Transient(format!("get_active_map failed: {e}")))
    }

    async fn get_map(&self, room_id: &RoomId, filename: &str) -> GameResult<Option<ActiveMap>> {
        with_timeout(
            self.timeout(),
            self.maps
                .find_one(doc! { "room_id": room_id, "filename": filename }),
        )
        .await
        .map_err(|e| GameError::Transient(format!("get_map failed: {e}")))
    }

    async fn deactivate_all_maps(&self, room_id: &RoomId) -> GameResult<()> {
        with_timeout(
            self.timeout(),
            self.maps.update_many(
                doc! { "room_id": room_id },
                doc! { "$set": { "active": false } },
            ),
        )
        .await
        .map_err(|e| GameError::Transient(format!("deactivate_all_maps failed: {e}")))?;
        Ok(())
    }

    async fn upsert_map(&self, map: ActiveMap) -> GameResult<()> {
        let filter = doc! { "room_id": &map.room_id, "filename": &map.filename };
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();
        with_timeout(
            self.timeout(),
            self.maps.replace_one(filter, map).with_options(options),
        )
        .await
        .map_err(|e| GameError::Transient(format!("upsert_map failed: {e}")))?;
        Ok(())
    }

    async fn update_map_config(
        &self,
        room_id: &RoomId,
        filename: &str,
        grid_config: Patch<GridConfig>,
        map_image_config: Patch<MapImageConfig>,
    ) -> GameResult<bool> {
        let Some(mut map) = self.get_map(room_id, filename).await? else {
            return Ok(false);
        };
        map.grid_config = grid_config.apply(map.grid_config.take());
        map.map_image_config = map_image_config.apply(map.map_image_config.take());
        self.upsert_map(map).await?;
        Ok(true)
    }

    async fn insert_log_entry(&self, entry: AdventureLogEntry) -> GameResult<()> {
        with_timeout(self.timeout(), self.logs.insert_one(entry))
            .await
            .map_err(|e| GameError::Transient(format!("insert_log_entry failed: {e}")))?;
        Ok(())
    }

    async fn prune_room_logs(&self, room_id: &RoomId, max_logs: usize) -> GameResult<()> {
        // Sort-limit-project the newest `max_logs` ids, then delete
        // everything in the room not in that set — per the documented
        // insert-then-prune retention algorithm.
        let options = FindOptions::builder()
            .sort(doc! { "log_id": -1 })
            .limit(max_logs as i64)
            .projection(doc! { "log_id": 1 })
            .build();
        let mut cursor = with_timeout(
            self.timeout(),
            self.logs
                .clone_with_type::<bson::Document>()
                .find(doc! { "room_id": room_id })
                .with_options(options),
        )
        .await
        .map_err(|e| GameError::Transient(format!("prune_room_logs scan failed: {e}")))?;

        let mut keep_ids = Vec::with_capacity(max_logs);
        use futures_util::TryStreamExt;
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| GameError::Transient(format!("prune_room_logs cursor failed: {e}")))?
        {
            if let Ok(id) = doc.get_i64("log_id") {
                keep_ids.push(id);
            }
        }

        with_timeout(
            self.timeout(),
            self.logs.delete_many(doc! {
                "room_id": room_id,
                "log_id": { "$nin": keep_ids },
            }),
        )
        .await
        .map_err(|e| GameError::Transient(format!("prune_room_logs delete failed: {e}")))?;
        Ok(())
    }

    async fn get_room_logs(
        &self,
        room_id: &RoomId,
        limit: usize,
        skip: usize,
    ) -> GameResult<(Vec<AdventureLogEntry>, usize)> {
        let total = with_timeout(
            self.timeout(),
            self.logs.count_documents(doc! { "room_id": room_id }),
        )
        .await
        .map_err(|e| GameError::Transient(format!("count logs failed: {e}")))? as usize;

        let options = FindOptions::builder()
            .sort(doc! { "log_id": -1 })
            .skip(skip as u64)
            .limit(limit as i64)
            .build();
        let cursor = with_timeout(
            self.timeout(),
            self.logs
                .find(doc! { "room_id": room_id })
                .with_options(options),
        )
        .await
        .map_err(|e| GameError::Transient(format!("get_room_logs failed: {e}")))?;

        use futures_util::TryStreamExt;
        let entries: Vec<AdventureLogEntry> = cursor
            .try_collect()
            .await
            .map_err(|e| GameError::Transient(format!("get_room_logs cursor failed: {e}")))?;
        Ok((entries, total))
    }

    async fn remove_log_by_prompt_id(&self, room_id: &RoomId, prompt_id: &str) -> GameResult<u64> {
        let result = with_timeout(
            self.timeout(),
            self.logs
                .delete_one(doc! { "room_id": room_id, "prompt_id": prompt_id }),
        )
        .await
        .map_err(|e| GameError::Transient(format!("remove_log_by_prompt_id failed: {e}")))?;
        Ok(result.deleted_count)
    }

    async fn clear_logs_of_type(
        &self,
        room_id: &RoomId,
        log_type: Option<LogType>,
    ) -> GameResult<u64> {
        let filter = match log_type {
            Some(t) => doc! { "room_id": room_id, "type": bson::to_bson(&t).unwrap() },
            None => doc! { "room_id": room_id },
        };
        let result = with_timeout(self.timeout(), self.logs.delete_many(filter))
            .await
            .map_err(|e| GameError::Transient(format!("clear_logs_of_type failed: {e}")))?;
        Ok(result.deleted_count)
    }

    async fn log_stats(&self, room_id: &RoomId) -> GameResult<LogStats> {
        let (entries, total) = self.get_room_logs(room_id, usize::MAX, 0).await?;
        let mut stats = LogStats {
            total,
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
