//! Active-map events (§4.5.5): loading a map, clearing the display,
//! partial grid/image config updates, and a unicast catch-up request for
//! late joiners.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::util::parse_data;
use super::{EventHandler, HandlerResult, Outbound};
use crate::domain::{
    deserialize_patch_field, ActiveMap, GridConfig, MapImageConfig, Patch, PlayerName, RoomId,
};
use crate::error::GameResult;
use crate::server::AppContext;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapLoadInput {
    filename: String,
    #[serde(default)]
    original_filename: Option<String>,
    file_path: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapLoadData {
    map_data: MapLoadInput,
}

pub struct MapLoadHandler;

#[async_trait]
impl EventHandler for MapLoadHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: MapLoadData = parse_data(data)?;
        let map = ActiveMap {
            room_id: room.clone(),
            filename: data.map_data.filename.clone(),
            original_filename: data
                .map_data
                .original_filename
                .unwrap_or_else(|| data.map_data.filename.clone()),
            file_path: data.map_data.file_path,
            grid_config: None,
            map_image_config: None,
            uploaded_by: player.clone(),
            active: true,
        };
        let saved = ctx.map_service.set_active_map(room, map).await?;

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "map_load",
            "data": saved,
        }))))
    }
}

pub struct MapClearHandler;

#[async_trait]
impl EventHandler for MapClearHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        _data: Value,
    ) -> GameResult<HandlerResult> {
        ctx.map_service.clear_active_map(room).await?;
        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "map_clear",
            "data": {},
        }))))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapConfigUpdateData {
    filename: String,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    grid_config: Patch<GridConfig>,
    #[serde(default, deserialize_with = "deserialize_patch_field")]
    map_image_config: Patch<MapImageConfig>,
}

pub struct MapConfigUpdateHandler;

#[async_trait]
impl EventHandler for MapConfigUpdateHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: MapConfigUpdateData = parse_data(data)?;
        let found = ctx
            .map_service
            .update_map_config(room, &data.filename, data.grid_config, data.map_image_config)
            .await?;
        if !found {
            return Err(crate::error::GameError::NotFound(format!(
                "map {} not found in room {room}",
                data.filename
            )));
        }
        let refetched = ctx.map_service.get_active_map(room).await?;

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "map_config_update",
            "data": refetched,
        }))))
    }
}

/// Unicasts the current active map (or a clear notice) back to the
/// requesting socket only — used when a late joiner needs to catch up.
pub struct MapRequestHandler;

#[async_trait]
impl EventHandler for MapRequestHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        player: &PlayerName,
        _data: Value,
    ) -> GameResult<HandlerResult> {
        let frame = match ctx.map_service.get_active_map(room).await? {
            Some(map) => json!({ "event_type": "map_load", "data": map }),
            None => json!({ "event_type": "map_clear", "data": {} }),
        };
        Ok(HandlerResult::primary_only(Outbound::Player(
            player.clone(),
            frame,
        )))
    }
}
