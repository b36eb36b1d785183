//! Active-map document mutation/lookup: `PUT /game/{room}/map`,
//! `GET /game/{room}/active-map`.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{ActiveMap, GridConfig, MapImageConfig, PlayerName};
use crate::error::{GameError, GameResult};
use crate::server::AppContext;

#[derive(Deserialize)]
pub struct UpdateMapBody {
    pub filename: String,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub grid_config: Option<GridConfig>,
    #[serde(default)]
    pub map_image_config: Option<MapImageConfig>,
    pub uploaded_by: String,
}

/// Validates `filename` is present, replaces the room's active map, then
/// re-fetches and broadcasts the server-normalized document rather than the
/// raw request body.
pub async fn update_map(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Json(body): Json<UpdateMapBody>,
) -> GameResult<Json<ActiveMap>> {
    if body.filename.trim().is_empty() {
        return Err(GameError::Validation("filename must not be empty".to_string()));
    }

    let uploaded_by = PlayerName::new(&body.uploaded_by);
    let map = ActiveMap {
        room_id: room.clone(),
        filename: body.filename.clone(),
        original_filename: body.original_filename.unwrap_or_else(|| body.filename.clone()),
        file_path: body.file_path.unwrap_or_default(),
        grid_config: body.grid_config,
        map_image_config: body.map_image_config,
        uploaded_by,
        active: true,
    };

    ctx.map_service.update_complete_map(&room, map).await?;
    let refetched = ctx
        .map_service
        .get_active_map(&room)
        .await?
        .ok_or_else(|| GameError::NotFound(format!("active map for room {room} not found")))?;

    super::broadcast(&ctx, &room, "map_config_update", json!(refetched)).await;

    Ok(Json(refetched))
}

pub async fn get_active_map(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
) -> GameResult<Json<ActiveMap>> {
    let map = ctx
        .map_service
        .get_active_map(&room)
        .await?
        .ok_or_else(|| GameError::NotFound(format!("no active map for room {room}")))?;
    Ok(Json(map))
}
