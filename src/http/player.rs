//! `PUT /game/{room}/player/character`: character data is owned and
//! modeled by the external site service, not this one. This endpoint
//! exists purely so connected clients see updates in real time — the room
//! only has to exist, the body is otherwise opaque and unpersisted here.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::error::{GameError, GameResult};
use crate::server::AppContext;

pub async fn update_character(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Json(body): Json<Value>,
) -> GameResult<axum::http::StatusCode> {
    ctx.room_service
        .get_room(&room)
        .await?
        .ok_or_else(|| GameError::NotFound(format!("room {room} not found")))?;

    super::broadcast(&ctx, &room, "player_character_changed", body).await;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
