//! Room CRUD: `GET /game/{room}`, `POST /game/`, `POST /game/{id}`.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::domain::Room;
use crate::error::GameResult;
use crate::server::{AppContext, CreateRoomInput};

#[derive(Deserialize)]
pub struct CreateRoomBody {
    pub max_players: u8,
    #[serde(default)]
    pub dungeon_master: Option<String>,
    #[serde(default)]
    pub room_host: Option<String>,
}

#[derive(serde::Serialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
}

pub async fn create_room(
    State(ctx): State<AppContext>,
    Json(body): Json<CreateRoomBody>,
) -> GameResult<Json<CreateRoomResponse>> {
    let room_id = ctx
        .room_service
        .create_room(
            CreateRoomInput {
                max_players: body.max_players,
                dungeon_master: body.dungeon_master,
                room_host: body.room_host,
            },
            None,
        )
        .await?;
    ctx.metrics.increment_rooms_created();
    Ok(Json(CreateRoomResponse { room_id }))
}

pub async fn create_room_with_id(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(body): Json<CreateRoomBody>,
) -> GameResult<Json<CreateRoomResponse>> {
    let room_id = ctx
        .room_service
        .create_room(
            CreateRoomInput {
                max_players: body.max_players,
                dungeon_master: body.dungeon_master,
                room_host: body.room_host,
            },
            Some(id),
        )
        .await?;
    ctx.metrics.increment_rooms_created();
    Ok(Json(CreateRoomResponse { room_id }))
}

pub async fn get_room(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
) -> GameResult<Json<Room>> {
    let room = ctx
        .room_service
        .get_room(&room)
        .await?
        .ok_or_else(|| crate::error::GameError::NotFound(format!("room {room} not found")))?;
    Ok(Json(room))
}
