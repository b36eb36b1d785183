//! Session lifecycle bridging the external catalog service to a room:
//! `POST /game/session/start`, `POST /game/session/end`,
//! `DELETE /game/session/{id}`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::RoomId;
use crate::error::GameResult;
use crate::server::{AppContext, CreateRoomInput};

#[derive(Deserialize)]
pub struct StartBody {
    pub max_players: u8,
    pub dungeon_master: String,
    #[serde(default)]
    pub seed_assets: Option<Value>,
}

#[derive(Serialize)]
pub struct StartResponse {
    pub room_id: RoomId,
}

/// Creates a minimal room for a freshly-started session: an all-empty seat
/// layout of length `max_players`, the given dungeon master seated as a
/// moderator, and no `room_host` — the core only tracks `room_host` once a
/// real player claims a seat in-room, not at catalog-driven creation time.
pub async fn start(
    State(ctx): State<AppContext>,
    Json(body): Json<StartBody>,
) -> GameResult<Json<StartResponse>> {
    let room_id = ctx
        .room_service
        .create_room(
            CreateRoomInput {
                max_players: body.max_players,
                dungeon_master: Some(body.dungeon_master),
                room_host: None,
            },
            None,
        )
        .await?;
    ctx.metrics.increment_rooms_created();
    Ok(Json(StartResponse { room_id }))
}

#[derive(Deserialize)]
pub struct EndQuery {
    #[serde(default)]
    pub validate_only: bool,
}

#[derive(Deserialize)]
pub struct EndBody {
    pub room_id: RoomId,
    #[serde(default)]
    pub keep_logs: bool,
}

#[derive(Serialize)]
pub struct SessionStats {
    pub duration_minutes: i64,
    pub total_logs: usize,
    pub max_players: u8,
}

#[derive(Serialize)]
pub struct EndResponse {
    pub players: Vec<String>,
    pub session_stats: SessionStats,
    pub audio_state: std::collections::BTreeMap<String, crate::domain::AudioChannelRecord>,
    pub map_state: Option<crate::domain::ActiveMap>,
}

async fn compute_end_payload(ctx: &AppContext, room_id: &RoomId) -> GameResult<EndResponse> {
    let room = ctx
        .room_service
        .get_room(room_id)
        .await?
        .ok_or_else(|| crate::error::GameError::NotFound(format!("room {room_id} not found")))?;
    let stats = ctx.adventure_log.stats(room_id).await?;
    let map_state = ctx.map_service.get_active_map(room_id).await?;
    let duration_minutes = (chrono::Utc::now() - room.created_at).num_minutes();

    let players = room
        .seat_layout
        .iter()
        .filter(|s| s.as_str() != crate::domain::SEAT_EMPTY)
        .cloned()
        .collect();

    Ok(EndResponse {
        players,
        session_stats: SessionStats {
            duration_minutes,
            total_logs: stats.total,
            max_players: room.max_players,
        },
        audio_state: room.audio_state,
        map_state,
    })
}

/// When `validate_only`, computes and returns the would-be end payload
/// without touching anything. Otherwise computes the payload, then
/// proceeds exactly as [`delete_session`] (close sockets, delete the room,
/// honor `keep_logs`).
pub async fn end(
    State(ctx): State<AppContext>,
    Query(query): Query<EndQuery>,
    Json(body): Json<EndBody>,
) -> GameResult<Json<EndResponse>> {
    let payload = compute_end_payload(&ctx, &body.room_id).await?;
    if query.validate_only {
        return Ok(Json(payload));
    }

    ctx.close_room_connections(&body.room_id);
    if !body.keep_logs {
        let _ = ctx.adventure_log.clear_all(&body.room_id).await;
    }
    ctx.map_service.clear_active_map(&body.room_id).await.ok();
    let deleted = ctx.room_service.delete_room(&body.room_id).await?;
    if deleted {
        ctx.metrics.increment_rooms_deleted();
    }
    Ok(Json(payload))
}

pub async fn delete_session(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(keep_logs): Query<KeepLogsQuery>,
) -> GameResult<axum::http::StatusCode> {
    ctx.close_room_connections(&id);
    if !keep_logs.keep_logs {
        let _ = ctx.adventure_log.clear_all(&id).await;
    }
    ctx.map_service.clear_active_map(&id).await.ok();
    let deleted = ctx.room_service.delete_room(&id).await?;
    if deleted {
        ctx.metrics.increment_rooms_deleted();
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct KeepLogsQuery {
    #[serde(default)]
    pub keep_logs: bool,
}
