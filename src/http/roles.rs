//! Role queries and moderator/DM set-membership edits.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{LogType, PlayerName};
use crate::error::GameResult;
use crate::server::{AppContext, RoleBits};

#[derive(Deserialize)]
pub struct RolesQuery {
    pub player_name: String,
}

pub async fn get_roles(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Query(query): Query<RolesQuery>,
) -> GameResult<Json<RoleBits>> {
    let player = PlayerName::new(&query.player_name);
    let bits = ctx.room_service.role_bits(&room, &player).await?;
    Ok(Json(bits))
}

#[derive(Deserialize)]
pub struct TargetPlayerBody {
    pub player_name: String,
}

async fn broadcast_role_change(ctx: &AppContext, room: &str, room_doc: &crate::domain::Room) {
    super::broadcast(
        ctx,
        &room.to_string(),
        "role_change",
        json!({
            "dungeon_master": room_doc.dungeon_master,
            "moderators": room_doc.moderators,
        }),
    )
    .await;
}

pub async fn add_moderator(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Json(body): Json<TargetPlayerBody>,
) -> GameResult<Json<crate::domain::Room>> {
    let target = PlayerName::new(&body.player_name);
    let room_doc = ctx.room_service.add_moderator(&room, &target).await?;
    ctx.adventure_log
        .add_entry(
            &room,
            format!("{target} was made a moderator"),
            LogType::System,
            Some(target.clone()),
            None,
        )
        .await?;
    broadcast_role_change(&ctx, &room, &room_doc).await;
    Ok(Json(room_doc))
}

pub async fn remove_moderator(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Json(body): Json<TargetPlayerBody>,
) -> GameResult<Json<crate::domain::Room>> {
    let target = PlayerName::new(&body.player_name);
    let room_doc = ctx.room_service.remove_moderator(&room, &target).await?;
    ctx.adventure_log
        .add_entry(
            &room,
            format!("{target} is no longer a moderator"),
            LogType::System,
            Some(target.clone()),
            None,
        )
        .await?;
    broadcast_role_change(&ctx, &room, &room_doc).await;
    Ok(Json(room_doc))
}

pub async fn set_dm(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Json(body): Json<TargetPlayerBody>,
) -> GameResult<Json<crate::domain::Room>> {
    let target = PlayerName::new(&body.player_name);
    let room_doc = ctx.room_service.set_dm(&room, &target).await?;
    ctx.adventure_log
        .add_entry(
            &room,
            format!("{target} is now the dungeon master"),
            LogType::System,
            Some(target.clone()),
            None,
        )
        .await?;
    broadcast_role_change(&ctx, &room, &room_doc).await;
    Ok(Json(room_doc))
}

pub async fn unset_dm(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
) -> GameResult<Json<crate::domain::Room>> {
    let room_doc = ctx.room_service.unset_dm(&room).await?;
    ctx.adventure_log
        .add_entry(
            &room,
            "the dungeon master role was cleared".to_string(),
            LogType::System,
            None,
            None,
        )
        .await?;
    broadcast_role_change(&ctx, &room, &room_doc).await;
    Ok(Json(room_doc))
}
