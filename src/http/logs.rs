//! Adventure log read/delete surface: `GET /game/{room}/logs`,
//! `GET /game/{room}/logs/stats`, `DELETE /game/{room}/logs[/system]`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::{AdventureLogEntry, LogStats, LogType};
use crate::error::GameResult;
use crate::server::AppContext;

#[derive(Deserialize)]
pub struct LogsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Serialize)]
pub struct LogsResponse {
    pub logs: Vec<AdventureLogEntry>,
    pub total_count: usize,
    pub returned_count: usize,
}

pub async fn get_logs(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Query(query): Query<LogsQuery>,
) -> GameResult<Json<LogsResponse>> {
    let (logs, total_count) = ctx
        .adventure_log
        .get_room_logs(&room, query.limit, query.skip)
        .await?;
    let returned_count = logs.len();
    Ok(Json(LogsResponse {
        logs,
        total_count,
        returned_count,
    }))
}

pub async fn get_stats(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
) -> GameResult<Json<LogStats>> {
    let stats = ctx.adventure_log.stats(&room).await?;
    Ok(Json(stats))
}

pub async fn clear_all(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
) -> GameResult<Json<serde_json::Value>> {
    let removed = ctx.adventure_log.clear_all(&room).await?;
    ctx.adventure_log
        .add_entry(&room, "messages cleared".to_string(), LogType::System, None, None)
        .await?;
    super::broadcast(&ctx, &room, "logs_cleared", serde_json::json!({ "removed": removed })).await;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

pub async fn clear_system(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
) -> GameResult<Json<serde_json::Value>> {
    let removed = ctx.adventure_log.clear_system_messages(&room).await?;
    ctx.adventure_log
        .add_entry(&room, "messages cleared".to_string(), LogType::System, None, None)
        .await?;
    super::broadcast(&ctx, &room, "logs_cleared", serde_json::json!({ "removed": removed })).await;
    Ok(Json(serde_json::json!({ "removed": removed })))
}
