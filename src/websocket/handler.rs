//! WebSocket upgrade handler: the entry point for `/ws/{room_id}`.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::server::AppContext;

use super::connection::handle_socket;

#[derive(Deserialize)]
pub struct ConnectQuery {
    pub player_name: String,
}

/// Upgrades the HTTP connection and hands off to [`handle_socket`] once a
/// `room_id` path segment and `player_name` query parameter are present.
/// A missing or blank `player_name` is rejected before the upgrade
/// completes, since every downstream event needs an identity to attribute.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    State(ctx): State<AppContext>,
) -> Response {
    let player = crate::domain::PlayerName::new(&query.player_name);
    if player.as_str().is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, ctx, room_id, player))
}
