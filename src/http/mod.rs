//! REST control plane. Every endpoint that mutates room state performs the
//! mutation through the same services the WebSocket event handlers use,
//! then broadcasts the resulting event via [`AppContext::connections`] so
//! every connected client observes the change exactly as it would over the
//! WebSocket, following the same pattern `websocket/routes.rs` uses for its
//! own router: one `axum::Router` built from per-concern route groups and
//! merged under a single `with_state`.

mod logs;
mod map;
mod player;
mod roles;
mod rooms;
mod seats;
mod session;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::domain::RoomId;
use crate::server::AppContext;

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/game/", post(rooms::create_room))
        .route("/game/{room}", post(rooms::create_room_with_id))
        .route("/game/{room}", get(rooms::get_room))
        .route("/game/{room}/roles", get(roles::get_roles))
        .route(
            "/game/{room}/moderators",
            post(roles::add_moderator).delete(roles::remove_moderator),
        )
        .route("/game/{room}/dm", post(roles::set_dm).delete(roles::unset_dm))
        .route("/game/session/start", post(session::start))
        .route("/game/session/end", post(session::end))
        .route("/game/session/{id}", delete(session::delete_session))
        .route("/game/{room}/seats", put(seats::update_seat_count))
        .route("/game/{room}/seat-layout", put(seats::update_seat_layout))
        .route("/game/{room}/colors", put(seats::update_colors))
        .route("/game/{room}/map", put(map::update_map))
        .route("/game/{room}/active-map", get(map::get_active_map))
        .route("/game/{room}/logs", get(logs::get_logs).delete(logs::clear_all))
        .route("/game/{room}/logs/stats", get(logs::get_stats))
        .route("/game/{room}/logs/system", delete(logs::clear_system))
        .route("/game/{room}/player/character", put(player::update_character))
}

/// Broadcasts `{event_type, data}` to every live socket in `room`. The
/// shared helper used by every HTTP handler below, mirroring what
/// `events::Outbound::Room` resolves to on the WebSocket side so both
/// surfaces emit identically-shaped frames.
pub(crate) async fn broadcast(ctx: &AppContext, room: &RoomId, event_type: &str, data: serde_json::Value) {
    ctx.connections
        .broadcast_to_room(
            room,
            serde_json::json!({ "event_type": event_type, "data": data }),
            None,
        )
        .await;
}
