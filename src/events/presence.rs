//! Presence events (§4.5.6). Unlike the registered table entries, these
//! two are invoked directly by the dispatcher at accept/close time rather
//! than looked up by `event_type` — there is no inbound frame to match on.

use serde_json::json;
use tracing::warn;

use super::messages;
use super::{HandlerResult, Outbound};
use crate::domain::{LogType, PlayerName, RoomId, SEAT_EMPTY};
use crate::error::GameResult;
use crate::server::AppContext;

/// Called once a socket has been accepted by the connection manager.
/// Appends a `player_connected` log entry and broadcasts it.
pub async fn handle_player_connection(
    ctx: &AppContext,
    room: &RoomId,
    player: &PlayerName,
) -> GameResult<HandlerResult> {
    let message = messages::player_connected(player);
    ctx.adventure_log
        .add_entry(room, message.clone(), LogType::System, Some(player.clone()), None)
        .await?;

    Ok(HandlerResult::primary_only(Outbound::Room(json!({
        "event_type": "player_connected",
        "data": { "player_name": player, "message": message },
    }))))
}

/// Called by the dispatcher on socket close, after the connection manager
/// has already scheduled the reconnect-grace removal task. Logs the
/// disconnect, flips the party flag, and vacates the player's seat. If the
/// room document no longer exists (already torn down by the catalog
/// service), the disconnect is still broadcast and the seat update is
/// silently skipped.
pub async fn handle_player_disconnect(
    ctx: &AppContext,
    room: &RoomId,
    player: &PlayerName,
) -> Vec<Outbound> {
    let message = messages::player_disconnected(player);
    if let Err(error) = ctx
        .adventure_log
        .add_entry(room, message.clone(), LogType::System, Some(player.clone()), None)
        .await
    {
        warn!(room = %room, player = %player, %error, "failed to log player_disconnected, room may be gone");
    }

    ctx.connections.update_party_status(room, player, false);

    let mut outbound = vec![Outbound::Room(json!({
        "event_type": "player_disconnected",
        "data": { "player_name": player, "message": message },
    }))];

    match ctx.room_service.get_room(room).await {
        Ok(Some(mut room_doc)) => {
            let mut changed = false;
            for seat in &mut room_doc.seat_layout {
                if seat.as_str() == player.as_str() {
                    *seat = SEAT_EMPTY.to_string();
                    changed = true;
                }
            }
            if changed {
                match ctx
                    .room_service
                    .update_seat_layout(room, room_doc.seat_layout)
                    .await
                {
                    Ok(updated) => outbound.push(Outbound::Room(json!({
                        "event_type": "seat_change",
                        "data": { "seat_layout": updated.seat_layout },
                    }))),
                    Err(error) => {
                        warn!(room = %room, player = %player, %error, "failed to vacate seat on disconnect");
                    }
                }
            }
        }
        Ok(None) => {}
        Err(error) => {
            warn!(room = %room, player = %player, %error, "failed to load room on disconnect");
        }
    }

    outbound
}
