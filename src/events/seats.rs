//! Seat/party state, role-adjacent room-wide broadcasts, and log-clearing
//! events (§4.5.1 of the room-coordination design).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::messages;
use super::util::parse_data;
use super::{EventHandler, HandlerResult, Outbound};
use crate::domain::{LogType, PlayerName, RoomId, SEAT_EMPTY};
use crate::error::GameResult;
use crate::server::AppContext;

#[derive(Deserialize)]
struct SeatChangeData {
    seat_layout: Vec<String>,
}

pub struct SeatChangeHandler;

#[async_trait]
impl EventHandler for SeatChangeHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: SeatChangeData = parse_data(data)?;
        let room_doc = ctx
            .room_service
            .update_seat_layout(room, data.seat_layout)
            .await?;

        let seated: std::collections::HashSet<&str> = room_doc
            .seat_layout
            .iter()
            .filter(|s| s.as_str() != SEAT_EMPTY)
            .map(String::as_str)
            .collect();
        for tracked in ctx.connections.tracked_players(room) {
            let in_party = seated.contains(tracked.as_str());
            ctx.connections.update_party_status(room, &tracked, in_party);
        }
        ctx.connections.broadcast_lobby_update(room).await;

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "seat_change",
            "data": { "seat_layout": room_doc.seat_layout },
        }))))
    }
}

/// Broadcast-only mirror of `PUT /game/{room}/seats`: the HTTP handler has
/// already validated bounds, persisted the layout and unicast the
/// `player_displaced` notices. This handler exists so a WebSocket-only
/// client path can re-announce the same event shape if ever needed; it
/// does not itself mutate state.
pub struct SeatCountChangeHandler;

#[async_trait]
impl EventHandler for SeatCountChangeHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        _room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "seat_count_change",
            "data": data,
        }))))
    }
}

#[derive(Deserialize)]
struct ColorChangeData {
    seat_id: String,
    color: String,
}

pub struct ColorChangeHandler;

#[async_trait]
impl EventHandler for ColorChangeHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: ColorChangeData = parse_data(data)?;
        let mut room_doc = ctx
            .room_service
            .get_room(room)
            .await?
            .ok_or_else(|| crate::error::GameError::NotFound(format!("room {room} not found")))?;
        room_doc.seat_colors.insert(data.seat_id.clone(), data.color.clone());
        let room_doc = ctx
            .room_service
            .update_seat_colors(room, room_doc.seat_colors)
            .await?;

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "color_change",
            "data": { "seat_colors": room_doc.seat_colors },
        }))))
    }
}

/// Not part of the documented event-handler catalog beyond its name in the
/// inbound-event list: treated as a thin room-wide relay, mirroring how
/// `combat_state` is handled — the core does not interpret kick semantics
/// beyond announcing it, since enforcing who may be kicked is a
/// route-scoped HTTP concern, not a WebSocket one.
pub struct PlayerKickedHandler;

#[async_trait]
impl EventHandler for PlayerKickedHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        _room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "player_kicked",
            "data": data,
        }))))
    }
}

pub struct ClearSystemMessagesHandler;

#[async_trait]
impl EventHandler for ClearSystemMessagesHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        player: &PlayerName,
        _data: Value,
    ) -> GameResult<HandlerResult> {
        ctx.adventure_log.clear_system_messages(room).await?;
        ctx.adventure_log
            .add_entry(
                room,
                messages::messages_cleared("system"),
                LogType::System,
                Some(player.clone()),
                None,
            )
            .await?;
        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "system_messages_cleared",
            "data": {},
        }))))
    }
}

pub struct ClearAllMessagesHandler;

#[async_trait]
impl EventHandler for ClearAllMessagesHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        player: &PlayerName,
        _data: Value,
    ) -> GameResult<HandlerResult> {
        ctx.adventure_log.clear_all(room).await?;
        ctx.adventure_log
            .add_entry(
                room,
                messages::messages_cleared("all"),
                LogType::System,
                Some(player.clone()),
                None,
            )
            .await?;
        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "all_messages_cleared",
            "data": {},
        }))))
    }
}
