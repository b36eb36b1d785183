//! Seat count/layout/color mutations: `PUT /game/{room}/seats`,
//! `PUT /game/{room}/seat-layout`, `PUT /game/{room}/colors`.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{LogType, PlayerName, Room, SEAT_EMPTY};
use crate::error::{GameError, GameResult};
use crate::server::AppContext;

#[derive(Deserialize)]
pub struct DisplacedPlayer {
    pub player_name: String,
    #[serde(default)]
    pub seat_id: Option<usize>,
}

#[derive(Deserialize)]
pub struct UpdateSeatCountBody {
    pub max_players: u8,
    #[serde(default)]
    pub displaced_players: Vec<DisplacedPlayer>,
}

/// 1. Validate `1 <= max_players <= 8`.
/// 2. Unicast `player_displaced` to each caller-supplied displaced player,
///    flip their party flag off, and log a "moved to lobby" system entry.
/// 3. Recompute a `max_players`-length layout: surviving, in-bounds
///    occupants keep their seat index, everything else becomes `"empty"`.
/// 4. Persist via `RoomService::update_seat_count`.
/// 5. Broadcast `seat_count_change`.
pub async fn update_seat_count(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Json(body): Json<UpdateSeatCountBody>,
) -> GameResult<Json<Room>> {
    if !(1..=8).contains(&body.max_players) {
        return Err(GameError::Validation(
            "max_players must be between 1 and 8".to_string(),
        ));
    }

    let current = ctx
        .room_service
        .get_room(&room)
        .await?
        .ok_or_else(|| GameError::NotFound(format!("room {room} not found")))?;

    let displaced: std::collections::HashSet<PlayerName> = body
        .displaced_players
        .iter()
        .map(|d| PlayerName::new(&d.player_name))
        .collect();

    for entry in &body.displaced_players {
        let player = PlayerName::new(&entry.player_name);
        ctx.connections.update_party_status(&room, &player, false);
        ctx.connections
            .send_to_player(
                &room,
                &player,
                json!({
                    "event_type": "player_displaced",
                    "data": { "player_name": player, "seat_id": entry.seat_id },
                }),
            )
            .await;
        ctx.adventure_log
            .add_entry(
                &room,
                format!("{player} was moved to lobby due to seat reduction"),
                LogType::System,
                Some(player.clone()),
                None,
            )
            .await?;
    }

    let new_seats: Vec<String> = (0..body.max_players as usize)
        .map(|i| match current.seat_layout.get(i) {
            Some(occupant)
                if occupant.as_str() != SEAT_EMPTY
                    && !displaced.contains(&PlayerName::new(occupant)) =>
            {
                occupant.clone()
            }
            _ => SEAT_EMPTY.to_string(),
        })
        .collect();

    let room_doc = ctx
        .room_service
        .update_seat_count(&room, body.max_players, new_seats.clone())
        .await?;

    super::broadcast(
        &ctx,
        &room,
        "seat_count_change",
        json!({ "max_players": body.max_players, "new_seats": new_seats }),
    )
    .await;

    Ok(Json(room_doc))
}

#[derive(Deserialize)]
pub struct UpdateSeatLayoutBody {
    pub seat_layout: Vec<String>,
}

pub async fn update_seat_layout(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Json(body): Json<UpdateSeatLayoutBody>,
) -> GameResult<Json<Room>> {
    let all_empty = body.seat_layout.iter().all(|s| s == SEAT_EMPTY);
    let room_doc = ctx.room_service.update_seat_layout(&room, body.seat_layout).await?;

    if !all_empty {
        ctx.adventure_log
            .add_entry(
                &room,
                "the party was updated".to_string(),
                LogType::System,
                None,
                None,
            )
            .await?;
    }

    super::broadcast(
        &ctx,
        &room,
        "party_updated",
        json!({ "seat_layout": room_doc.seat_layout }),
    )
    .await;

    Ok(Json(room_doc))
}

#[derive(Deserialize)]
pub struct UpdateColorsBody {
    pub seat_colors: BTreeMap<String, String>,
}

pub async fn update_colors(
    State(ctx): State<AppContext>,
    Path(room): Path<String>,
    Json(body): Json<UpdateColorsBody>,
) -> GameResult<Json<Room>> {
    let room_doc = ctx
        .room_service
        .update_seat_colors(&room, body.seat_colors)
        .await?;

    super::broadcast(
        &ctx,
        &room,
        "color_change",
        json!({ "seat_colors": room_doc.seat_colors }),
    )
    .await;

    Ok(Json(room_doc))
}
