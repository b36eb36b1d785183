//! Per-socket connection lifecycle: accept, dispatch inbound frames through
//! the [`EventDispatchTable`], fan out the resulting [`Outbound`] targets,
//! and announce presence changes on close.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::{PlayerName, RoomId};
use crate::events::{handle_player_connection, handle_player_disconnect, HandlerResult, Outbound};
use crate::server::AppContext;

const OUTBOUND_QUEUE_CAPACITY: usize = 64;

pub(super) async fn handle_socket(
    socket: WebSocket,
    ctx: AppContext,
    room: RoomId,
    player: PlayerName,
) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<Value>>(OUTBOUND_QUEUE_CAPACITY);

    let reconnected = ctx.connections.accept(room.clone(), player.clone(), tx);
    debug!(%room, %player, reconnected, "websocket connection accepted");

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(frame.as_ref()) {
                Ok(text) => text,
                Err(error) => {
                    warn!(%error, "failed to serialize outbound frame");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    if !reconnected {
        match handle_player_connection(&ctx, &room, &player).await {
            Ok(result) => apply_handler_result(&ctx, &room, result).await,
            Err(error) => warn!(%room, %player, %error, "failed to announce player_connected"),
        }
    }

    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(error) => {
                debug!(%room, %player, %error, "websocket read error, closing");
                break;
            }
        };

        match message {
            Message::Text(text) => dispatch_frame(&ctx, &room, &player, &text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    crate::server::ConnectionManager::remove(&ctx.connections, room.clone(), player.clone());
    let outbound = handle_player_disconnect(&ctx, &room, &player).await;
    for item in outbound {
        send_outbound(&ctx, &room, item).await;
    }

    send_task.abort();
}

#[derive(serde::Deserialize)]
struct InboundFrame {
    event_type: String,
    #[serde(default)]
    data: Value,
}

async fn dispatch_frame(ctx: &AppContext, room: &RoomId, player: &PlayerName, text: &str) {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(error) => {
            ctx.metrics.increment_events_malformed();
            warn!(%room, %player, %error, "dropping malformed websocket frame");
            return;
        }
    };

    let Some(handler) = ctx.dispatch_table.get(&frame.event_type) else {
        ctx.metrics.increment_events_unknown();
        debug!(%room, %player, event_type = %frame.event_type, "dropping unknown event type");
        return;
    };

    ctx.metrics.increment_events_dispatched();
    match handler.handle(ctx, room, player, frame.data).await {
        Ok(result) => run_follow_up(ctx, room, &frame.event_type, result).await,
        Err(error) => {
            warn!(%room, %player, event_type = %frame.event_type, %error, "event handler failed");
            ctx.connections
                .send_to_player(room, player, error.to_ws_error_frame())
                .await;
        }
    }
}

/// Applies a handler's primary broadcast immediately. `dice_roll` is the
/// only event whose follow-ups (log removal, then the auto prompt-clear)
/// are delayed, so client UIs see the roll animation before the prompt
/// visually disappears; every other event's follow-ups go out right away.
async fn run_follow_up(ctx: &AppContext, room: &RoomId, event_type: &str, result: HandlerResult) {
    if let Some(primary) = result.primary {
        send_outbound(ctx, room, primary).await;
    }

    if event_type == "dice_roll" {
        let delay = Duration::from_millis(ctx.config.server.dispatch_follow_up_delay_ms);
        tokio::time::sleep(delay).await;
    }

    if let Some(log_removal) = result.log_removal {
        send_outbound(ctx, room, log_removal).await;
    }
    if let Some(prompt_clear) = result.prompt_clear {
        send_outbound(ctx, room, prompt_clear).await;
    }
}

async fn apply_handler_result(ctx: &AppContext, room: &RoomId, result: HandlerResult) {
    run_follow_up(ctx, room, "", result).await;
}

async fn send_outbound(ctx: &AppContext, room: &RoomId, outbound: Outbound) {
    match outbound {
        Outbound::Room(frame) => ctx.connections.broadcast_to_room(room, frame, None).await,
        Outbound::RoomExcept(except, frame) => {
            ctx.connections
                .broadcast_to_room(room, frame, Some(&except))
                .await;
        }
        Outbound::Player(target, frame) => {
            ctx.connections.send_to_player(room, &target, frame).await;
        }
    }
}
