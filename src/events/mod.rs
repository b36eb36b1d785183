//! Inbound WebSocket event handling: one [`EventHandler`] per `event_type`,
//! looked up in a registration table built once at startup.
//!
//! A `HashMap<&'static str, Box<dyn EventHandler>>` rather than a `match`
//! on message kind, so a new event is added by registering a handler, not
//! by editing a switch.

mod audio;
mod map;
mod messages;
mod presence;
mod prompts;
mod roles;
mod seats;
mod util;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{PlayerName, RoomId};
use crate::error::GameResult;
use crate::server::AppContext;

/// Where an outbound frame should go. The connection manager resolves
/// `RoomExcept`/`Room` against its own live presence table — handlers never
/// see the socket list directly.
#[derive(Debug, Clone)]
pub enum Outbound {
    Room(Value),
    RoomExcept(PlayerName, Value),
    Player(PlayerName, Value),
}

/// The result of handling one inbound frame: a primary broadcast plus up to
/// two follow-ups, applied in this order by the dispatcher. For
/// `dice_roll`, the dispatcher inserts a short delay before the follow-ups
/// so client UIs see the primary roll animation first; every other event's
/// follow-ups (there are none today outside the prompt lifecycle) go out
/// immediately.
#[derive(Debug, Clone, Default)]
pub struct HandlerResult {
    pub primary: Option<Outbound>,
    pub log_removal: Option<Outbound>,
    pub prompt_clear: Option<Outbound>,
}

impl HandlerResult {
    #[must_use]
    pub fn primary_only(outbound: Outbound) -> Self {
        Self {
            primary: Some(outbound),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// One registered inbound-event handler. `data` is the frame's `data`
/// field, not yet typed — each handler deserializes the sub-shape it
/// expects and returns a `Validation` error on mismatch.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult>;
}

/// Registration table mapping `event_type` to its handler. Unknown types
/// are not an error here — the dispatcher logs and drops the frame, per
/// the "registering, not editing a switch" design note.
pub struct EventDispatchTable {
    handlers: HashMap<&'static str, Box<dyn EventHandler>>,
}

impl EventDispatchTable {
    #[must_use]
    pub fn with_default_handlers() -> Self {
        let mut table = Self {
            handlers: HashMap::new(),
        };
        table.register("seat_change", Box::new(seats::SeatChangeHandler));
        table.register("seat_count_change", Box::new(seats::SeatCountChangeHandler));
        table.register("color_change", Box::new(seats::ColorChangeHandler));
        table.register("player_kicked", Box::new(seats::PlayerKickedHandler));

        table.register("dice_prompt", Box::new(prompts::DicePromptHandler));
        table.register(
            "initiative_prompt_all",
            Box::new(prompts::InitiativePromptAllHandler),
        );
        table.register(
            "dice_prompt_clear",
            Box::new(prompts::DicePromptClearHandler),
        );
        table.register("dice_roll", Box::new(prompts::DiceRollHandler));
        table.register("combat_state", Box::new(prompts::CombatStateHandler));

        table.register("remote_audio_play", Box::new(audio::RemoteAudioPlayHandler));
        table.register(
            "remote_audio_resume",
            Box::new(audio::RemoteAudioResumeHandler),
        );
        table.register(
            "remote_audio_batch",
            Box::new(audio::RemoteAudioBatchHandler),
        );

        table.register("map_load", Box::new(map::MapLoadHandler));
        table.register("map_clear", Box::new(map::MapClearHandler));
        table.register("map_config_update", Box::new(map::MapConfigUpdateHandler));
        table.register("map_request", Box::new(map::MapRequestHandler));

        table.register("role_change", Box::new(roles::RoleChangeHandler));

        table.register(
            "clear_system_messages",
            Box::new(seats::ClearSystemMessagesHandler),
        );
        table.register(
            "clear_all_messages",
            Box::new(seats::ClearAllMessagesHandler),
        );

        table
    }

    fn register(&mut self, event_type: &'static str, handler: Box<dyn EventHandler>) {
        self.handlers.insert(event_type, handler);
    }

    #[must_use]
    pub fn get(&self, event_type: &str) -> Option<&dyn EventHandler> {
        self.handlers.get(event_type).map(std::convert::AsRef::as_ref)
    }
}

pub use presence::{handle_player_connection, handle_player_disconnect};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_registers_every_catalog_event() {
        let table = EventDispatchTable::with_default_handlers();
        for event_type in [
            "seat_change",
            "seat_count_change",
            "color_change",
            "player_kicked",
            "dice_prompt",
            "initiative_prompt_all",
            "dice_prompt_clear",
            "dice_roll",
            "combat_state",
            "remote_audio_play",
            "remote_audio_resume",
            "remote_audio_batch",
            "map_load",
            "map_clear",
            "map_config_update",
            "map_request",
            "role_change",
            "clear_system_messages",
            "clear_all_messages",
        ] {
            assert!(table.get(event_type).is_some(), "missing handler for {event_type}");
        }
        assert!(table.get("unknown_event").is_none());
    }
}
