//! Dice-prompt and roll lifecycle (§4.5.2–4.5.3): a prompt is a
//! DM-issued request for a specific player (or all players, for
//! initiative) to roll, identified by a `prompt_id` and paired with
//! exactly one adventure-log entry until it is resolved or cleared.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::messages::format_dice_roll;
use super::util::parse_data;
use super::{EventHandler, HandlerResult, Outbound};
use crate::domain::{LogType, PlayerName, RoomId};
use crate::error::GameResult;
use crate::server::AppContext;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DicePromptData {
    prompted_player: PlayerName,
    roll_type: String,
    prompt_id: String,
}

pub struct DicePromptHandler;

#[async_trait]
impl EventHandler for DicePromptHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: DicePromptData = parse_data(data)?;
        let log_message = format!("DM asks {} to roll {}", data.prompted_player, data.roll_type);
        ctx.adventure_log
            .add_entry(
                room,
                log_message.clone(),
                LogType::DungeonMaster,
                Some(data.prompted_player.clone()),
                Some(data.prompt_id.clone()),
            )
            .await?;

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "dice_prompt",
            "data": {
                "prompted_player": data.prompted_player,
                "roll_type": data.roll_type,
                "prompt_id": data.prompt_id,
                "log_message": log_message,
            },
        }))))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiativePromptAllData {
    targets: Vec<PlayerName>,
    #[serde(default = "default_roll_type")]
    roll_type: String,
}

fn default_roll_type() -> String {
    "initiative".to_string()
}

pub struct InitiativePromptAllHandler;

#[async_trait]
impl EventHandler for InitiativePromptAllHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: InitiativePromptAllData = parse_data(data)?;
        let prompt_id = format!("initiative_all_{}", chrono::Utc::now().timestamp_millis());
        let names = data
            .targets
            .iter()
            .map(PlayerName::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let log_message = format!("DM asks {names} to roll {}", data.roll_type);
        ctx.adventure_log
            .add_entry(room, log_message.clone(), LogType::DungeonMaster, None, Some(prompt_id.clone()))
            .await?;

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "initiative_prompt_all",
            "data": {
                "targets": data.targets,
                "roll_type": data.roll_type,
                "prompt_id": prompt_id,
                "initiative_prompt_id": prompt_id,
                "log_message": log_message,
            },
        }))))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DicePromptClearData {
    #[serde(default)]
    clear_all: bool,
    prompt_id: Option<String>,
    initiative_prompt_id: Option<String>,
}

pub struct DicePromptClearHandler;

#[async_trait]
impl EventHandler for DicePromptClearHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: DicePromptClearData = parse_data(data)?;
        let removal_id = if data.clear_all {
            data.initiative_prompt_id.clone().or_else(|| data.prompt_id.clone())
        } else {
            data.prompt_id.clone()
        };

        let log_removal = if let Some(id) = &removal_id {
            let removed = ctx.adventure_log.remove_by_prompt_id(room, id).await?;
            (removed > 0).then(|| {
                Outbound::Room(json!({
                    "event_type": "adventure_log_removed",
                    "data": { "prompt_id": id },
                }))
            })
        } else {
            None
        };

        Ok(HandlerResult {
            primary: Some(Outbound::Room(json!({
                "event_type": "dice_prompt_clear",
                "data": {
                    "clear_all": data.clear_all,
                    "prompt_id": data.prompt_id,
                    "initiative_prompt_id": data.initiative_prompt_id,
                },
            }))),
            log_removal,
            prompt_clear: None,
        })
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiceRollData {
    player: PlayerName,
    dice_notation: String,
    results: Vec<i64>,
    #[serde(default)]
    modifier: Option<i64>,
    total: i64,
    #[serde(default)]
    advantage: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    prompt_id: Option<String>,
}

/// One of two shapes depending on whether the roll that triggered this
/// clear carried a tracked `prompt_id` (a DM-issued single-target prompt)
/// or was a bare initiative-style roll with only a player name.
#[derive(Serialize)]
#[serde(untagged)]
enum DiceCleared {
    ByPrompt {
        cleared_by: &'static str,
        auto_cleared: bool,
        prompt_id: String,
    },
    ByPlayer {
        cleared_by: &'static str,
        auto_cleared: bool,
        cleared_player: PlayerName,
    },
}

pub struct DiceRollHandler;

#[async_trait]
impl EventHandler for DiceRollHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: DiceRollData = parse_data(data)?;
        let message = format_dice_roll(
            data.context.as_deref(),
            &data.dice_notation,
            &data.results,
            data.modifier,
            data.total,
            data.advantage.as_deref(),
        );
        ctx.adventure_log
            .add_entry(
                room,
                message.clone(),
                LogType::PlayerRoll,
                Some(data.player.clone()),
                data.prompt_id.clone(),
            )
            .await?;

        let log_removal = if let Some(prompt_id) = &data.prompt_id {
            let removed = ctx.adventure_log.remove_by_prompt_id(room, prompt_id).await?;
            (removed > 0).then(|| {
                Outbound::Room(json!({
                    "event_type": "adventure_log_removed",
                    "data": { "prompt_id": prompt_id },
                }))
            })
        } else {
            None
        };

        let cleared = if let Some(prompt_id) = &data.prompt_id {
            DiceCleared::ByPrompt {
                cleared_by: "system",
                auto_cleared: true,
                prompt_id: prompt_id.clone(),
            }
        } else {
            DiceCleared::ByPlayer {
                cleared_by: "system",
                auto_cleared: true,
                cleared_player: data.player.clone(),
            }
        };

        Ok(HandlerResult {
            primary: Some(Outbound::Room(json!({
                "event_type": "dice_roll",
                "data": {
                    "message": message,
                    "player": data.player,
                    "prompt_id": data.prompt_id,
                    "dice_notation": data.dice_notation,
                    "results": data.results,
                    "modifier": data.modifier,
                    "total": data.total,
                    "advantage": data.advantage,
                    "context": data.context,
                },
            }))),
            log_removal,
            prompt_clear: Some(Outbound::Room(json!({
                "event_type": "dice_prompt_clear",
                "data": cleared,
            }))),
        })
    }
}

/// Not detailed beyond its name in the inbound-event catalog: relayed to
/// the room as-is, since the core does not own combat-turn-order state.
pub struct CombatStateHandler;

#[async_trait]
impl EventHandler for CombatStateHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        _room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "combat_state",
            "data": data,
        }))))
    }
}
