//! Role-change events (§4.5.7): moderator/DM set-membership edits applied
//! through `RoomService`, logged, and broadcast.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::util::parse_data;
use super::{EventHandler, HandlerResult, Outbound};
use crate::domain::{LogType, PlayerName, RoomId};
use crate::error::{GameError, GameResult};
use crate::server::AppContext;

#[derive(Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum RoleAction {
    AddModerator,
    RemoveModerator,
    SetDm,
    UnsetDm,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleChangeData {
    action: RoleAction,
    #[serde(default)]
    target_player: Option<PlayerName>,
}

pub struct RoleChangeHandler;

#[async_trait]
impl EventHandler for RoleChangeHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: RoleChangeData = parse_data(data)?;

        let (room_doc, log_message) = match data.action {
            RoleAction::AddModerator => {
                let target = data
                    .target_player
                    .clone()
                    .ok_or_else(|| GameError::Validation("target_player required".to_string()))?;
                let room_doc = ctx.room_service.add_moderator(room, &target).await?;
                (room_doc, format!("{target} was made a moderator"))
            }
            RoleAction::RemoveModerator => {
                let target = data
                    .target_player
                    .clone()
                    .ok_or_else(|| GameError::Validation("target_player required".to_string()))?;
                let room_doc = ctx.room_service.remove_moderator(room, &target).await?;
                (room_doc, format!("{target} is no longer a moderator"))
            }
            RoleAction::SetDm => {
                let target = data
                    .target_player
                    .clone()
                    .ok_or_else(|| GameError::Validation("target_player required".to_string()))?;
                let room_doc = ctx.room_service.set_dm(room, &target).await?;
                (room_doc, format!("{target} is now the dungeon master"))
            }
            RoleAction::UnsetDm => {
                let room_doc = ctx.room_service.unset_dm(room).await?;
                (room_doc, "the dungeon master role was cleared".to_string())
            }
        };

        ctx.adventure_log
            .add_entry(room, log_message, LogType::System, data.target_player.clone(), None)
            .await?;

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "role_change",
            "data": {
                "dungeon_master": room_doc.dungeon_master,
                "moderators": room_doc.moderators,
            },
        }))))
    }
}
