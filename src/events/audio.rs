//! Synchronized multi-channel audio (§4.5.4). Persistence here is
//! best-effort: live clients already received the broadcast, so a failed
//! write only affects the next cold read, not what anyone currently in the
//! room observes. Document-store errors are logged and swallowed rather
//! than surfaced as a WebSocket `error`, per the "best-effort audio
//! persistence" design note.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::util::{now_secs, parse_data};
use super::{EventHandler, HandlerResult, Outbound};
use crate::domain::{AudioChannelRecord, PlayerName, RoomId};
use crate::error::GameResult;
use crate::server::AppContext;

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct TrackPlay {
    channel_id: String,
    filename: String,
    #[serde(default)]
    volume: f64,
    #[serde(default)]
    looping: bool,
    #[serde(default)]
    asset_id: Option<String>,
    #[serde(default)]
    s3_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteAudioPlayData {
    tracks: Vec<TrackPlay>,
    #[serde(default)]
    triggered_by: Option<PlayerName>,
}

pub struct RemoteAudioPlayHandler;

#[async_trait]
impl EventHandler for RemoteAudioPlayHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: RemoteAudioPlayData = parse_data(data)?;
        let now = now_secs();

        let mut room_doc = ctx
            .room_service
            .get_room(room)
            .await?
            .ok_or_else(|| crate::error::GameError::NotFound(format!("room {room} not found")))?;

        for track in &data.tracks {
            let mut record = AudioChannelRecord {
                filename: Some(track.filename.clone()),
                asset_id: track.asset_id.clone(),
                s3_url: track.s3_url.clone(),
                volume: track.volume,
                looping: track.looping,
                ..AudioChannelRecord::default()
            };
            record.play_now(now);
            room_doc.audio_state.insert(track.channel_id.clone(), record);
        }

        if let Err(error) = ctx
            .room_service
            .replace_audio_state(room, room_doc.audio_state.clone())
            .await
        {
            warn!(room = %room, %error, "best-effort audio persistence failed for remote_audio_play");
        }

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "remote_audio_play",
            "data": {
                "tracks": data.tracks.iter().map(|t| &t.channel_id).collect::<Vec<_>>(),
                "audio_state": room_doc.audio_state,
                "triggered_by": data.triggered_by,
            },
        }))))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteAudioResumeData {
    #[serde(default)]
    tracks: Option<Vec<String>>,
    /// Legacy single-channel selector, used when a client resumes one
    /// named channel (e.g. `"bgm"`, `"sfx"`) instead of a synchronized
    /// `tracks` list.
    #[serde(default)]
    track_type: Option<String>,
    #[serde(default)]
    triggered_by: Option<PlayerName>,
}

pub struct RemoteAudioResumeHandler;

#[async_trait]
impl EventHandler for RemoteAudioResumeHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: RemoteAudioResumeData = parse_data(data)?;
        let now = now_secs();

        let mut room_doc = ctx
            .room_service
            .get_room(room)
            .await?
            .ok_or_else(|| crate::error::GameError::NotFound(format!("room {room} not found")))?;

        let targets: Vec<String> = match (&data.tracks, &data.track_type) {
            (Some(tracks), _) => tracks.clone(),
            (None, Some(track_type)) => vec![track_type.clone()],
            (None, None) => room_doc.audio_state.keys().cloned().collect(),
        };
        for channel_id in &targets {
            if let Some(record) = room_doc.audio_state.get_mut(channel_id) {
                record.resume(now);
            }
        }

        if let Err(error) = ctx
            .room_service
            .replace_audio_state(room, room_doc.audio_state.clone())
            .await
        {
            warn!(room = %room, %error, "best-effort audio persistence failed for remote_audio_resume");
        }

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "remote_audio_resume",
            "data": {
                "tracks": targets,
                "audio_state": room_doc.audio_state,
                "track_type": data.track_type,
                "triggered_by": data.triggered_by,
            },
        }))))
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct AudioOperation {
    track_id: String,
    operation: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    looping: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteAudioBatchData {
    operations: Vec<AudioOperation>,
    #[serde(default)]
    fade_duration: Option<f64>,
    #[serde(default)]
    triggered_by: Option<PlayerName>,
}

pub struct RemoteAudioBatchHandler;

#[async_trait]
impl EventHandler for RemoteAudioBatchHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        room: &RoomId,
        _player: &PlayerName,
        data: Value,
    ) -> GameResult<HandlerResult> {
        let data: RemoteAudioBatchData = parse_data(data)?;
        for op in &data.operations {
            validate_operation(op)?;
        }

        let room_doc = ctx
            .room_service
            .get_room(room)
            .await?
            .ok_or_else(|| crate::error::GameError::NotFound(format!("room {room} not found")))?;
        let mut audio_state: BTreeMap<String, AudioChannelRecord> = room_doc.audio_state;
        let now = now_secs();

        for op in &data.operations {
            let record = audio_state.entry(op.track_id.clone()).or_default();
            apply_operation(record, op, now);
        }

        if let Err(error) = ctx
            .room_service
            .replace_audio_state(room, audio_state.clone())
            .await
        {
            warn!(room = %room, %error, "best-effort audio persistence failed for remote_audio_batch");
        }

        Ok(HandlerResult::primary_only(Outbound::Room(json!({
            "event_type": "remote_audio_batch",
            "data": {
                "operations": data.operations.iter().map(|o| json!({
                    "trackId": o.track_id,
                    "operation": o.operation,
                })).collect::<Vec<_>>(),
                "audio_state": audio_state,
                "fade_duration": data.fade_duration,
                "triggered_by": data.triggered_by,
            },
        }))))
    }
}

fn validate_operation(op: &AudioOperation) -> GameResult<()> {
    match op.operation.as_str() {
        "play" | "load" if op.filename.is_none() => Err(crate::error::GameError::Validation(
            format!("operation {} on track {} requires filename", op.operation, op.track_id),
        )),
        "volume" if op.volume.is_none() => Err(crate::error::GameError::Validation(format!(
            "volume operation on track {} requires volume",
            op.track_id
        ))),
        "loop" if op.looping.is_none() => Err(crate::error::GameError::Validation(format!(
            "loop operation on track {} requires looping",
            op.track_id
        ))),
        "play" | "load" | "volume" | "loop" | "stop" | "pause" | "resume" => Ok(()),
        other => Err(crate::error::GameError::Validation(format!(
            "unknown audio batch operation {other}"
        ))),
    }
}

fn apply_operation(record: &mut AudioChannelRecord, op: &AudioOperation, now: f64) {
    match op.operation.as_str() {
        "play" => {
            if let Some(filename) = &op.filename {
                record.filename = Some(filename.clone());
            }
            if let Some(volume) = op.volume {
                record.volume = volume;
            }
            if let Some(looping) = op.looping {
                record.looping = looping;
            }
            record.play_now(now);
        }
        "load" => {
            record.load(
                op.filename.clone().unwrap_or_default(),
                op.volume.unwrap_or(record.volume),
                op.looping.unwrap_or(record.looping),
            );
        }
        "stop" => record.stop(),
        "pause" => record.pause(now),
        "resume" => record.resume(now),
        "volume" => {
            if let Some(volume) = op.volume {
                record.volume = volume;
            }
        }
        "loop" => {
            if let Some(looping) = op.looping {
                record.looping = looping;
            }
        }
        _ => {}
    }
}
