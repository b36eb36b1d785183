use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::player::PlayerName;
use super::SEAT_EMPTY;

/// Opaque room identifier minted by the external catalog service and
/// handed to this core on room creation. Never generated internally
/// except as a fallback when a caller omits it.
pub type RoomId = String;

/// Playback state of an audio channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

/// A single named audio slot (`bgm`, `sfx`, or a synchronized sub-channel).
///
/// Invariant: exactly one of `started_at`/`paused_elapsed` is set whenever
/// `playback_state != Stopped`. Resuming recomputes
/// `started_at := now - paused_elapsed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioChannelRecord {
    pub filename: Option<String>,
    pub asset_id: Option<String>,
    pub s3_url: Option<String>,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub looping: bool,
    #[serde(default)]
    pub playback_state: PlaybackState,
    /// Wall-clock seconds at which current playback began. Present iff
    /// `playback_state == Playing`.
    pub started_at: Option<f64>,
    /// Seconds into the track at which it was paused. Present iff
    /// `playback_state == Paused`.
    pub paused_elapsed: Option<f64>,
}

impl AudioChannelRecord {
    /// Transitions this channel to `Playing` starting now, clearing any
    /// paused offset (`remote_audio_play` semantics).
    pub fn play_now(&mut self, now_secs: f64) {
        self.playback_state = PlaybackState::Playing;
        self.started_at = Some(now_secs);
        self.paused_elapsed = None;
    }

    /// Resumes from the current `paused_elapsed`, recomputing `started_at`
    /// so that elapsed-time math stays continuous (`remote_audio_resume`).
    pub fn resume(&mut self, now_secs: f64) {
        let elapsed = self.paused_elapsed.unwrap_or(0.0);
        self.started_at = Some(now_secs - elapsed);
        self.paused_elapsed = None;
        self.playback_state = PlaybackState::Playing;
    }

    /// Freezes the channel at its current position.
    pub fn pause(&mut self, now_secs: f64) {
        if let Some(started_at) = self.started_at {
            self.paused_elapsed = Some(now_secs - started_at);
        }
        self.started_at = None;
        self.playback_state = PlaybackState::Paused;
    }

    /// Stops the channel and zeros both timers.
    pub fn stop(&mut self) {
        self.started_at = None;
        self.paused_elapsed = None;
        self.playback_state = PlaybackState::Stopped;
    }

    /// Loads a new track into the channel without starting playback.
    pub fn load(&mut self, filename: String, volume: f64, looping: bool) {
        self.filename = Some(filename);
        self.volume = volume;
        self.looping = looping;
        self.stop();
    }
}

/// What clients should render as the room's primary display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveDisplay {
    Map,
    None,
}

impl Default for ActiveDisplay {
    fn default() -> Self {
        Self::None
    }
}

/// A single game room: seats, roles, audio state and the currently active
/// display. Keyed externally by `RoomId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: RoomId,
    pub max_players: u8,
    /// Length `max_players`; each entry is either `SEAT_EMPTY` or a
    /// lowercased player name.
    pub seat_layout: Vec<String>,
    /// Seat index (as a string key) -> 7-char hex color.
    pub seat_colors: BTreeMap<String, String>,
    pub room_host: Option<PlayerName>,
    pub dungeon_master: Option<PlayerName>,
    pub moderators: BTreeSet<PlayerName>,
    pub audio_state: BTreeMap<String, AudioChannelRecord>,
    pub active_display: ActiveDisplay,
    pub created_at: DateTime<Utc>,
}

impl Room {
    #[must_use]
    pub fn new(room_id: RoomId, max_players: u8) -> Self {
        Self {
            room_id,
            max_players,
            seat_layout: vec![SEAT_EMPTY.to_string(); max_players as usize],
            seat_colors: BTreeMap::new(),
            room_host: None,
            dungeon_master: None,
            moderators: BTreeSet::new(),
            audio_state: BTreeMap::new(),
            active_display: ActiveDisplay::default(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_host(&self, player: &PlayerName) -> bool {
        self.room_host.as_ref() == Some(player)
    }

    #[must_use]
    pub fn is_moderator(&self, player: &PlayerName) -> bool {
        self.is_host(player) || self.moderators.contains(player)
    }

    #[must_use]
    pub fn is_dm(&self, player: &PlayerName) -> bool {
        self.dungeon_master.as_ref() == Some(player)
    }
}
