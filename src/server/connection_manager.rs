//! Presence and socket fan-out, keyed by `(room, player)`.
//!
//! Built on a `DashMap` with a TOCTOU-safe `dashmap::Entry` pattern for
//! accept/reconnect. This domain has no client-chosen connection id — the
//! lowercased player name *is* the identity within a room — so the table
//! is keyed by `(RoomId, PlayerName)` directly, and the same entry-API
//! discipline is reused for the reconnect-grace path: a socket accepted
//! for a pair with a pending removal task must atomically cancel that task
//! and install the new sender, with no window in which both the old
//! removal and the new accept could race.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::domain::{PlayerName, RoomId};
use crate::metrics::Metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Connected,
    Disconnecting,
}

struct PresenceEntry {
    sender: Option<mpsc::Sender<Arc<Value>>>,
    in_party: bool,
    status: PresenceStatus,
    cancel_removal: Option<oneshot::Sender<()>>,
}

/// Owns every live socket sender and the ephemeral presence table described
/// in the data model: `player-name -> {socket, is_in_party, status}` plus
/// the per-`(room, player)` pending removal task used for reconnect grace.
pub struct ConnectionManager {
    presence: DashMap<(RoomId, PlayerName), PresenceEntry>,
    metrics: Arc<Metrics>,
    reconnect_grace: Duration,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(reconnect_grace: Duration, metrics: Arc<Metrics>) -> Self {
        Self {
            presence: DashMap::new(),
            metrics,
            reconnect_grace,
        }
    }

    /// Accepts a socket for `(room, player)`. Cancels any pending removal
    /// task for the same pair so a reconnect within the grace window keeps
    /// the presence entry alive. Returns `true` if this was a reconnect
    /// (a removal task was cancelled), `false` for a fresh join.
    pub fn accept(
        &self,
        room: RoomId,
        player: PlayerName,
        sender: mpsc::Sender<Arc<Value>>,
    ) -> bool {
        let key = (room, player);
        let reconnected = match self.presence.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                let pending_removal = existing.cancel_removal.take();
                let was_pending_removal = pending_removal.is_some();
                if let Some(cancel) = pending_removal {
                    let _ = cancel.send(());
                }
                existing.sender = Some(sender);
                existing.status = PresenceStatus::Connected;
                was_pending_removal
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(PresenceEntry {
                    sender: Some(sender),
                    in_party: false,
                    status: PresenceStatus::Connected,
                    cancel_removal: None,
                });
                false
            }
        };
        self.metrics.increment_connections();
        if reconnected {
            self.metrics.increment_reconnect_grace_cancelled();
        }
        reconnected
    }

    /// Marks `(room, player)` disconnecting and schedules removal after the
    /// reconnect grace. A subsequent [`Self::accept`] for the same pair
    /// cancels the scheduled task. `self_arc` is used so the spawned task
    /// can call back into the manager without a circular `Arc` field.
    pub fn remove(self_arc: &Arc<Self>, room: RoomId, player: PlayerName) {
        let key = (room.clone(), player.clone());
        let Some(mut entry) = self_arc.presence.get_mut(&key) else {
            return;
        };
        entry.sender = None;
        entry.status = PresenceStatus::Disconnecting;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        if let Some(previous) = entry.cancel_removal.replace(cancel_tx) {
            let _ = previous.send(());
        }
        drop(entry);

        self_arc.metrics.increment_reconnect_grace_started();
        let manager = Arc::clone(self_arc);
        let grace = self_arc.reconnect_grace;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_rx => {
                    debug!(room = %room, player = %player, "reconnect grace cancelled");
                }
                _ = tokio::time::sleep(grace) => {
                    manager.finish_removal(&room, &player).await;
                }
            }
        });
    }

    async fn finish_removal(&self, room: &RoomId, player: &PlayerName) {
        let key = (room.clone(), player.clone());
        if self.presence.remove(&key).is_some() {
            self.metrics.increment_reconnect_grace_expired();
            self.broadcast_lobby_update(room).await;
        }
    }

    pub fn update_party_status(&self, room: &RoomId, player: &PlayerName, in_party: bool) {
        if let Some(mut entry) = self.presence.get_mut(&(room.clone(), player.clone())) {
            entry.in_party = in_party;
        }
    }

    #[must_use]
    pub fn is_in_party(&self, room: &RoomId, player: &PlayerName) -> bool {
        self.presence
            .get(&(room.clone(), player.clone()))
            .is_some_and(|e| e.in_party)
    }

    /// Serializes `msg` and writes it to a single player's socket. Returns
    /// `false` (and drops the dead socket) if the write fails or the
    /// player has no live sender.
    pub async fn send_to_player(&self, room: &RoomId, player: &PlayerName, msg: Value) -> bool {
        let sender = self
            .presence
            .get(&(room.clone(), player.clone()))
            .and_then(|e| e.sender.clone());
        let Some(sender) = sender else {
            return false;
        };
        if sender.send(Arc::new(msg)).await.is_err() {
            warn!(room = %room, player = %player, "send to player failed, dropping socket");
            if let Some(mut entry) = self.presence.get_mut(&(room.clone(), player.clone())) {
                entry.sender = None;
            }
            false
        } else {
            true
        }
    }

    /// Broadcasts `msg` to every live socket in `room`, optionally
    /// excluding one player. A write failure on a single socket removes
    /// only that socket; the broadcast to the rest of the room continues.
    pub async fn broadcast_to_room(&self, room: &RoomId, msg: Value, except: Option<&PlayerName>) {
        let frame = Arc::new(msg);
        let targets: Vec<(PlayerName, mpsc::Sender<Arc<Value>>)> = self
            .presence
            .iter()
            .filter(|e| &e.key().0 == room && Some(&e.key().1) != except)
            .filter_map(|e| e.sender.clone().map(|s| (e.key().1.clone(), s)))
            .collect();

        for (player, sender) in targets {
            if sender.send(frame.clone()).await.is_err() {
                warn!(room = %room, player = %player, "broadcast write failed, dropping socket");
                if let Some(mut entry) = self.presence.get_mut(&(room.clone(), player)) {
                    entry.sender = None;
                }
            }
        }
    }

    /// Players currently in the lobby: connected, with `in_party == false`.
    #[must_use]
    pub fn lobby_players(&self, room: &RoomId) -> Vec<PlayerName> {
        self.presence
            .iter()
            .filter(|e| &e.key().0 == room && !e.in_party)
            .map(|e| e.key().1.clone())
            .collect()
    }

    /// Every player with a presence entry in `room`, connected or within
    /// reconnect grace. Used by `seat_change` to resync each tracked
    /// player's party flag against the new seat layout.
    #[must_use]
    pub fn tracked_players(&self, room: &RoomId) -> Vec<PlayerName> {
        self.presence
            .iter()
            .filter(|e| &e.key().0 == room)
            .map(|e| e.key().1.clone())
            .collect()
    }

    pub async fn broadcast_lobby_update(&self, room: &RoomId) {
        let lobby = self.lobby_players(room);
        self.broadcast_to_room(
            room,
            json!({"event_type": "lobby_update", "data": {"lobby": lobby}}),
            None,
        )
        .await;
    }

    /// Closes every socket in `room` by dropping its sender (the owning
    /// WebSocket task observes the closed channel and sends a normal-closure
    /// frame), then forgets the room's presence entries entirely.
    pub fn close_room_connections(&self, room: &RoomId) {
        self.presence.retain(|key, _| &key.0 != room);
    }

    /// Every distinct room with at least one presence entry. Used by
    /// graceful shutdown to close out every still-tracked room.
    #[must_use]
    pub fn all_rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self
            .presence
            .iter()
            .map(|e| e.key().0.clone())
            .collect();
        rooms.sort();
        rooms.dedup();
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Arc<Metrics> {
        Arc::new(Metrics::new())
    }

    #[tokio::test]
    async fn accept_then_remove_then_reconnect_cancels_grace() {
        let manager = Arc::new(ConnectionManager::new(
            Duration::from_millis(50),
            metrics(),
        ));
        let (tx, _rx) = mpsc::channel(4);
        let room = "room-1".to_string();
        let player = PlayerName::new("alice");

        let reconnected = manager.accept(room.clone(), player.clone(), tx.clone());
        assert!(!reconnected);

        ConnectionManager::remove(&manager, room.clone(), player.clone());
        let (tx2, _rx2) = mpsc::channel(4);
        let reconnected = manager.accept(room.clone(), player.clone(), tx2);
        assert!(reconnected, "accept within grace should report a reconnect");

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(
            manager.presence.contains_key(&(room, player)),
            "presence should survive past the original grace window"
        );
    }

    #[tokio::test]
    async fn remove_without_reconnect_expires_after_grace() {
        let manager = Arc::new(ConnectionManager::new(
            Duration::from_millis(20),
            metrics(),
        ));
        let (tx, _rx) = mpsc::channel(4);
        let room = "room-1".to_string();
        let player = PlayerName::new("bob");
        manager.accept(room.clone(), player.clone(), tx);

        ConnectionManager::remove(&manager, room.clone(), player.clone());
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(!manager.presence.contains_key(&(room, player)));
    }

    #[tokio::test]
    async fn broadcast_to_room_skips_excluded_player() {
        let manager = ConnectionManager::new(Duration::from_secs(30), metrics());
        let room = "room-1".to_string();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        manager.accept(room.clone(), PlayerName::new("alice"), tx_a);
        manager.accept(room.clone(), PlayerName::new("bob"), tx_b);

        manager
            .broadcast_to_room(
                &room,
                json!({"event_type": "seat_change"}),
                Some(&PlayerName::new("bob")),
            )
            .await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }
}
