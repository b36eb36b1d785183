//! Metrics collection for the room-coordination core.
//!
//! Counters are plain atomics, exposed as Prometheus text format at
//! `/metrics` and as JSON at `/metrics/json` — grounded on the structure
//! of a comprehensive `ServerMetrics` struct with `increment_*`/`add_*`
//! accessor methods, re-themed from connection/room-signaling counters to
//! this domain's rooms/events/document-store/reconnect-grace counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct Metrics {
    pub rooms_created: AtomicU64,
    pub rooms_deleted: AtomicU64,
    pub rooms_active: AtomicU64,
    pub connections_active: AtomicU64,
    pub connections_total: AtomicU64,
    pub events_dispatched_total: AtomicU64,
    pub events_unknown_total: AtomicU64,
    pub events_malformed_total: AtomicU64,
    pub document_store_errors_total: AtomicU64,
    pub reconnect_grace_started_total: AtomicU64,
    pub reconnect_grace_cancelled_total: AtomicU64,
    pub reconnect_grace_expired_total: AtomicU64,
    pub adventure_log_entries_total: AtomicU64,
    pub adventure_log_pruned_total: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_rooms_created(&self) {
        self.rooms_created.fetch_add(1, Ordering::Relaxed);
        self.rooms_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rooms_deleted(&self) {
        self.rooms_deleted.fetch_add(1, Ordering::Relaxed);
        self.rooms_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn increment_connections(&self) {
        self.connections_active.fetch_add(1, Ordering::Relaxed);
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_connections(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn increment_events_dispatched(&self) {
        self.events_dispatched_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_events_unknown(&self) {
        self.events_unknown_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_events_malformed(&self) {
        self.events_malformed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_document_store_errors(&self) {
        self.document_store_errors_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reconnect_grace_started(&self) {
        self.reconnect_grace_started_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reconnect_grace_cancelled(&self) {
        self.reconnect_grace_cancelled_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reconnect_grace_expired(&self) {
        self.reconnect_grace_expired_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_adventure_log_entries(&self, count: u64) {
        self.adventure_log_entries_total
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_adventure_log_pruned(&self, count: u64) {
        self.adventure_log_pruned_total
            .fetch_add(count, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rooms_created: self.rooms_created.load(Ordering::Relaxed),
            rooms_deleted: self.rooms_deleted.load(Ordering::Relaxed),
            rooms_active: self.rooms_active.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_total: self.connections_total.load(Ordering::Relaxed),
            events_dispatched_total: self.events_dispatched_total.load(Ordering::Relaxed),
            events_unknown_total: self.events_unknown_total.load(Ordering::Relaxed),
            events_malformed_total: self.events_malformed_total.load(Ordering::Relaxed),
            document_store_errors_total: self.document_store_errors_total.load(Ordering::Relaxed),
            reconnect_grace_started_total: self
                .reconnect_grace_started_total
                .load(Ordering::Relaxed),
            reconnect_grace_cancelled_total: self
                .reconnect_grace_cancelled_total
                .load(Ordering::Relaxed),
            reconnect_grace_expired_total: self
                .reconnect_grace_expired_total
                .load(Ordering::Relaxed),
            adventure_log_entries_total: self.adventure_log_entries_total.load(Ordering::Relaxed),
            adventure_log_pruned_total: self.adventure_log_pruned_total.load(Ordering::Relaxed),
        }
    }

    /// Renders counters in Prometheus text exposition format.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();
        macro_rules! gauge {
            ($name:literal, $value:expr) => {
                out.push_str(&format!("# TYPE {} gauge\n{} {}\n", $name, $name, $value));
            };
        }
        macro_rules! counter {
            ($name:literal, $value:expr) => {
                out.push_str(&format!("# TYPE {} counter\n{} {}\n", $name, $name, $value));
            };
        }
        gauge!("tavern_rooms_active", snapshot.rooms_active);
        counter!("tavern_rooms_created_total", snapshot.rooms_created);
        counter!("tavern_rooms_deleted_total", snapshot.rooms_deleted);
        gauge!("tavern_connections_active", snapshot.connections_active);
        counter!("tavern_connections_total", snapshot.connections_total);
        counter!(
            "tavern_events_dispatched_total",
            snapshot.events_dispatched_total
        );
        counter!("tavern_events_unknown_total", snapshot.events_unknown_total);
        counter!(
            "tavern_events_malformed_total",
            snapshot.events_malformed_total
        );
        counter!(
            "tavern_document_store_errors_total",
            snapshot.document_store_errors_total
        );
        counter!(
            "tavern_reconnect_grace_started_total",
            snapshot.reconnect_grace_started_total
        );
        counter!(
            "tavern_reconnect_grace_cancelled_total",
            snapshot.reconnect_grace_cancelled_total
        );
        counter!(
            "tavern_reconnect_grace_expired_total",
            snapshot.reconnect_grace_expired_total
        );
        counter!(
            "tavern_adventure_log_entries_total",
            snapshot.adventure_log_entries_total
        );
        counter!(
            "tavern_adventure_log_pruned_total",
            snapshot.adventure_log_pruned_total
        );
        out
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub rooms_created: u64,
    pub rooms_deleted: u64,
    pub rooms_active: u64,
    pub connections_active: u64,
    pub connections_total: u64,
    pub events_dispatched_total: u64,
    pub events_unknown_total: u64,
    pub events_malformed_total: u64,
    pub document_store_errors_total: u64,
    pub reconnect_grace_started_total: u64,
    pub reconnect_grace_cancelled_total: u64,
    pub reconnect_grace_expired_total: u64,
    pub adventure_log_entries_total: u64,
    pub adventure_log_pruned_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_lifecycle_counters_move_together() {
        let metrics = Metrics::new();
        metrics.increment_rooms_created();
        metrics.increment_rooms_created();
        metrics.increment_rooms_deleted();
        let snap = metrics.snapshot();
        assert_eq!(snap.rooms_created, 2);
        assert_eq!(snap.rooms_deleted, 1);
        assert_eq!(snap.rooms_active, 1);
    }

    #[test]
    fn prometheus_rendering_includes_all_counters() {
        let metrics = Metrics::new();
        metrics.increment_events_dispatched();
        let rendered = metrics.render_prometheus();
        assert!(rendered.contains("tavern_events_dispatched_total 1"));
    }
}
