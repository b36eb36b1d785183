//! The application's services, assembled once into [`AppContext`].
//!
//! Per the "no hidden globals" design note, every shared resource is a
//! field reachable from a single explicitly-constructed struct, built once
//! in `main()` and threaded through `axum::Router::with_state`, rather than
//! a module-level static.

mod adventure_log_service;
mod connection_manager;
mod map_service;
mod room_service;

pub use adventure_log_service::AdventureLogService;
pub use connection_manager::ConnectionManager;
pub use map_service::MapService;
pub use room_service::{CreateRoomInput, RoleBits, RoomService};

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::events::EventDispatchTable;
use crate::metrics::Metrics;
use crate::store::RoomStore;

/// Every shared service and resource handle the HTTP and WebSocket layers
/// need. Constructed once at startup (or once per test) and cloned cheaply
/// via `Arc` fields — there is no interior mutability at this level beyond
/// what each service already owns.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn RoomStore>,
    pub connections: Arc<ConnectionManager>,
    pub room_service: Arc<RoomService>,
    pub map_service: Arc<MapService>,
    pub adventure_log: Arc<AdventureLogService>,
    pub dispatch_table: Arc<EventDispatchTable>,
    pub config: Arc<Config>,
    pub metrics: Arc<Metrics>,
}

impl AppContext {
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>, config: Arc<Config>) -> Self {
        let metrics = Arc::new(Metrics::new());
        let connections = Arc::new(ConnectionManager::new(
            Duration::from_secs(config.server.reconnect_grace_secs),
            metrics.clone(),
        ));
        let room_service = Arc::new(RoomService::new(store.clone()));
        let map_service = Arc::new(MapService::new(store.clone()));
        let adventure_log = Arc::new(AdventureLogService::new(
            store.clone(),
            metrics.clone(),
            config.server.max_logs,
        ));
        let dispatch_table = Arc::new(EventDispatchTable::with_default_handlers());

        Self {
            store,
            connections,
            room_service,
            map_service,
            adventure_log,
            dispatch_table,
            config,
            metrics,
        }
    }

    /// Closes every socket tracked for `room` and forgets its presence
    /// table. Used by `DELETE /session/{id}` and graceful shutdown.
    pub fn close_room_connections(&self, room: &crate::domain::RoomId) {
        self.connections.close_room_connections(room);
    }

    /// Closes every room still tracked by the connection manager. Called
    /// once, on `ctrl_c`, so a shutdown doesn't silently strand clients.
    pub fn close_all_connections(&self) {
        for room in self.connections.all_rooms() {
            self.connections.close_room_connections(&room);
        }
    }
}

#[cfg(test)]
pub fn test_context() -> AppContext {
    AppContext::new(
        Arc::new(crate::store::memory::InMemoryRoomStore::new()),
        Arc::new(Config::default()),
    )
}
