//! WebSocket connection handling, organized into focused submodules:
//!
//! - `handler`: upgrade entry point, pulls `room_id`/`player_name` off the
//!   URL per the external interface's `/ws/{room_id}?player_name={name}`.
//! - `connection`: the per-socket read loop and event dispatch.
//! - `routes`: the Axum router mounting the WebSocket route alongside the
//!   HTTP control plane.

mod connection;
mod handler;
pub mod routes;

pub use handler::websocket_handler;
