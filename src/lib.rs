#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::similar_names
)]

//! # Tabletop Tavern — `api-game` core
//!
//! The real-time room-coordination service for the Tabletop Tavern virtual
//! tabletop: presence and reconnect grace, seats and party/lobby state,
//! dice-prompt lifecycle, synchronized multi-channel audio, active-map
//! configuration, and a bounded adventure log, all fanned out over
//! WebSocket and mutated through a parallel REST control plane.

/// Server configuration and environment variables
pub mod config;

/// Domain types shared by the document store, event handlers and HTTP layer
pub mod domain;

/// Typed error taxonomy shared by the HTTP and WebSocket surfaces
pub mod error;

/// Event handler registration table and the individual event handlers
pub mod events;

/// HTTP control plane
pub mod http;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// Retry logic for bounded document-store calls
pub mod retry;

/// Application context and core per-room services
pub mod server;

/// Document store abstraction (MongoDB-backed, with an in-memory test double)
pub mod store;

/// WebSocket connection handling
pub mod websocket;
