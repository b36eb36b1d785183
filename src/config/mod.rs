//! Configuration module for the Tabletop Tavern core.
//!
//! Supports layered loading (inline JSON env var, stdin, explicit path,
//! `config.json` in the working directory or next to the executable,
//! compiled defaults) plus `TAVERN__`-prefixed, `__`-nested environment
//! variable overrides on top of any of those sources.
//!
//! # Module Structure
//!
//! - [`types`]: Root `Config` struct
//! - [`mongo`]: Document store connection settings
//! - [`server`]: Room-coordination behavior (reconnect grace, log retention)
//! - [`http_client`]: Outbound calls to the catalog/asset services
//! - [`cors`]: Allowed origins for the HTTP control plane
//! - [`logging`]: Logging configuration
//! - [`loader`]: Configuration loading functions
//! - [`validation`]: Configuration validation functions
//! - [`defaults`]: Default value functions

pub mod cors;
pub mod defaults;
pub mod http_client;
pub mod loader;
pub mod logging;
pub mod mongo;
pub mod server;
pub mod types;
pub mod validation;

pub use cors::CorsConfig;
pub use http_client::HttpClientConfig;
pub use loader::load;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use mongo::MongoConfig;
pub use server::ServerConfig;
pub use types::Config;
pub use validation::{validate_config, ConfigValidationError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 8000);
        assert_eq!(config.server.reconnect_grace_secs, 30);
        assert_eq!(config.server.max_logs, 200);
        assert_eq!(config.server.dispatch_follow_up_delay_ms, 500);
        assert_eq!(config.mongo.database, "rollplay");
        assert_eq!(config.logging.dir, "logs");
        assert_eq!(config.logging.filename, "server.log");
        assert_eq!(config.logging.rotation, "daily");
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.port, deserialized.port);
        assert_eq!(
            config.server.reconnect_grace_secs,
            deserialized.server.reconnect_grace_secs
        );
        assert_eq!(config.mongo.uri, deserialized.mongo.uri);
    }

    #[test]
    fn test_log_level_display_and_as_str() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }
}
