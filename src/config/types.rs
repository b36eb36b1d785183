//! Root configuration types.

use serde::{Deserialize, Serialize};

use super::cors::CorsConfig;
use super::defaults::default_port;
use super::http_client::HttpClientConfig;
use super::logging::LoggingConfig;
use super::mongo::MongoConfig;
use super::server::ServerConfig;

/// Root configuration struct for the Tabletop Tavern core.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub mongo: MongoConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http_client: HttpClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            mongo: MongoConfig::default(),
            server: ServerConfig::default(),
            http_client: HttpClientConfig::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}
