//! CORS configuration for the HTTP control plane.

use serde::{Deserialize, Serialize};

use super::defaults::default_cors_origins;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins, or `*` for any origin.
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_cors_origins(),
        }
    }
}
