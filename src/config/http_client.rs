//! Configuration for outbound calls this core makes to external
//! collaborator services (asset proxying, presigned-URL refresh).

use serde::{Deserialize, Serialize};

use super::defaults::{default_api_site_base_url, default_presign_refresh_secs};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the asset/catalog service used for media proxying.
    #[serde(default = "default_api_site_base_url")]
    pub api_site_base_url: String,
    /// How long a presigned audio/map asset URL stays valid before
    /// callers should request a fresh one.
    #[serde(default = "default_presign_refresh_secs")]
    pub presign_refresh_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            api_site_base_url: default_api_site_base_url(),
            presign_refresh_secs: default_presign_refresh_secs(),
        }
    }
}
