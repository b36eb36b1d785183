//! Default value functions for configuration fields, used by serde's
//! `#[serde(default = ...)]` attributes throughout the configuration tree.

use super::logging::LogFormat;

// =============================================================================
// Root
// =============================================================================

pub const fn default_port() -> u16 {
    8000
}

// =============================================================================
// Mongo
// =============================================================================

pub fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

pub fn default_mongo_database() -> String {
    "rollplay".to_string()
}

pub const fn default_mongo_selection_timeout_secs() -> u64 {
    5
}

pub const fn default_mongo_operation_timeout_secs() -> u64 {
    10
}

// =============================================================================
// Server
// =============================================================================

pub const fn default_reconnect_grace_secs() -> u64 {
    30
}

pub const fn default_max_logs() -> usize {
    200
}

pub const fn default_dispatch_follow_up_delay_ms() -> u64 {
    500
}

// =============================================================================
// HTTP client (outbound calls to the asset/catalog services)
// =============================================================================

pub fn default_api_site_base_url() -> String {
    "http://api-site:8000".to_string()
}

pub const fn default_presign_refresh_secs() -> u64 {
    3600
}

// =============================================================================
// Logging
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    true
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

// =============================================================================
// CORS
// =============================================================================

pub fn default_cors_origins() -> String {
    "*".to_string()
}
