use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GameError;

/// Deserializes a handler's `data` payload into its typed shape, mapping
/// any mismatch to a `Validation` error so it surfaces as an `error` frame
/// rather than closing the connection.
pub fn parse_data<T: DeserializeOwned>(data: Value) -> Result<T, GameError> {
    serde_json::from_value(data).map_err(|e| GameError::Validation(e.to_string()))
}

/// Wall-clock seconds since the Unix epoch, the time base audio timers are
/// expressed in (`started_at`, `paused_elapsed`).
#[must_use]
pub fn now_secs() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
