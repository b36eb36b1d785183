//! Sanity checks applied to a loaded [`Config`] before the server starts.

use super::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("mongo.uri must not be empty")]
    EmptyMongoUri,
    #[error("server.max_logs must be greater than zero")]
    ZeroMaxLogs,
    #[error("server.reconnect_grace_secs must be greater than zero")]
    ZeroReconnectGrace,
}

/// Validates invariants the loader's `serde(default = ...)` machinery
/// cannot express, e.g. a value that deserializes fine as `0` but is
/// nonsensical for this field. Called once at startup; `main` exits with a
/// diagnostic on failure rather than silently falling back to defaults.
pub fn validate_config(config: &Config) -> Result<(), ConfigValidationError> {
    if config.mongo.uri.trim().is_empty() {
        return Err(ConfigValidationError::EmptyMongoUri);
    }
    if config.server.max_logs == 0 {
        return Err(ConfigValidationError::ZeroMaxLogs);
    }
    if config.server.reconnect_grace_secs == 0 {
        return Err(ConfigValidationError::ZeroReconnectGrace);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn rejects_empty_mongo_uri() {
        let mut config = Config::default();
        config.mongo.uri = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigValidationError::EmptyMongoUri)
        ));
    }

    #[test]
    fn rejects_zero_max_logs() {
        let mut config = Config::default();
        config.server.max_logs = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigValidationError::ZeroMaxLogs)
        ));
    }
}
