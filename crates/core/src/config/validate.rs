use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Source remote URL is non-empty
/// - Install/build commands are non-empty argv lists
/// - Command timeout is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.source.remote_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "source.remote_url cannot be empty".to_string(),
        ));
    }

    if config.build.install.is_empty() {
        return Err(ConfigError::ValidationError(
            "build.install cannot be empty".to_string(),
        ));
    }
    if config.build.build.is_empty() {
        return Err(ConfigError::ValidationError(
            "build.build cannot be empty".to_string(),
        ));
    }

    if config.build.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "build.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
