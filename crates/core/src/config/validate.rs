use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Fetcher script path is not empty
/// - API key present when auth method is api_key
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Fetcher validation
    if config.fetcher.script_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "fetcher.script_path cannot be empty".to_string(),
        ));
    }

    // Auth validation
    if matches!(config.auth.method, AuthMethod::ApiKey)
        && config.auth.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is api_key".to_string(),
        ));
    }

    Ok(())
}
