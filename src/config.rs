//! Configuration management for user_gateway
//!
//! Layers an optional config file and `USER_GATEWAY_*` environment variables over the
//! built-in defaults, then validates the result.

use crate::types::{AppConfig, StartupError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use std::env;

/// Environment variable naming the config file (without extension)
pub const CONFIG_PATH_VAR: &str = "USER_GATEWAY_CONFIG";

const ENV_PREFIX: &str = "USER_GATEWAY";

/// Load complete app configuration
pub fn load_config() -> Result<AppConfig, StartupError> {
    let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config".to_string());
    load_config_with(Config::builder().add_source(File::with_name(&path).required(false)))
}

/// Finish a builder with the environment layer, deserialize and validate
pub fn load_config_with(
    builder: ConfigBuilder<DefaultState>,
) -> Result<AppConfig, StartupError> {
    let config: AppConfig = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<(), StartupError> {
    if config.jwt.signing_key.is_empty() {
        return Err(StartupError::Config("jwt.signing_key is required".to_string()));
    }

    if config.jwt.signing_key.len() < 16 {
        return Err(StartupError::Config(
            "jwt.signing_key must be at least 16 bytes long".to_string(),
        ));
    }

    if config.jwt.issuer.trim().is_empty() {
        return Err(StartupError::Config("jwt.issuer can't be empty".to_string()));
    }

    if config.server.port == 0 || config.user_srv.port == 0 {
        return Err(StartupError::Config("Ports must be between 1 and 65,535".to_string()));
    }

    if config.user_srv.host.trim().is_empty() {
        return Err(StartupError::Config("user_srv.host can't be empty".to_string()));
    }

    // Backend calls must always be bounded
    if config.user_srv.timeout_ms == 0 {
        return Err(StartupError::Config("user_srv.timeout_ms must be positive".to_string()));
    }

    if config.server.workers == 0 {
        return Err(StartupError::Config("server.workers must be positive".to_string()));
    }

    Ok(())
}
