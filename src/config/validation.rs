use super::{ClientConfig, ConfigError};

/// Validate the client config, returning an error if any rule is violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is violated.
pub fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    validate_base_url(config)?;
    validate_timeouts(config)?;
    validate_pool(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn validate_base_url(config: &ClientConfig) -> Result<(), ConfigError> {
    let base_url = config.base_url.trim();
    if base_url.is_empty() {
        return Err(validation_err("base_url cannot be empty"));
    }
    let parsed = url::Url::parse(base_url)
        .map_err(|err| validation_err(format!("base_url is not a valid URL: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(validation_err("base_url must use http:// or https://"));
    }
    if parsed.host_str().is_none() {
        return Err(validation_err("base_url must include a host"));
    }
    Ok(())
}

fn validate_timeouts(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.timeout == 0 {
        return Err(validation_err("timeout must be greater than 0"));
    }
    if config.connect_timeout == 0 {
        return Err(validation_err("connect_timeout must be greater than 0"));
    }
    if config.connect_timeout > config.timeout {
        return Err(validation_err(
            "connect_timeout cannot exceed the overall timeout",
        ));
    }
    Ok(())
}

fn validate_pool(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.http_pool_max_idle_per_host == 0 {
        return Err(validation_err(
            "http_pool_max_idle_per_host must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_log_level(config: &ClientConfig) -> Result<(), ConfigError> {
    let valid_levels = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL", "DISABLED"];
    if !valid_levels.contains(&config.log_level.to_uppercase().as_str()) {
        return Err(validation_err(format!(
            "log_level must be one of {valid_levels:?}"
        )));
    }
    Ok(())
}
