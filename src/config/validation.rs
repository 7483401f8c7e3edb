use crate::config::types::{
    BrowserConfig, Config, CrawlerConfig, SearchConfig, ServerConfig, MAX_POOL_WIDTH,
};
use crate::types::{MAX_CONTENT_RANGE, MAX_RESULTS_RANGE};
use crate::{ConfigError, ConfigResult};
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_browser_config(&config.browser)?;
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-zero, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if let Some(executable) = &config.executable {
        if executable.trim().is_empty() {
            return Err(ConfigError::Validation(
                "executable cannot be an empty path".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates mirror discovery and query defaults
fn validate_search_config(config: &SearchConfig) -> ConfigResult<()> {
    validate_http_url("registry_url", &config.registry_url)?;

    for mirror in &config.mirrors {
        validate_http_url("mirror", mirror)?;
    }

    if !MAX_RESULTS_RANGE.contains(&config.default_max_results) {
        return Err(ConfigError::Validation(format!(
            "default_max_results must be between {} and {}, got {}",
            MAX_RESULTS_RANGE.start(),
            MAX_RESULTS_RANGE.end(),
            config.default_max_results
        )));
    }

    if !MAX_CONTENT_RANGE.contains(&config.default_max_content) {
        return Err(ConfigError::Validation(format!(
            "default_max_content must be between {} and {}, got {}",
            MAX_CONTENT_RANGE.start(),
            MAX_CONTENT_RANGE.end(),
            config.default_max_content
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates content extraction configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_workers < 1 || config.max_workers > MAX_POOL_WIDTH {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and {}, got {}",
            MAX_POOL_WIDTH, config.max_workers
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.retry_jitter_min_ms > config.retry_jitter_max_ms {
        return Err(ConfigError::Validation(format!(
            "retry_jitter_min_ms ({}) must be <= retry_jitter_max_ms ({})",
            config.retry_jitter_min_ms, config.retry_jitter_max_ms
        )));
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> ConfigResult<()> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid bind address '{}': {}", config.bind, e))
    })?;
    Ok(())
}

/// Validates that a URL is absolute and uses HTTP(S)
fn validate_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
