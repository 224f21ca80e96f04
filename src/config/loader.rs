//! Configuration loading from disk and the environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::{AppConfig, RetryConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse the TOML file, or return defaults when there is none. No
/// overrides or validation are applied.
pub fn read(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)
        }
        None => Ok(AppConfig::default()),
    }
}

/// Overrides given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
}

/// Apply overrides from `lookup`, then from the command line, and validate
/// the result.
pub fn finalize<F>(
    mut config: AppConfig,
    lookup: F,
    cli: &CliOverrides,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup);
    if let Some(bind) = &cli.bind_address {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto a parsed configuration.
///
/// `lookup` is usually `std::env::var`; tests pass a map.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.listener.bind_address = with_port(&config.listener.bind_address, port),
            Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT"),
        }
    }

    if let Some(key) = lookup("GROQ_API_KEY") {
        config.upstream.api_key = key;
    }
    if let Some(url) = lookup("GROQ_BASE_URL") {
        config.upstream.base_url = url;
    }
    if let Some(model) = non_empty(lookup("GROQ_MODEL")) {
        config.upstream.vision_model = model;
    }
    if let Some(model) = non_empty(lookup("GROQ_CHAT_MODEL")) {
        config.upstream.chat_model = model;
    }

    // Unparseable or zero falls back to the default budget rather than failing.
    if let Some(raw) = lookup("GROQ_MAX_RETRIES") {
        config.retries.max_attempts = match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                tracing::warn!(value = %raw, "Invalid GROQ_MAX_RETRIES, using default");
                RetryConfig::default().max_attempts
            }
        };
    }

    if let Some(raw) = lookup("AI_FEATURES_ENABLED") {
        match parse_flag(&raw) {
            Some(enabled) => config.features.ai_enabled = enabled,
            None => tracing::warn!(value = %raw, "Ignoring invalid AI_FEATURES_ENABLED"),
        }
    }
}

fn with_port(bind_address: &str, port: u16) -> String {
    match bind_address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{}", port),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
