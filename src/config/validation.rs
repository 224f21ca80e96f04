//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! All errors are collected so a bad config file is fixed in one pass.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::schema::AppConfig;
use crate::resilience::RetryPolicy;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let Err(e) = url::Url::parse(&config.upstream.base_url) {
        errors.push(ValidationError::new(
            "upstream.base_url",
            format!("'{}' is not a valid URL: {}", config.upstream.base_url, e),
        ));
    }
    if config.upstream.vision_model.trim().is_empty() {
        errors.push(ValidationError::new("upstream.vision_model", "must not be empty"));
    }
    if config.upstream.chat_model.trim().is_empty() {
        errors.push(ValidationError::new("upstream.chat_model", "must not be empty"));
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if retries.base_delay_ms == 0 {
        errors.push(ValidationError::new("retries.base_delay_ms", "must be greater than 0"));
    }
    if retries.max_delay_ms < retries.base_delay_ms {
        errors.push(ValidationError::new(
            "retries.max_delay_ms",
            format!(
                "{} is below base_delay_ms ({})",
                retries.max_delay_ms, retries.base_delay_ms
            ),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }

    // The request timeout must outlast a full retry sequence, or clients get
    // a bare 408 instead of the mapped upstream failure.
    let policy = RetryPolicy::from(retries);
    let worst_case = Duration::from_secs(config.timeouts.upstream_secs)
        .saturating_mul(policy.max_attempts)
        .saturating_add(policy.total_backoff());
    if config.timeouts.request_secs > 0
        && Duration::from_secs(config.timeouts.request_secs) < worst_case
    {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "{}s is shorter than a full retry sequence ({} attempts of {}s plus {}ms backoff)",
                config.timeouts.request_secs,
                policy.max_attempts,
                config.timeouts.upstream_secs,
                policy.total_backoff().as_millis()
            ),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
