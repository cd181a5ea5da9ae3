//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the served environment is one that gets indexed
//! - Validate value ranges and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Site definitions are validated by the collection builder, not here

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("sites.environments must not be empty")]
    NoEnvironments,
    #[error("environment `{0}` is listed twice")]
    DuplicateEnvironment(String),
    #[error("served environment `{0}` is not in sites.environments")]
    UnknownEnvironment(String),
    #[error("cache_id `{0}` must be non-empty and use only letters, digits, `_` or `-`")]
    InvalidCacheId(String),
    #[error("url_scheme must be `http` or `https`, got `{0}`")]
    InvalidScheme(String),
    #[error("{field} `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
    #[error("unknown log level `{0}`")]
    InvalidLogLevel(String),
    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let sites = &config.sites;

    if sites.environments.is_empty() {
        errors.push(ValidationError::NoEnvironments);
    }
    let mut seen = HashSet::new();
    for env in &sites.environments {
        if !seen.insert(env.as_str()) {
            errors.push(ValidationError::DuplicateEnvironment(env.clone()));
        }
    }
    if !sites.environments.contains(&sites.environment) {
        errors.push(ValidationError::UnknownEnvironment(sites.environment.clone()));
    }

    let valid_id = !sites.cache_id.is_empty()
        && sites
            .cache_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid_id {
        errors.push(ValidationError::InvalidCacheId(sites.cache_id.clone()));
    }

    if !matches!(sites.url_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::InvalidScheme(sites.url_scheme.clone()));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
