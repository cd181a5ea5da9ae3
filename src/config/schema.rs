//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::collection::CacheOptions;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Site definitions and collection cache.
    pub sites: SitesConfig,

    /// Custom url store.
    pub custom_urls: CustomUrlConfig,

    /// Listener configuration for `serve`.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Where site definitions live and how the compiled collection is cached.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SitesConfig {
    /// Directory holding one `*.toml` file per site.
    pub config_dir: PathBuf,

    /// Directory for the compiled collection artifact.
    pub cache_dir: PathBuf,

    /// File stem of the compiled artifact.
    pub cache_id: String,

    /// Environments indexed by the collection.
    pub environments: Vec<String>,

    /// Environment this process serves.
    pub environment: String,

    /// Scheme of absolute urls generated for resource paths.
    pub url_scheme: String,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("config/sites"),
            cache_dir: PathBuf::from("var/cache"),
            cache_id: "site_collection".to_string(),
            environments: vec!["dev".to_string(), "stage".to_string(), "prod".to_string()],
            environment: "prod".to_string(),
            url_scheme: "http".to_string(),
        }
    }
}

impl SitesConfig {
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            cache_dir: self.cache_dir.clone(),
            cache_id: self.cache_id.clone(),
            environments: self.environments.clone(),
        }
    }
}

/// Custom url store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CustomUrlConfig {
    /// JSON snapshot seeding the in-memory store. No custom urls when unset.
    pub store_path: Option<PathBuf>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("[sites]\nenvironment = \"dev\"\n").unwrap();
        assert_eq!(config.sites.environment, "dev");
        assert_eq!(config.sites.cache_id, "site_collection");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.custom_urls.store_path.is_none());
    }

    #[test]
    fn test_cache_options() {
        let options = SitesConfig::default().cache_options();
        assert_eq!(options.cache_id, "site_collection");
        assert_eq!(options.environments.len(), 3);
    }
}
