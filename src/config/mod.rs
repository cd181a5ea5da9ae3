//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! Site definitions change on disk:
//!     watcher.rs detects change
//!     → collection cache re-checked
//!     → collection rebuilt or reloaded
//!     → atomic swap of the resolver used by requests
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, CustomUrlConfig, ListenerConfig, ObservabilityConfig, SitesConfig};
pub use validation::ValidationError;
pub use watcher::{SitesChanged, SiteWatcher};
