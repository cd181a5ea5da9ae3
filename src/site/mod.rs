//! Site definitions.
//!
//! # Data Flow
//! ```text
//! site files (TOML, one site per file)
//!     → source.rs (read & deserialize)
//!     → SiteDefinition[] (parsed, unvalidated)
//!     → collection builder
//! ```

pub mod model;
pub mod source;

pub use model::{
    EnvironmentDefinition, Localization, Portal, PortalDefinition, Site, SiteDefinition, UrlDefinition,
};
pub use source::{SiteSource, SourceError, TomlDirSource};
