//! Compiled site collection.
//!
//! # Data Flow
//! ```text
//! SiteDefinition[] + environments
//!     → builder.rs (validate, expand patterns, classify, order)
//!     → Collection (immutable, shared via Arc)
//!
//! On first access per process:
//!     cache.rs computes freshness marker (freshness.rs)
//!     → fresh: load compiled artifact
//!     → stale: build, persist artifact + marker, return
//! ```
//!
//! # Design Decisions
//! - Entry order per environment is the only precedence mechanism
//! - Concrete entries always precede wildcard entries
//! - A failed build never touches the compiled artifact

pub mod builder;
pub mod cache;
pub mod entry;
pub mod freshness;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::site::{Portal, Site};

pub use builder::{BuildError, CollectionBuilder};
pub use cache::{CacheError, CacheOptions, CollectionCache};
pub use entry::{MatchType, UrlEntry};

/// All sites and portals plus the ordered url index of every environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    sites: BTreeMap<String, Site>,
    portals: BTreeMap<String, Portal>,
    entries: BTreeMap<String, Vec<UrlEntry>>,
    #[serde(default)]
    resources: Vec<PathBuf>,
}

impl Collection {
    pub(crate) fn new(
        sites: BTreeMap<String, Site>,
        portals: BTreeMap<String, Portal>,
        entries: BTreeMap<String, Vec<UrlEntry>>,
    ) -> Self {
        Self {
            sites,
            portals,
            entries,
            resources: Vec::new(),
        }
    }

    /// Attach the source resources the collection was built from.
    pub fn with_resources(mut self, resources: Vec<PathBuf>) -> Self {
        self.resources = resources;
        self
    }

    pub fn site(&self, key: &str) -> Option<&Site> {
        self.sites.get(key)
    }

    pub fn portal(&self, key: &str) -> Option<&Portal> {
        self.portals.get(key)
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn portals(&self) -> impl Iterator<Item = &Portal> {
        self.portals.values()
    }

    /// Ordered url entries of an environment. Empty for unknown environments.
    pub fn entries(&self, environment: &str) -> &[UrlEntry] {
        self.entries.get(environment).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn resources(&self) -> &[PathBuf] {
        &self.resources
    }
}
