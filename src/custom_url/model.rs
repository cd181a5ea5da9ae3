//! Custom url routes and documents.

use serde::{Deserialize, Serialize};

/// Publish lifecycle state of a content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Draft,
    Test,
    Published,
}

/// The content page a custom url points at. Owned by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDocument {
    pub uuid: String,
    pub workflow_stage: WorkflowStage,
}

/// Values substituted into a custom url's base domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainParts {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: Vec<String>,
}

/// A vanity url definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomUrlDocument {
    pub uuid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published: bool,
    /// Pattern such as `sulu.io/*`, each `*` filled from `domain_parts`.
    pub base_domain: String,
    #[serde(default)]
    pub domain_parts: DomainParts,
    pub target_locale: String,
    /// Missing until content is linked.
    #[serde(default)]
    pub target: Option<TargetDocument>,
}

/// What a route resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RouteTarget {
    /// Live route, uuid of its custom url document.
    Document(String),
    /// Historical route, path of the canonical route that replaced it.
    History(String),
}

/// Maps a normalized url inside a site to its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomUrlRoute {
    /// Storage path of the route, e.g. `/custom-urls/sulu_io/routes/sulu.io/test`.
    pub path: String,
    /// Normalized url (`host/path[?query]`).
    pub url: String,
    pub site_key: String,
    pub target: RouteTarget,
}

impl CustomUrlRoute {
    pub fn is_history(&self) -> bool {
        matches!(self.target, RouteTarget::History(_))
    }

    /// Path of the canonical route a historical route redirects to.
    pub fn canonical_path(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::History(path) => Some(path),
            RouteTarget::Document(_) => None,
        }
    }
}
