//! Custom url request processing.
//!
//! # States
//! ```text
//! START → ROUTE_LOOKUP ─┬─ no route ──────────────→ NOT_FOUND
//!                       ├─ historical route ──────→ HISTORY (attach, stop)
//!                       └─ live route → RESOLVE_TARGET → PORTAL_CHECK ─┬→ ATTACH
//!                                                                      └→ REJECT
//! ```
//!
//! # Design Decisions
//! - Nothing here fails; every negative branch is a plain outcome
//! - Workflow stage is recorded but never gates attachment
//! - A custom url is honored only if a concrete portal serves its host

use serde::Serialize;
use std::sync::Arc;

use crate::collection::UrlEntry;
use crate::custom_url::generator;
use crate::custom_url::model::{CustomUrlDocument, CustomUrlRoute, WorkflowStage};
use crate::custom_url::store::CustomUrlStore;
use crate::http::request::{RequestAttributes, RequestInfo};
use crate::observability::metrics;
use crate::routing::Manager;

/// Terminal state reached for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No route for the candidate url. Nothing attached.
    NotFound,
    /// Historical route attached; the caller redirects to the canonical route.
    History,
    /// A route exists but no concrete portal serves its host. Nothing attached.
    Rejected,
    /// Live route attached.
    Attached,
}

impl ProcessOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessOutcome::NotFound => "not_found",
            ProcessOutcome::History => "history",
            ProcessOutcome::Rejected => "rejected",
            ProcessOutcome::Attached => "attached",
        }
    }
}

/// The routing attribute set on a request for a matched custom url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomUrlAttribute {
    pub route: CustomUrlRoute,
    /// Missing for historical routes.
    pub document: Option<CustomUrlDocument>,
    /// Stage of the linked content, for consumers that gate on it.
    pub workflow_stage: Option<WorkflowStage>,
    /// Url rebuilt from the document's base domain and domain parts.
    pub canonical_url: Option<String>,
    /// Portal entry serving the document's target locale.
    pub portal: Option<UrlEntry>,
}

impl CustomUrlAttribute {
    fn history(route: CustomUrlRoute) -> Self {
        Self {
            route,
            document: None,
            workflow_stage: None,
            canonical_url: None,
            portal: None,
        }
    }

    pub fn is_history(&self) -> bool {
        self.route.is_history()
    }
}

/// Resolves custom urls for incoming requests.
pub struct CustomUrlProcessor {
    store: Arc<dyn CustomUrlStore>,
    manager: Manager,
    environment: String,
}

impl CustomUrlProcessor {
    pub fn new(store: Arc<dyn CustomUrlStore>, manager: Manager, environment: impl Into<String>) -> Self {
        Self {
            store,
            manager,
            environment: environment.into(),
        }
    }

    /// Run the request through the routing decision and attach the result.
    ///
    /// `attributes` must carry the site key resolved upstream; the locale
    /// falls back to the site default.
    pub fn process(&self, request: &RequestInfo, attributes: &mut RequestAttributes) -> ProcessOutcome {
        let url = normalize_url(request);
        let outcome = self.resolve(&url, attributes);

        metrics::record_custom_url_outcome(outcome.as_str());
        tracing::debug!(url = %url, outcome = outcome.as_str(), "Custom url processed");
        outcome
    }

    fn resolve(&self, url: &str, attributes: &mut RequestAttributes) -> ProcessOutcome {
        let Some(site_key) = attributes.site_key.clone() else {
            return ProcessOutcome::NotFound;
        };

        let Some(route) = self.store.find_route_by_url(url, &site_key) else {
            return ProcessOutcome::NotFound;
        };

        if route.is_history() {
            attributes.set_custom_url(CustomUrlAttribute::history(route));
            return ProcessOutcome::History;
        }

        let locale = match &attributes.locale {
            Some(locale) => locale.clone(),
            None => self
                .manager
                .find_site_by_key(&site_key)
                .map(|site| site.default_localization.to_string())
                .unwrap_or_default(),
        };

        let Some(document) = self.store.find_by_url(url, &site_key, &locale) else {
            tracing::warn!(url = %url, route = %route.path, "Custom url route has no document");
            return ProcessOutcome::NotFound;
        };

        // Every stage is accepted, downstream decides about unpublished content
        let workflow_stage = document.target.as_ref().map(|target| target.workflow_stage);

        let concrete = self
            .manager
            .find_url_entries(url, &self.environment)
            .iter()
            .any(|entry| entry.is_concrete());
        if !concrete {
            return ProcessOutcome::Rejected;
        }

        let canonical_url = generator::generate(&document.base_domain, &document.domain_parts);
        let portal = self
            .manager
            .find_url_entries_by_site_and_locale(&site_key, &document.target_locale, &self.environment)
            .into_iter()
            .find(|entry| entry.is_concrete())
            .cloned();

        attributes.set_custom_url(CustomUrlAttribute {
            route,
            document: Some(document),
            workflow_stage,
            canonical_url,
            portal,
        });
        ProcessOutcome::Attached
    }
}

/// Candidate url for a request: `host + path`, view format suffix dropped,
/// `?query` appended verbatim when present.
pub fn normalize_url(request: &RequestInfo) -> String {
    let mut url = format!("{}{}", request.host, strip_format(&request.path));
    if let Some(query) = request.query_string.as_deref().filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Drop a trailing `.html`-style suffix from the last path segment.
fn strip_format(path: &str) -> &str {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let segment = &path[segment_start..];

    match segment.rfind('.') {
        Some(dot)
            if dot > 0
                && dot + 1 < segment.len()
                && segment[dot + 1..].chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            &path[..segment_start + dot]
        }
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(host: &str, path: &str, query: Option<&str>) -> RequestInfo {
        RequestInfo::new(host, path, query)
    }

    #[test]
    fn test_normalize_strips_format() {
        assert_eq!(normalize_url(&info("sulu.io", "/test", None)), "sulu.io/test");
        assert_eq!(normalize_url(&info("sulu.io", "/test.html", None)), "sulu.io/test");
        assert_eq!(normalize_url(&info("sulu.io", "/test.json", None)), "sulu.io/test");
        assert_eq!(normalize_url(&info("sulu.io", "/a.b/test", None)), "sulu.io/a.b/test");
    }

    #[test]
    fn test_normalize_appends_query() {
        assert_eq!(
            normalize_url(&info("sulu.io", "/test.html", Some("search=test"))),
            "sulu.io/test?search=test"
        );
        assert_eq!(normalize_url(&info("sulu.io", "/test", Some(""))), "sulu.io/test");
    }

    #[test]
    fn test_normalize_keeps_non_ascii() {
        assert_eq!(normalize_url(&info("sulu.io", "/täst", None)), "sulu.io/täst");
        assert_eq!(normalize_url(&info("sulu.io", "/täst.html", None)), "sulu.io/täst");
    }

    #[test]
    fn test_strip_format_edge_cases() {
        assert_eq!(strip_format("/"), "/");
        assert_eq!(strip_format(""), "");
        assert_eq!(strip_format("/.hidden"), "/.hidden");
        assert_eq!(strip_format("/trailing."), "/trailing.");
        assert_eq!(strip_format("/v1.2-beta"), "/v1.2-beta");
    }
}
