//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use site_router::collection::{Collection, CollectionBuilder};
use site_router::custom_url::{
    CustomUrlDocument, CustomUrlRoute, CustomUrlStore, DomainParts, InMemoryCustomUrlStore, RouteTarget,
    TargetDocument, WorkflowStage,
};
use site_router::routing::Manager;
use site_router::site::{EnvironmentDefinition, PortalDefinition, SiteDefinition, UrlDefinition};

pub const ENVIRONMENTS: [&str; 3] = ["dev", "stage", "prod"];

/// A site with one portal serving `urls` in every environment.
pub fn site(key: &str, localizations: &[&str], urls: &[&str]) -> SiteDefinition {
    let environments = ENVIRONMENTS
        .iter()
        .map(|env| EnvironmentDefinition {
            name: env.to_string(),
            urls: urls.iter().map(|u| UrlDefinition::new(*u)).collect(),
        })
        .collect();

    SiteDefinition {
        key: key.into(),
        name: key.into(),
        localizations: localizations.iter().map(|l| l.parse().unwrap()).collect(),
        default_localization: None,
        portals: vec![PortalDefinition {
            key: format!("{key}_portal"),
            name: String::new(),
            localizations: Vec::new(),
            environments,
        }],
    }
}

pub fn build(sites: &[SiteDefinition]) -> Arc<Collection> {
    Arc::new(CollectionBuilder::new(ENVIRONMENTS).build(sites).unwrap())
}

pub fn manager(sites: &[SiteDefinition]) -> Manager {
    Manager::new(build(sites))
}

/// Write a single-portal site file the way operators author them.
pub fn write_site_file(dir: &Path, key: &str, urls: &[&str]) {
    let mut content = format!("key = \"{key}\"\nname = \"{key}\"\nlocalizations = [\"en\", \"de\"]\n\n");
    content.push_str(&format!("[[portals]]\nkey = \"{key}_portal\"\n"));
    for env in ENVIRONMENTS {
        content.push_str(&format!("\n[[portals.environments]]\nname = \"{env}\"\n"));
        for url in urls {
            content.push_str(&format!("\n[[portals.environments.urls]]\npattern = \"{url}\"\n"));
        }
    }
    fs::write(dir.join(format!("{key}.toml")), content).unwrap();
}

pub fn live_route(url: &str, site_key: &str, uuid: &str) -> CustomUrlRoute {
    CustomUrlRoute {
        path: format!("/custom-urls/{site_key}/routes/{url}"),
        url: url.into(),
        site_key: site_key.into(),
        target: RouteTarget::Document(uuid.into()),
    }
}

pub fn history_route(url: &str, site_key: &str, canonical_path: &str) -> CustomUrlRoute {
    CustomUrlRoute {
        path: format!("/custom-urls/{site_key}/routes/{url}"),
        url: url.into(),
        site_key: site_key.into(),
        target: RouteTarget::History(canonical_path.into()),
    }
}

pub fn document(uuid: &str, base_domain: &str, suffix: &[&str], stage: WorkflowStage) -> CustomUrlDocument {
    CustomUrlDocument {
        uuid: uuid.into(),
        title: format!("Custom url {uuid}"),
        published: true,
        base_domain: base_domain.into(),
        domain_parts: DomainParts {
            prefix: String::new(),
            suffix: suffix.iter().map(|s| s.to_string()).collect(),
        },
        target_locale: "en".into(),
        target: Some(TargetDocument {
            uuid: format!("{uuid}-target"),
            workflow_stage: stage,
        }),
    }
}

/// In-memory store that counts lookups.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryCustomUrlStore,
    route_lookups: AtomicUsize,
    document_lookups: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(self, route: CustomUrlRoute) -> Self {
        self.inner.insert_route(route);
        self
    }

    pub fn with_document(self, document: CustomUrlDocument) -> Self {
        self.inner.insert_document(document);
        self
    }

    pub fn route_lookups(&self) -> usize {
        self.route_lookups.load(Ordering::SeqCst)
    }

    pub fn document_lookups(&self) -> usize {
        self.document_lookups.load(Ordering::SeqCst)
    }
}

impl CustomUrlStore for CountingStore {
    fn find_route_by_url(&self, url: &str, site_key: &str) -> Option<CustomUrlRoute> {
        self.route_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_route_by_url(url, site_key)
    }

    fn find_by_url(&self, url: &str, site_key: &str, locale: &str) -> Option<CustomUrlDocument> {
        self.document_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_url(url, site_key, locale)
    }
}
