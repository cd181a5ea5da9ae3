//! Custom url storage.
//!
//! The processor only reads routes and documents. [`CustomUrlStore`] is the
//! seam to whatever persists them; [`InMemoryCustomUrlStore`] keeps them in
//! concurrent maps and can be seeded from a JSON file.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::custom_url::model::{CustomUrlDocument, CustomUrlRoute, RouteTarget};

/// Read access to custom url routes and documents.
pub trait CustomUrlStore: Send + Sync {
    /// Route registered for a normalized url inside a site.
    fn find_route_by_url(&self, url: &str, site_key: &str) -> Option<CustomUrlRoute>;

    /// Document behind the live route for a url, loaded in `locale`.
    fn find_by_url(&self, url: &str, site_key: &str, locale: &str) -> Option<CustomUrlDocument>;
}

/// Error raised while loading a store file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read custom url store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse custom url store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk layout of a store file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub routes: Vec<CustomUrlRoute>,
    #[serde(default)]
    pub documents: Vec<CustomUrlDocument>,
}

/// Concurrent in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryCustomUrlStore {
    /// (site key, url) → route
    routes: DashMap<(String, String), CustomUrlRoute>,
    /// uuid → document
    documents: DashMap<String, CustomUrlDocument>,
}

impl InMemoryCustomUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load routes and documents from a JSON snapshot file.
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: StoreSnapshot =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::from_snapshot(snapshot);
        tracing::info!(
            path = %path.display(),
            routes = store.routes.len(),
            documents = store.documents.len(),
            "Loaded custom url store"
        );
        Ok(store)
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        for document in snapshot.documents {
            store.insert_document(document);
        }
        for route in snapshot.routes {
            store.insert_route(route);
        }
        store
    }

    pub fn insert_route(&self, route: CustomUrlRoute) {
        self.routes.insert((route.site_key.clone(), route.url.clone()), route);
    }

    pub fn insert_document(&self, document: CustomUrlDocument) {
        self.documents.insert(document.uuid.clone(), document);
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

impl CustomUrlStore for InMemoryCustomUrlStore {
    fn find_route_by_url(&self, url: &str, site_key: &str) -> Option<CustomUrlRoute> {
        self.routes
            .get(&(site_key.to_string(), url.to_string()))
            .map(|r| r.value().clone())
    }

    // Documents are not translated here, every locale sees the same record
    fn find_by_url(&self, url: &str, site_key: &str, _locale: &str) -> Option<CustomUrlDocument> {
        let route = self.find_route_by_url(url, site_key)?;
        match route.target {
            RouteTarget::Document(uuid) => self.documents.get(&uuid).map(|d| d.value().clone()),
            RouteTarget::History(_) => None,
        }
    }
}
