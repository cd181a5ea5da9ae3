//! Compiled collection cache.
//!
//! # Responsibilities
//! - Memoize the collection together with its freshness marker
//! - Detect stale memos and artifacts from the source resources on every access
//! - Rebuild and persist artifact + marker when stale
//!
//! # Design Decisions
//! - Artifact is a JSON snapshot, `<cache_id>.json`, marker in `<cache_id>.meta.json`
//! - Both files are written to a temp file and renamed into place
//! - Artifact first, marker last: a crash in between leaves a stale marker
//! - Rebuilds are serialized by a mutex, readers go through arc-swap

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use thiserror::Error;

use crate::collection::builder::{BuildError, CollectionBuilder};
use crate::collection::freshness::{self, ContentHash};
use crate::collection::Collection;
use crate::observability::metrics;
use crate::site::{SiteSource, SourceError};

/// Error raised while producing the current collection.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("invalid site configuration: {0}")]
    Build(#[from] BuildError),

    #[error("cannot write cache artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where and for which environments the collection is cached.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub cache_dir: PathBuf,
    pub cache_id: String,
    pub environments: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    marker: String,
    resources: Vec<PathBuf>,
}

/// Collection published together with the marker it was built for.
struct Memo {
    marker: ContentHash,
    collection: Arc<Collection>,
}

/// Serves the collection for the current state of its source resources.
pub struct CollectionCache<S> {
    source: S,
    options: CacheOptions,
    builder: CollectionBuilder,
    current: ArcSwapOption<Memo>,
    build_lock: Mutex<()>,
}

impl<S: SiteSource> CollectionCache<S> {
    pub fn new(source: S, options: CacheOptions) -> Self {
        let builder = CollectionBuilder::new(options.environments.iter().cloned());
        Self {
            source,
            options,
            builder,
            current: ArcSwapOption::empty(),
            build_lock: Mutex::new(()),
        }
    }

    /// Return the collection for the current source resources.
    ///
    /// The marker is recomputed on every call. While it matches the memo the
    /// memoized collection is returned; otherwise the artifact is loaded or
    /// rebuilt.
    pub fn get_current_collection(&self) -> Result<Arc<Collection>, CacheError> {
        let resources = self.source.resources()?;
        let marker = freshness::compute_marker(&resources, &self.options.environments);
        if let Some(collection) = self.memoized(&marker) {
            return Ok(collection);
        }

        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished while we waited
        if let Some(collection) = self.memoized(&marker) {
            return Ok(collection);
        }

        let collection = match self.load_fresh(&marker) {
            Some(collection) => {
                metrics::record_collection_load();
                tracing::info!(
                    artifact = %self.artifact_path().display(),
                    marker = %marker,
                    "Loaded compiled site collection"
                );
                collection
            }
            None => self.rebuild(resources, marker)?,
        };

        let collection = Arc::new(collection);
        self.current.store(Some(Arc::new(Memo {
            marker,
            collection: collection.clone(),
        })));
        Ok(collection)
    }

    fn memoized(&self, marker: &ContentHash) -> Option<Arc<Collection>> {
        match &*self.current.load() {
            Some(memo) if memo.marker == *marker => Some(memo.collection.clone()),
            _ => None,
        }
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.options.cache_dir.join(format!("{}.json", self.options.cache_id))
    }

    pub fn meta_path(&self) -> PathBuf {
        self.options.cache_dir.join(format!("{}.meta.json", self.options.cache_id))
    }

    fn load_fresh(&self, marker: &ContentHash) -> Option<Collection> {
        let meta: CacheMeta = read_json(&self.meta_path())?;
        if ContentHash::from_hex(&meta.marker).ok() != Some(*marker) {
            tracing::debug!(stored = %meta.marker, current = %marker, "Compiled collection is stale");
            return None;
        }
        read_json(&self.artifact_path())
    }

    fn rebuild(&self, resources: Vec<PathBuf>, marker: ContentHash) -> Result<Collection, CacheError> {
        let start = Instant::now();
        let definitions = self.source.load()?;
        let collection = self.builder.build(&definitions)?.with_resources(resources.clone());

        let artifact = serde_json::to_vec(&collection)?;
        let meta = serde_json::to_vec(&CacheMeta {
            marker: marker.to_hex().to_string(),
            resources,
        })?;

        let dir = &self.options.cache_dir;
        fs::create_dir_all(dir).map_err(|source| CacheError::Write {
            path: dir.clone(),
            source,
        })?;
        write_atomic(&self.artifact_path(), &artifact)?;
        write_atomic(&self.meta_path(), &meta)?;

        metrics::record_collection_build(start.elapsed());
        tracing::info!(
            sites = definitions.len(),
            marker = %marker,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rebuilt site collection"
        );
        Ok(collection)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let bytes = fs::read(path).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable cache file");
            None
        }
    }
}

/// Write to a uniquely named sibling, then rename over the target.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
    let write_err = |source| CacheError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&tmp, bytes).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteDefinition;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// In-memory source that counts loads.
    struct CountingSource {
        sites: Vec<SiteDefinition>,
        loads: AtomicUsize,
    }

    impl SiteSource for CountingSource {
        fn resources(&self) -> Result<Vec<PathBuf>, SourceError> {
            Ok(Vec::new())
        }

        fn load(&self) -> Result<Vec<SiteDefinition>, SourceError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.sites.clone())
        }
    }

    fn options(dir: &Path) -> CacheOptions {
        CacheOptions {
            cache_dir: dir.join("cache"),
            cache_id: "sites".into(),
            environments: vec!["prod".into()],
        }
    }

    fn source() -> CountingSource {
        let site: SiteDefinition = toml::from_str(
            r#"
            key = "s"
            localizations = ["en"]
            [[portals]]
            key = "p"
            [[portals.environments]]
            name = "prod"
            [[portals.environments.urls]]
            pattern = "sulu.io"
            "#,
        )
        .unwrap();
        CountingSource {
            sites: vec![site],
            loads: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_memoizes_within_process() {
        let dir = TempDir::new().unwrap();
        let cache = CollectionCache::new(source(), options(dir.path()));

        let first = cache.get_current_collection().unwrap();
        let second = cache.get_current_collection().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.source.loads.load(Ordering::SeqCst), 1);
        assert!(cache.artifact_path().exists());
        assert!(cache.meta_path().exists());
    }

    #[test]
    fn test_new_process_loads_artifact_without_rebuild() {
        let dir = TempDir::new().unwrap();
        let built = CollectionCache::new(source(), options(dir.path()))
            .get_current_collection()
            .unwrap();

        let cache = CollectionCache::new(source(), options(dir.path()));
        let loaded = cache.get_current_collection().unwrap();

        assert_eq!(*built, *loaded);
        assert_eq!(cache.source.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_corrupt_artifact_triggers_rebuild() {
        let dir = TempDir::new().unwrap();
        let first = CollectionCache::new(source(), options(dir.path()));
        first.get_current_collection().unwrap();
        fs::write(first.artifact_path(), b"{ not json").unwrap();

        let cache = CollectionCache::new(source(), options(dir.path()));
        cache.get_current_collection().unwrap();
        assert_eq!(cache.source.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_build_error_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut broken = source();
        broken.sites.push(broken.sites[0].clone());
        let cache = CollectionCache::new(broken, options(dir.path()));

        let err = cache.get_current_collection().unwrap_err();
        assert!(matches!(err, CacheError::Build(BuildError::DuplicateSiteKey(_))));
        assert!(!cache.artifact_path().exists());
        assert!(!cache.meta_path().exists());
    }
}
