//! Site definition sources.
//!
//! The builder never reads files itself. A [`SiteSource`] hands it parsed
//! definitions and reports which resources they came from, so the cache can
//! tell when a rebuild is due.

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::site::model::SiteDefinition;

/// Error raised while reading site definitions.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read site definitions from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse site definition {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Supplies parsed site definitions.
pub trait SiteSource: Send + Sync {
    /// Resources the definitions are read from, sorted.
    fn resources(&self) -> Result<Vec<PathBuf>, SourceError>;

    /// Read and parse all definitions.
    fn load(&self) -> Result<Vec<SiteDefinition>, SourceError>;
}

/// Reads one site per `*.toml` file from a directory.
#[derive(Debug, Clone)]
pub struct TomlDirSource {
    dir: PathBuf,
}

impl TomlDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SiteSource for TomlDirSource {
    fn resources(&self) -> Result<Vec<PathBuf>, SourceError> {
        let io_err = |source| SourceError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self) -> Result<Vec<SiteDefinition>, SourceError> {
        let mut sites = Vec::new();
        for path in self.resources()? {
            let content = fs::read_to_string(&path).map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;
            let site: SiteDefinition = toml::from_str(&content).map_err(|source| SourceError::Parse {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(site = %site.key, path = %path.display(), "Site definition loaded");
            sites.push(site);
        }
        Ok(sites)
    }
}
