//! Site definition watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Notification that site definitions changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitesChanged {
    pub paths: Vec<PathBuf>,
}

/// Watches the site config directory and reports changes.
pub struct SiteWatcher {
    dir: PathBuf,
    change_tx: mpsc::UnboundedSender<SitesChanged>,
}

impl SiteWatcher {
    /// Create a new SiteWatcher.
    ///
    /// Returns the watcher and a receiver for change notifications.
    pub fn new(dir: &Path) -> (Self, mpsc::UnboundedReceiver<SitesChanged>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (
            Self {
                dir: dir.to_path_buf(),
                change_tx,
            },
            change_rx,
        )
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
                    let toml = event
                        .paths
                        .iter()
                        .any(|p| p.extension().is_some_and(|ext| ext == "toml"));
                    if relevant && toml {
                        tracing::info!(paths = ?event.paths, "Site definition change detected");
                        let _ = tx.send(SitesChanged { paths: event.paths });
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        tracing::info!(dir = ?self.dir, "Site watcher started");
        Ok(watcher)
    }
}
