//! site-router
//!
//! Compiles site definitions into a url collection and resolves requests
//! against it.
//!
//! # Architecture Overview
//!
//! ```text
//!   config/sites/*.toml ──▶ site::source ──▶ collection::builder ──▶ Collection
//!                                                    ▲                  │
//!                                  collection::cache (artifact + marker)│
//!                                                                       ▼
//!   Request ──▶ http::server ──▶ routing::Manager ──▶ custom_url::processor ──▶ RequestAttributes
//!                                                             │
//!                                                   custom_url::store
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use site_router::collection::CollectionCache;
use site_router::config::{self, AppConfig, ConfigError, SiteWatcher};
use site_router::custom_url::{CustomUrlStore, InMemoryCustomUrlStore};
use site_router::http::{HttpServer, RequestInfo, Resolver};
use site_router::observability;
use site_router::routing::Manager;
use site_router::site::TomlDirSource;

#[derive(Parser)]
#[command(name = "site-router")]
#[command(about = "Compile site definitions and resolve urls against them", long_about = None)]
struct Cli {
    /// Router configuration file. Defaults apply when it does not exist.
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    /// Environment to query instead of the configured one.
    #[arg(short, long)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the collection and print a summary per environment
    Build,
    /// Print the url entry matching a url
    Resolve { url: String },
    /// Print the absolute urls of a resource path in every portal
    Urls {
        path: String,
        #[arg(short, long)]
        locale: String,
        #[arg(short, long)]
        site: Option<String>,
    },
    /// Resolve a request including custom url processing
    CustomUrl { host: String, path: String },
    /// Serve resolution over HTTP
    Serve,
}

type Cache = CollectionCache<TomlDirSource>;

const SITE_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(e) => return Err(e.into()),
    };
    if let Some(environment) = cli.environment {
        config.sites.environment = environment;
    }

    observability::logging::init(&config.observability.log_level);

    tracing::info!(
        config_dir = %config.sites.config_dir.display(),
        environment = %config.sites.environment,
        "site-router v0.1.0 starting"
    );

    let cache = Arc::new(CollectionCache::new(
        TomlDirSource::new(&config.sites.config_dir),
        config.sites.cache_options(),
    ));
    let environment = config.sites.environment.clone();

    match cli.command {
        Commands::Build => {
            let collection = cache.get_current_collection()?;
            println!(
                "{} sites, {} portals",
                collection.sites().count(),
                collection.portals().count()
            );
            for env in collection.environments() {
                println!("  {env}: {} url entries", collection.entries(env).len());
            }
        }
        Commands::Resolve { url } => {
            let manager = manager(&cache, &config)?;
            match manager.find_url_entry(&url, &environment) {
                Some(entry) => println!("{}", serde_json::to_string_pretty(entry)?),
                None => {
                    eprintln!("no url entry matches {url}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Urls { path, locale, site } => {
            let manager = manager(&cache, &config)?;
            for url in manager.find_urls_for_resource_path(&path, &environment, &locale, site.as_deref()) {
                println!("{url}");
            }
        }
        Commands::CustomUrl { host, path } => {
            let resolver = Resolver::new(manager(&cache, &config)?, store(&config)?, environment);
            let request = match path.split_once('?') {
                Some((path, query)) => RequestInfo::new(host, path, Some(query)),
                None => RequestInfo::new(host, path, None),
            };
            let attributes = resolver.resolve(&request);
            println!("{}", serde_json::to_string_pretty(&attributes)?);
        }
        Commands::Serve => serve(cache, config).await?,
    }

    Ok(())
}

fn manager(cache: &Cache, config: &AppConfig) -> Result<Manager, Box<dyn std::error::Error>> {
    let collection = cache.get_current_collection()?;
    Ok(Manager::new(collection).with_url_scheme(config.sites.url_scheme.clone()))
}

fn store(config: &AppConfig) -> Result<Arc<dyn CustomUrlStore>, Box<dyn std::error::Error>> {
    let store = match &config.custom_urls.store_path {
        Some(path) => InMemoryCustomUrlStore::load_from_file(path)?,
        None => InMemoryCustomUrlStore::new(),
    };
    tracing::info!(routes = store.route_count(), "Custom url store ready");
    Ok(Arc::new(store))
}

async fn serve(cache: Arc<Cache>, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let store = store(&config)?;
    let manager = manager(&cache, &config)?;
    let mut current = manager.collection().clone();
    let resolver = Resolver::new(manager, store.clone(), config.sites.environment.clone());
    let server = HttpServer::new(resolver, &config.listener);

    // Reload on site definition changes; the watcher must outlive the server.
    // Without a watcher the cache is polled instead.
    let (watcher, mut changes) = SiteWatcher::new(&config.sites.config_dir);
    let watcher = match watcher.run() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "Site watcher disabled, polling site definitions");
            None
        }
    };
    let watching = watcher.is_some();

    let state = server.state();
    let sites = config.sites.clone();
    tokio::spawn(async move {
        let mut poll = tokio::time::interval(SITE_POLL_INTERVAL);
        loop {
            if watching {
                if changes.recv().await.is_none() {
                    break;
                }
            } else {
                poll.tick().await;
            }

            let cache = cache.clone();
            let rebuilt = tokio::task::spawn_blocking(move || cache.get_current_collection()).await;
            match rebuilt {
                Ok(Ok(collection)) if Arc::ptr_eq(&collection, &current) => {}
                Ok(Ok(collection)) => {
                    current = collection.clone();
                    let manager = Manager::new(collection).with_url_scheme(sites.url_scheme.clone());
                    state.swap(Resolver::new(manager, store.clone(), sites.environment.clone()));
                    tracing::info!("Site collection reloaded");
                }
                Ok(Err(e)) => tracing::error!(error = %e, "Site collection rebuild failed, keeping previous"),
                Err(e) => tracing::error!(error = %e, "Site collection rebuild task panicked"),
            }
        }
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server
        .run(listener, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
