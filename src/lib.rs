//! Multi-tenant site routing.
//!
//! Compiles site definitions into an indexed collection, answers url and key
//! lookups against it, and resolves custom (vanity) urls for requests.

pub mod collection;
pub mod config;
pub mod custom_url;
pub mod http;
pub mod observability;
pub mod routing;
pub mod site;

pub use collection::{Collection, CollectionBuilder, CollectionCache};
pub use config::AppConfig;
pub use http::HttpServer;
pub use routing::Manager;
