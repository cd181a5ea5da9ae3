//! Custom (vanity) url resolution.
//!
//! # Data Flow
//! ```text
//! RequestInfo + RequestAttributes (site key, locale)
//!     → processor.rs (normalize, route lookup, history short-circuit)
//!     → store.rs (routes and documents, external)
//!     → routing::Manager (portal concreteness check)
//!     → generator.rs (canonical url)
//!     → CustomUrlAttribute on the request, or nothing
//! ```

pub mod generator;
pub mod model;
pub mod processor;
pub mod store;

pub use model::{CustomUrlDocument, CustomUrlRoute, DomainParts, RouteTarget, TargetDocument, WorkflowStage};
pub use processor::{normalize_url, CustomUrlAttribute, CustomUrlProcessor, ProcessOutcome};
pub use store::{CustomUrlStore, InMemoryCustomUrlStore, StoreError, StoreSnapshot};
