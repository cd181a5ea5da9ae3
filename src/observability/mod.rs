//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (serve mode, optional)
//! ```
//!
//! # Design Decisions
//! - Not found and unroutable requests are logged at debug, never as errors
//! - Metric updates go through the `metrics` facade, a no-op without recorder

pub mod logging;
pub mod metrics;
