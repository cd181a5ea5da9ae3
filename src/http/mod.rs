//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → request.rs (extract host, path, query)
//!     → Resolver (url entry lookup, custom url processing)
//!     → RequestAttributes in request extensions
//!     → resolution handler (JSON report)
//! ```

pub mod request;
pub mod server;

pub use request::{RequestAttributes, RequestInfo};
pub use server::{AppState, HttpServer, Resolver};
