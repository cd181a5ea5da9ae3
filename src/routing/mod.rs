//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (host, path, environment)
//!     → manager.rs (query the compiled collection)
//!     → matcher.rs (prefix / wildcard pattern match)
//!     → Return: first matching url entry, or None (unroutable)
//! ```
//!
//! # Design Decisions
//! - The collection is immutable, lookups need no locks
//! - Deterministic: entries are scanned in collection order, first match wins
//! - Not found is a normal outcome, never an error

pub mod manager;
pub mod matcher;

pub use manager::{LookupError, Manager};
