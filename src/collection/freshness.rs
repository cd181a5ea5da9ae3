//! Freshness markers for the compiled collection.
//!
//! A marker is a blake3 hash over the environments indexed and every source
//! resource (path and content). Any added, removed or edited resource yields
//! a different marker.

use std::fs;
use std::path::PathBuf;

/// blake3 digest identifying one state of the source resources.
pub type ContentHash = blake3::Hash;

/// Compute the marker for a resource set and environment list.
pub fn compute_marker(resources: &[PathBuf], environments: &[String]) -> ContentHash {
    let mut hasher = blake3::Hasher::new();

    for env in environments {
        hasher.update(env.as_bytes());
        hasher.update(&[0]);
    }

    let mut sorted: Vec<&PathBuf> = resources.iter().collect();
    sorted.sort();

    for path in sorted {
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        // Length prefix keeps an unreadable file distinct from an empty one
        match fs::read(path) {
            Ok(content) => {
                hasher.update(&(content.len() as u64).to_le_bytes());
                hasher.update(&content);
            }
            Err(_) => {
                hasher.update(&u64::MAX.to_le_bytes());
            }
        }
    }

    hasher.finalize()
}
