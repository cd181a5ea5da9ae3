//! Query façade over the compiled collection.
//!
//! # Responsibilities
//! - Key lookups for sites and portals
//! - Url → entry resolution per environment
//! - Reverse lookup of absolute urls for a resource path
//!
//! # Design Decisions
//! - Holds the collection by `Arc`, cloning a manager is cheap
//! - Only key lookups fail; url lookups return `None` or empty lists

use std::sync::Arc;
use thiserror::Error;

use crate::collection::{Collection, MatchType, UrlEntry};
use crate::site::{Portal, Site};

/// A key lookup found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("site `{0}` not found")]
    SiteNotFound(String),
    #[error("portal `{0}` not found")]
    PortalNotFound(String),
}

/// Read-only lookups used by every request.
#[derive(Debug, Clone)]
pub struct Manager {
    collection: Arc<Collection>,
    url_scheme: String,
}

impl Manager {
    pub fn new(collection: Arc<Collection>) -> Self {
        Self {
            collection,
            url_scheme: "http".to_string(),
        }
    }

    /// Scheme used by [`Manager::find_urls_for_resource_path`].
    pub fn with_url_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.url_scheme = scheme.into();
        self
    }

    pub fn collection(&self) -> &Arc<Collection> {
        &self.collection
    }

    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.collection.environments()
    }

    pub fn find_site_by_key(&self, key: &str) -> Result<&Site, LookupError> {
        self.collection
            .site(key)
            .ok_or_else(|| LookupError::SiteNotFound(key.to_string()))
    }

    pub fn find_portal_by_key(&self, key: &str) -> Result<&Portal, LookupError> {
        self.collection
            .portal(key)
            .ok_or_else(|| LookupError::PortalNotFound(key.to_string()))
    }

    /// First entry of the environment whose pattern is a prefix of `url`.
    pub fn find_url_entry(&self, url: &str, environment: &str) -> Option<&UrlEntry> {
        self.collection
            .entries(environment)
            .iter()
            .find(|entry| entry.matches(url))
    }

    /// Every entry of the environment whose pattern is a prefix of `url`.
    pub fn find_url_entries(&self, url: &str, environment: &str) -> Vec<&UrlEntry> {
        self.collection
            .entries(environment)
            .iter()
            .filter(|entry| entry.matches(url))
            .collect()
    }

    /// Entries of one site serving the given locale (`de`, `de_at`).
    pub fn find_url_entries_by_site_and_locale(&self, key: &str, locale: &str, environment: &str) -> Vec<&UrlEntry> {
        self.collection
            .entries(environment)
            .iter()
            .filter(|entry| entry.site_key == key)
            .filter(|entry| entry.localization.as_ref().is_some_and(|l| l.to_string() == locale))
            .collect()
    }

    /// One absolute url per portal serving `language_code`, in collection order.
    ///
    /// The portal's main full url is used when it has several.
    pub fn find_urls_for_resource_path(
        &self,
        path: &str,
        environment: &str,
        language_code: &str,
        site_key: Option<&str>,
    ) -> Vec<String> {
        let candidates = self
            .collection
            .entries(environment)
            .iter()
            .filter(|entry| entry.match_type == MatchType::Full && entry.portal_key.is_some())
            .filter(|entry| site_key.map_or(true, |key| entry.site_key == key))
            .filter(|entry| entry.localization.as_ref().is_some_and(|l| l.to_string() == language_code));

        let mut chosen: Vec<&UrlEntry> = Vec::new();
        for entry in candidates {
            match chosen.iter_mut().find(|c| c.portal_key == entry.portal_key) {
                Some(slot) => {
                    if entry.main && !slot.main {
                        *slot = entry;
                    }
                }
                None => chosen.push(entry),
            }
        }

        chosen
            .into_iter()
            .map(|entry| format!("{}://{}{}", self.url_scheme, entry.url, path))
            .collect()
    }
}
