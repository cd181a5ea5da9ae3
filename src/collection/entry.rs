//! Resolved url entries.

use serde::{Deserialize, Serialize};

use crate::routing::matcher;
use crate::site::Localization;

/// How a url entry relates to the portal it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Literal url, serves content directly.
    Full,
    /// Url without its localization segment, redirects to a full url.
    Partial,
    /// Pattern with a wildcard host label, used only as fallback.
    Wildcard,
    /// Alias that redirects to a canonical portal url.
    Redirect,
}

impl MatchType {
    /// Sort rank inside an environment index. Lower ranks are matched first.
    pub fn rank(self) -> u8 {
        match self {
            MatchType::Full | MatchType::Redirect => 0,
            MatchType::Partial => 1,
            MatchType::Wildcard => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Full => "full",
            MatchType::Partial => "partial",
            MatchType::Wildcard => "wildcard",
            MatchType::Redirect => "redirect",
        }
    }
}

/// A flattened url → site/portal/localization mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub match_type: MatchType,
    pub site_key: String,
    /// Missing for wildcard placeholders not bound to a portal.
    pub portal_key: Option<String>,
    pub localization: Option<Localization>,
    pub url: String,
    /// Target url for partial and redirect entries.
    pub redirect: Option<String>,
    pub main: bool,
    pub priority: u32,
}

impl UrlEntry {
    pub fn new(match_type: MatchType, site_key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            match_type,
            site_key: site_key.into(),
            portal_key: None,
            localization: None,
            url: url.into(),
            redirect: None,
            main: false,
            priority: default_priority(match_type, false),
        }
    }

    pub fn with_portal(mut self, portal_key: impl Into<String>) -> Self {
        self.portal_key = Some(portal_key.into());
        self
    }

    pub fn with_localization(mut self, localization: Localization) -> Self {
        self.localization = Some(localization);
        self
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    pub fn with_main(mut self, main: bool) -> Self {
        self.main = main;
        self.priority = default_priority(self.match_type, main);
        self
    }

    /// Anything but a wildcard fallback.
    pub fn is_concrete(&self) -> bool {
        self.match_type != MatchType::Wildcard
    }

    pub fn matches(&self, url: &str) -> bool {
        matcher::matches_prefix(&self.url, url)
    }
}

fn default_priority(match_type: MatchType, main: bool) -> u32 {
    match match_type {
        MatchType::Full if main => 5,
        MatchType::Full => 4,
        MatchType::Redirect => 3,
        MatchType::Partial => 2,
        MatchType::Wildcard => 1,
    }
}
