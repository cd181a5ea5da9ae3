//! Site, portal and localization types.
//!
//! The `*Definition` types are the parsed input tree handed to the builder.
//! [`Site`] and [`Portal`] are the normalized forms stored in a collection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language with an optional country, e.g. `de` or `de_at`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Localization {
    pub language: String,
    pub country: Option<String>,
}

impl Localization {
    pub fn new(language: impl Into<String>, country: Option<&str>) -> Self {
        Self {
            language: language.into(),
            country: country.map(str::to_string),
        }
    }

    /// Form used inside URLs (`de-at`).
    pub fn url_segment(&self) -> String {
        match &self.country {
            Some(country) => format!("{}-{}", self.language, country),
            None => self.language.clone(),
        }
    }
}

impl fmt::Display for Localization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => write!(f, "{}", self.language),
        }
    }
}

/// Error for localization codes that are not `language[_country]`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid localization code `{0}`")]
pub struct InvalidLocalization(pub String);

impl FromStr for Localization {
    type Err = InvalidLocalization;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ['_', '-']);
        let language = parts.next().unwrap_or_default();
        let country = parts.next();

        let valid = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(language) || country.is_some_and(|c| !valid(c)) {
            return Err(InvalidLocalization(s.to_string()));
        }

        Ok(Self::new(language, country))
    }
}

impl TryFrom<String> for Localization {
    type Error = InvalidLocalization;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Localization> for String {
    fn from(value: Localization) -> Self {
        value.to_string()
    }
}

/// Parsed definition of a site (webspace).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteDefinition {
    /// Unique site key.
    pub key: String,

    #[serde(default)]
    pub name: String,

    /// Localizations the site supports, in declaration order.
    #[serde(default)]
    pub localizations: Vec<Localization>,

    /// Falls back to the first declared localization.
    #[serde(default)]
    pub default_localization: Option<Localization>,

    #[serde(default)]
    pub portals: Vec<PortalDefinition>,
}

/// Parsed definition of a portal inside a site.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortalDefinition {
    pub key: String,

    #[serde(default)]
    pub name: String,

    /// Subset of the site localizations served by this portal.
    /// Empty means all of them.
    #[serde(default)]
    pub localizations: Vec<Localization>,

    #[serde(default)]
    pub environments: Vec<EnvironmentDefinition>,
}

/// URL bindings of a portal for one deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnvironmentDefinition {
    /// Environment name, e.g. `prod`.
    pub name: String,

    #[serde(default)]
    pub urls: Vec<UrlDefinition>,
}

/// A single URL pattern registered for a portal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UrlDefinition {
    /// `host[/path]`, may contain `*` in the host and
    /// `{localization}`, `{language}` or `{country}` placeholders.
    pub pattern: String,

    /// Localization served by a literal url. Defaults to the portal default.
    #[serde(default)]
    pub localization: Option<Localization>,

    /// Marks this url as an alias for the given canonical url.
    #[serde(default)]
    pub redirect: Option<String>,

    /// Preferred url when several serve the same localization.
    #[serde(default)]
    pub main: bool,
}

impl UrlDefinition {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            localization: None,
            redirect: None,
            main: false,
        }
    }
}

/// A site as stored in a built collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub key: String,
    pub name: String,
    pub localizations: Vec<Localization>,
    pub default_localization: Localization,
    /// Keys of the portals of this site, in declaration order.
    pub portals: Vec<String>,
}

impl Site {
    pub fn has_localization(&self, localization: &Localization) -> bool {
        self.localizations.contains(localization)
    }
}

/// A portal as stored in a built collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    pub key: String,
    pub name: String,
    pub site_key: String,
    pub localizations: Vec<Localization>,
    pub default_localization: Localization,
    pub environments: Vec<EnvironmentDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localization_parse() {
        let plain: Localization = "de".parse().unwrap();
        assert_eq!(plain, Localization::new("de", None));
        assert_eq!(plain.to_string(), "de");

        let country: Localization = "de_at".parse().unwrap();
        assert_eq!(country.country.as_deref(), Some("at"));
        assert_eq!(country.to_string(), "de_at");
        assert_eq!(country.url_segment(), "de-at");

        // Dash form is accepted too
        assert_eq!("de-at".parse::<Localization>().unwrap(), country);
    }

    #[test]
    fn test_localization_rejects_garbage() {
        assert!("".parse::<Localization>().is_err());
        assert!("de_".parse::<Localization>().is_err());
        assert!("d e".parse::<Localization>().is_err());
    }

    #[test]
    fn test_site_definition_from_toml() {
        let site: SiteDefinition = toml::from_str(
            r#"
            key = "sulu_io"
            name = "Sulu"
            localizations = ["en", "de_at"]

            [[portals]]
            key = "sulu_io_portal"

            [[portals.environments]]
            name = "prod"

            [[portals.environments.urls]]
            pattern = "sulu.io/{localization}"
            "#,
        )
        .unwrap();

        assert_eq!(site.localizations.len(), 2);
        assert!(site.default_localization.is_none());
        let portal = &site.portals[0];
        assert_eq!(portal.environments[0].name, "prod");
        assert_eq!(portal.environments[0].urls[0].pattern, "sulu.io/{localization}");
        assert!(!portal.environments[0].urls[0].main);
    }
}
