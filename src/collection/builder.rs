//! Collection builder.
//!
//! # Responsibilities
//! - Normalize site and portal definitions
//! - Expand every (site, portal, environment, pattern) into url entries
//! - Reject duplicate urls and malformed patterns
//! - Order entries so first-match-wins is deterministic
//!
//! # Design Decisions
//! - Pure function of its input, no I/O
//! - Fails on the first configuration error, nothing partial is returned

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::collection::entry::{MatchType, UrlEntry};
use crate::collection::Collection;
use crate::routing::matcher::{self, PatternError};
use crate::site::{Localization, Portal, PortalDefinition, Site, SiteDefinition, UrlDefinition};

/// Configuration error found while building a collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("url `{url}` is registered twice in environment `{environment}` (portals `{first}` and `{second}`)")]
    DuplicateUrl {
        environment: String,
        url: String,
        first: String,
        second: String,
    },

    #[error("malformed url pattern `{pattern}` in portal `{portal}`: {reason}")]
    MalformedPattern {
        portal: String,
        pattern: String,
        reason: PatternError,
    },

    #[error("localization `{localization}` is not declared by site `{site}`")]
    UnknownLocalization { site: String, localization: Localization },

    #[error("site `{0}` declares no localizations")]
    NoLocalizations(String),

    #[error("site key `{0}` is declared twice")]
    DuplicateSiteKey(String),

    #[error("portal key `{0}` is declared twice")]
    DuplicatePortalKey(String),
}

/// Compiles site definitions into a [`Collection`].
#[derive(Debug, Clone)]
pub struct CollectionBuilder {
    environments: Vec<String>,
}

impl CollectionBuilder {
    /// Create a builder indexing the given environments.
    pub fn new<I, S>(environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            environments: environments.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the collection.
    pub fn build(&self, definitions: &[SiteDefinition]) -> Result<Collection, BuildError> {
        let mut sites = BTreeMap::new();
        let mut portals = BTreeMap::new();
        let mut indexes: BTreeMap<String, EnvironmentIndex> = self
            .environments
            .iter()
            .map(|env| (env.clone(), EnvironmentIndex::new(env)))
            .collect();

        for definition in definitions {
            if sites.contains_key(&definition.key) {
                return Err(BuildError::DuplicateSiteKey(definition.key.clone()));
            }
            let mut site = normalize_site(definition)?;

            for portal_definition in &definition.portals {
                if portals.contains_key(&portal_definition.key) {
                    return Err(BuildError::DuplicatePortalKey(portal_definition.key.clone()));
                }
                let portal = normalize_portal(&site, portal_definition)?;

                for binding in &portal.environments {
                    let Some(index) = indexes.get_mut(&binding.name) else {
                        tracing::debug!(
                            portal = %portal.key,
                            environment = %binding.name,
                            "Skipping bindings of unindexed environment"
                        );
                        continue;
                    };
                    for url in &binding.urls {
                        index.register(&site, &portal, url)?;
                    }
                }

                site.portals.push(portal.key.clone());
                portals.insert(portal.key.clone(), portal);
            }

            sites.insert(site.key.clone(), site);
        }

        let entries: BTreeMap<_, _> = indexes
            .into_iter()
            .map(|(env, index)| (env, index.into_entries()))
            .collect();

        tracing::debug!(
            sites = sites.len(),
            portals = portals.len(),
            environments = entries.len(),
            "Collection built"
        );

        Ok(Collection::new(sites, portals, entries))
    }
}

fn normalize_site(definition: &SiteDefinition) -> Result<Site, BuildError> {
    let Some(first) = definition.localizations.first() else {
        return Err(BuildError::NoLocalizations(definition.key.clone()));
    };

    let default_localization = definition.default_localization.clone().unwrap_or_else(|| first.clone());
    if !definition.localizations.contains(&default_localization) {
        return Err(BuildError::UnknownLocalization {
            site: definition.key.clone(),
            localization: default_localization,
        });
    }

    Ok(Site {
        key: definition.key.clone(),
        name: definition.name.clone(),
        localizations: definition.localizations.clone(),
        default_localization,
        portals: Vec::new(),
    })
}

fn normalize_portal(site: &Site, definition: &PortalDefinition) -> Result<Portal, BuildError> {
    let localizations = if definition.localizations.is_empty() {
        site.localizations.clone()
    } else {
        definition.localizations.clone()
    };

    for localization in &localizations {
        ensure_declared(site, localization)?;
    }

    let default_localization = if localizations.contains(&site.default_localization) {
        site.default_localization.clone()
    } else {
        localizations[0].clone()
    };

    Ok(Portal {
        key: definition.key.clone(),
        name: definition.name.clone(),
        site_key: site.key.clone(),
        localizations,
        default_localization,
        environments: definition.environments.clone(),
    })
}

fn ensure_declared(site: &Site, localization: &Localization) -> Result<(), BuildError> {
    if site.has_localization(localization) {
        Ok(())
    } else {
        Err(BuildError::UnknownLocalization {
            site: site.key.clone(),
            localization: localization.clone(),
        })
    }
}

/// Entries of one environment under construction.
struct EnvironmentIndex {
    name: String,
    entries: Vec<UrlEntry>,
    /// url → (owning portal key, position in `entries`)
    owners: HashMap<String, (String, usize)>,
}

impl EnvironmentIndex {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
            owners: HashMap::new(),
        }
    }

    fn register(&mut self, site: &Site, portal: &Portal, url: &UrlDefinition) -> Result<(), BuildError> {
        let malformed = |pattern: &str, reason| BuildError::MalformedPattern {
            portal: portal.key.clone(),
            pattern: pattern.to_string(),
            reason,
        };

        let shape = matcher::parse_pattern(&url.pattern).map_err(|reason| malformed(&url.pattern, reason))?;
        let base = |match_type, pattern: String| {
            UrlEntry::new(match_type, &site.key, pattern)
                .with_portal(&portal.key)
                .with_main(url.main)
        };

        if let Some(target) = &url.redirect {
            matcher::parse_pattern(target).map_err(|reason| malformed(target, reason))?;
            let localization = self.localization_of(site, portal, url)?;
            // A wildcard alias stays a fallback
            let match_type = if shape.wildcard { MatchType::Wildcard } else { MatchType::Redirect };
            let entry = base(match_type, url.pattern.clone())
                .with_localization(localization)
                .with_redirect(target);
            return self.push(entry, portal);
        }

        let match_type = if shape.wildcard { MatchType::Wildcard } else { MatchType::Full };

        if !shape.placeholder {
            let localization = self.localization_of(site, portal, url)?;
            return self.push(base(match_type, url.pattern.clone()).with_localization(localization), portal);
        }

        for localization in &portal.localizations {
            let expanded = matcher::expand(&url.pattern, localization);
            self.push(base(match_type, expanded).with_localization(localization.clone()), portal)?;
        }

        if !shape.wildcard {
            let default = &portal.default_localization;
            let partial = base(MatchType::Partial, matcher::strip_placeholders(&url.pattern))
                .with_main(false)
                .with_localization(default.clone())
                .with_redirect(matcher::expand(&url.pattern, default));
            self.push(partial, portal)?;
        }

        Ok(())
    }

    fn localization_of(&self, site: &Site, portal: &Portal, url: &UrlDefinition) -> Result<Localization, BuildError> {
        match &url.localization {
            Some(localization) => {
                ensure_declared(site, localization)?;
                Ok(localization.clone())
            }
            None => Ok(portal.default_localization.clone()),
        }
    }

    /// Add an entry, rejecting urls already owned by any registration.
    ///
    /// Inside one portal a partial url yields to any other entry for the
    /// same url, whichever is registered first.
    fn push(&mut self, entry: UrlEntry, portal: &Portal) -> Result<(), BuildError> {
        if let Some((owner, slot)) = self.owners.get(&entry.url) {
            if *owner == portal.key {
                if entry.match_type == MatchType::Partial {
                    return Ok(());
                }
                if self.entries[*slot].match_type == MatchType::Partial {
                    self.entries[*slot] = entry;
                    return Ok(());
                }
            }
            return Err(BuildError::DuplicateUrl {
                environment: self.name.clone(),
                url: entry.url,
                first: owner.clone(),
                second: portal.key.clone(),
            });
        }

        self.owners
            .insert(entry.url.clone(), (portal.key.clone(), self.entries.len()));
        self.entries.push(entry);
        Ok(())
    }

    fn into_entries(mut self) -> Vec<UrlEntry> {
        // Stable: declaration order survives inside each rank
        self.entries.sort_by_key(|entry| entry.match_type.rank());
        self.entries
    }
}
