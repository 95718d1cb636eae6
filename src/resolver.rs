//! Discovery of the metadata formats a repository advertises.
//!
//! [`RemoteFormatResolver::resolve`] issues a `ListMetadataFormats` request and
//! returns every advertised (prefix, schema identifier) pair as a
//! [`UsableFormatMap`]. Pairs are kept whether or not a local transformer
//! exists for them; filtering happens at dispatch time, so a diagnostic can
//! tell "the repository lacks X" apart from "the harvester lacks X".

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{HarvestError, Result};
use crate::fetch::Fetch;
use crate::formats::FormatCatalog;
use crate::query::OaiPmhQuery;
use crate::response::OaiPmhResponse;

/// Advertised metadata prefixes mapped to schema identifiers, in the order the
/// repository lists them.
///
/// Prefixes are repository-local, so a map is only meaningful for the address
/// it was resolved from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsableFormatMap {
    formats: IndexMap<String, String>,
}

impl UsableFormatMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an advertised format.
    pub fn insert(&mut self, prefix: impl Into<String>, schema: impl Into<String>) {
        self.formats.insert(prefix.into(), schema.into());
    }

    /// Schema identifier advertised for `prefix`.
    #[must_use]
    pub fn schema(&self, prefix: &str) -> Option<&str> {
        self.formats.get(prefix).map(String::as_str)
    }

    /// Number of advertised formats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Returns true if the repository advertised nothing (or was not reachable).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// All (prefix, schema) pairs in advertisement order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.formats.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    /// Advertised prefixes whose schema the catalog supports, in advertisement
    /// order. These are the values an operator may choose from.
    #[must_use]
    pub fn usable_prefixes(&self, catalog: &FormatCatalog) -> Vec<String> {
        self.iter()
            .filter(|(_, schema)| catalog.supports(schema))
            .map(|(prefix, _)| prefix.to_string())
            .collect()
    }
}

impl<P: Into<String>, S: Into<String>> FromIterator<(P, S)> for UsableFormatMap {
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        let mut map = UsableFormatMap::new();
        for (prefix, schema) in iter {
            map.insert(prefix, schema);
        }
        map
    }
}

/// Queries repositories for their advertised metadata formats.
#[derive(Debug, Clone)]
pub struct RemoteFormatResolver<F> {
    fetcher: F,
}

impl<F: Fetch> RemoteFormatResolver<F> {
    /// Creates a resolver using the given fetch capability.
    pub fn new(fetcher: F) -> Self {
        RemoteFormatResolver { fetcher }
    }

    /// The fetch capability.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolves the formats of the repository at `host_url`.
    ///
    /// Never fails: any fetch or parse problem is logged and yields an empty
    /// map, since the operator may fix the address and retry.
    pub fn resolve(&self, host_url: &str) -> UsableFormatMap {
        match self.try_resolve(host_url) {
            Ok(map) => {
                info!(host_url, formats = map.len(), "Resolved repository metadata formats");
                map
            },
            Err(e) => {
                error!(host_url, error = %e, "Cannot retrieve metadata formats of the repository");
                UsableFormatMap::new()
            },
        }
    }

    /// Resolves the formats of the repository at `host_url`, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is empty, the request fails, the
    /// response is not parseable, or the repository reports a protocol error.
    pub fn try_resolve(&self, host_url: &str) -> Result<UsableFormatMap> {
        let url = OaiPmhQuery::new(host_url).list_metadata_formats()?;
        let body = self.fetcher.fetch(&url)?;
        parse_metadata_formats(&body)
    }
}

/// Parses a `ListMetadataFormats` response into a format map.
///
/// # Errors
///
/// Returns an error if the body is not a parseable OAI-PMH response or carries
/// a protocol error.
pub fn parse_metadata_formats(body: &str) -> Result<UsableFormatMap> {
    let response = OaiPmhResponse::parse(body)?;
    let formats = response
        .list_metadata_formats
        .ok_or_else(|| HarvestError::Xml("Response has no ListMetadataFormats element".into()))?
        .formats;

    let mut map = UsableFormatMap::new();
    for format in formats {
        let prefix = format.prefix.trim();
        let namespace = format.namespace.trim();
        if prefix.is_empty() || namespace.is_empty() {
            warn!(
                prefix,
                namespace,
                "Ignoring metadata format without prefix or namespace"
            );
            continue;
        }
        debug!(prefix, namespace, schema = %format.schema.trim(), "Advertised metadata format");
        map.insert(prefix, namespace);
    }
    Ok(map)
}
