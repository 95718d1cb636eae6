//! OAI-PMH request URL construction.
//!
//! Builds the four request kinds the harvester issues against a repository
//! base URL:
//!
//! - `ListRecords`, optionally bounded by `from`/`until` datestamps
//! - `ListRecords` continuation with a resumption token
//! - `ListMetadataFormats`
//! - `Identify`
//!
//! # Examples
//!
//! ```
//! use oai_harvest::query::OaiPmhQuery;
//!
//! let query = OaiPmhQuery::new("https://ws.pangaea.de/oai/provider");
//! assert_eq!(
//!     query.list_records("datacite3", None, None).unwrap(),
//!     "https://ws.pangaea.de/oai/provider?verb=ListRecords&metadataPrefix=datacite3"
//! );
//! ```

use url::form_urlencoded::byte_serialize;

use crate::error::{ConfigurationError, Result};

/// Builds OAI-PMH request URLs for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiPmhQuery {
    host_url: String,
}

impl OaiPmhQuery {
    /// Creates a query builder for the given repository base URL.
    pub fn new(host_url: impl Into<String>) -> Self {
        OaiPmhQuery {
            host_url: host_url.into(),
        }
    }

    /// The repository base URL.
    #[must_use]
    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    fn host(&self) -> Result<&str> {
        let host = self.host_url.trim();
        if host.is_empty() {
            Err(ConfigurationError::MissingHostUrl.into())
        } else {
            Ok(host)
        }
    }

    /// `ListRecords` URL for the first page of records.
    ///
    /// Empty `from`/`until` bounds are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host URL or the prefix is empty.
    pub fn list_records(
        &self,
        metadata_prefix: &str,
        from: Option<&str>,
        until: Option<&str>,
    ) -> Result<String> {
        let host = self.host()?;
        if metadata_prefix.trim().is_empty() {
            return Err(ConfigurationError::EmptyPrefix { allowed: vec![] }.into());
        }

        let mut url = format!("{host}?verb=ListRecords");
        if let Some(from) = from.filter(|v| !v.is_empty()) {
            url.push_str("&from=");
            url.extend(byte_serialize(from.as_bytes()));
        }
        if let Some(until) = until.filter(|v| !v.is_empty()) {
            url.push_str("&until=");
            url.extend(byte_serialize(until.as_bytes()));
        }
        url.push_str("&metadataPrefix=");
        url.extend(byte_serialize(metadata_prefix.trim().as_bytes()));
        Ok(url)
    }

    /// `ListRecords` URL for the page following `resumption_token`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host URL is empty.
    pub fn resumption(&self, resumption_token: &str) -> Result<String> {
        let host = self.host()?;
        let token: String = byte_serialize(resumption_token.as_bytes()).collect();
        Ok(format!("{host}?verb=ListRecords&resumptionToken={token}"))
    }

    /// `ListMetadataFormats` URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host URL is empty.
    pub fn list_metadata_formats(&self) -> Result<String> {
        Ok(format!("{}?verb=ListMetadataFormats", self.host()?))
    }

    /// `Identify` URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host URL is empty.
    pub fn identify(&self) -> Result<String> {
        Ok(format!("{}?verb=Identify", self.host()?))
    }
}
