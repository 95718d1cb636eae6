//! The harvest pipeline: parameters, format negotiation, records, documents.
//!
//! [`OaiPmhHarvester`] owns the [`HarvestParameters`] and a
//! [`TransformerDispatcher`]. Changing `hostUrl` re-resolves the repository's
//! formats; changing `metadataPrefix` rebinds the transformer. A harvest reads
//! `ListRecords` pages and transforms each page in parallel, keeping record
//! order.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{HarvestParameters, ParameterKey};
use crate::document::DataCiteDocument;
use crate::dispatcher::TransformerDispatcher;
use crate::error::{ConfigurationError, Result};
use crate::fetch::Fetch;
use crate::formats::FormatCatalog;
use crate::query::OaiPmhQuery;
use crate::reader::ListRecordsReader;
use crate::repository;

/// Counts of one harvest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Raw records read from the repository.
    pub records: usize,
    /// Documents handed to the sink, tombstones included.
    pub documents: usize,
    /// Records the transformer skipped.
    pub skipped: usize,
}

/// Harvests one OAI-PMH repository into [`DataCiteDocument`]s.
#[derive(Debug)]
pub struct OaiPmhHarvester<F> {
    parameters: HarvestParameters,
    fetcher: Arc<F>,
    dispatcher: TransformerDispatcher<Arc<F>>,
}

impl<F: Fetch> OaiPmhHarvester<F> {
    /// Creates a harvester without parameters.
    pub fn new(catalog: FormatCatalog, fetcher: F) -> Self {
        let fetcher = Arc::new(fetcher);
        OaiPmhHarvester {
            parameters: HarvestParameters::default(),
            dispatcher: TransformerDispatcher::new(catalog, Arc::clone(&fetcher)),
            fetcher,
        }
    }

    /// Creates a harvester and applies `parameters` in order: bounds, logo,
    /// host, then prefix.
    ///
    /// # Errors
    ///
    /// Returns the first rejected parameter.
    pub fn with_parameters(
        catalog: FormatCatalog,
        fetcher: F,
        parameters: &HarvestParameters,
    ) -> std::result::Result<Self, ConfigurationError> {
        let mut harvester = Self::new(catalog, fetcher);
        for key in [
            ParameterKey::From,
            ParameterKey::Until,
            ParameterKey::LogoUrl,
            ParameterKey::HostUrl,
            ParameterKey::MetadataPrefix,
        ] {
            if let Some(value) = parameters.get(key) {
                harvester.set_parameter(key, value)?;
            }
        }
        Ok(harvester)
    }

    /// Current parameter values.
    pub fn parameters(&self) -> &HarvestParameters {
        &self.parameters
    }

    /// The format negotiation state.
    pub fn dispatcher(&self) -> &TransformerDispatcher<Arc<F>> {
        &self.dispatcher
    }

    /// Changes one parameter and reconfigures the dispatcher if needed.
    ///
    /// A new `hostUrl` always triggers format resolution; a rebind failure is
    /// only logged, because the prefix may be set next. A `metadataPrefix` that
    /// cannot be bound is rejected and the previous value kept.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason for invalid URLs and unbindable prefixes.
    pub fn set_parameter(
        &mut self,
        key: ParameterKey,
        value: &str,
    ) -> std::result::Result<(), ConfigurationError> {
        match key {
            ParameterKey::MetadataPrefix => {
                self.dispatcher.set_prefix(value.trim())?;
                self.parameters.set(key, value)?;
            },
            ParameterKey::HostUrl => {
                if self.parameters.set(key, value)? {
                    let host_url = self.parameters.host_url.clone().unwrap_or_default();
                    if let Err(e) = self.dispatcher.set_repository_address(&host_url) {
                        warn!(host_url = %host_url, error = %e, "Harvester has no record transformer");
                    }
                }
            },
            ParameterKey::From | ParameterKey::Until | ParameterKey::LogoUrl => {
                self.parameters.set(key, value)?;
            },
        }
        Ok(())
    }

    /// URL of the first `ListRecords` request.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if host or prefix are unset.
    pub fn list_records_url(&self) -> Result<String> {
        OaiPmhQuery::new(self.parameters.host_url.as_deref().unwrap_or_default()).list_records(
            self.parameters.metadata_prefix.as_deref().unwrap_or_default(),
            self.parameters.from.as_deref(),
            self.parameters.until.as_deref(),
        )
    }

    /// Display name of the configured repository.
    pub fn repository_name(&self) -> String {
        repository::repository_name(
            self.fetcher.as_ref(),
            self.parameters.host_url.as_deref().unwrap_or_default(),
        )
    }

    /// The configured provider logo URL.
    pub fn logo_url(&self) -> Option<&str> {
        self.parameters.logo_url.as_deref()
    }

    /// A record source for the configured repository, prefix and bounds.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if host or prefix are unset.
    pub fn records(&self) -> Result<ListRecordsReader<Arc<F>>> {
        ListRecordsReader::new(
            Arc::clone(&self.fetcher),
            self.parameters.host_url.as_deref().unwrap_or_default(),
            self.parameters.metadata_prefix.as_deref().unwrap_or_default(),
            self.parameters.from.as_deref(),
            self.parameters.until.as_deref(),
        )
    }

    /// Harvests all records and hands each resulting document to `sink`.
    ///
    /// The transformer bound at the start is used for the whole run.
    ///
    /// # Errors
    ///
    /// Returns an error if no transformer is bound, a page cannot be read, or
    /// the sink fails.
    pub fn harvest<S>(&self, mut sink: S) -> Result<HarvestSummary>
    where
        S: FnMut(DataCiteDocument) -> Result<()>,
    {
        let transformer = self.dispatcher.current_transformer()?;
        let mut reader = self.records()?;
        let mut summary = HarvestSummary::default();

        while let Some(page) = reader.read_page()? {
            let documents: Vec<Option<DataCiteDocument>> = page
                .par_iter()
                .map(|record| transformer.transform(record))
                .collect();
            summary.records += page.len();
            for document in documents {
                match document {
                    Some(document) => {
                        summary.documents += 1;
                        sink(document)?;
                    },
                    None => summary.skipped += 1,
                }
            }
        }

        info!(
            records = summary.records,
            documents = summary.documents,
            skipped = summary.skipped,
            pages = reader.pages_read(),
            "Harvest finished"
        );
        Ok(summary)
    }
}
