//! Binding of the record transformer that matches the operator's prefix.
//!
//! The [`TransformerDispatcher`] holds the usable format map of the current
//! repository and at most one bound transformer. Both live in a single
//! immutable [`DispatchState`] snapshot behind a `RwLock`, so readers always see
//! a transformer together with the map it was bound against. Reconfiguration
//! builds the next snapshot off to the side and swaps it in with one write.
//!
//! # Binding checks
//!
//! Binding a prefix runs these checks in order; the first failure wins:
//!
//! 1. [`EmptyPrefix`](ConfigurationError::EmptyPrefix)
//! 2. [`NoRepositoryFormats`](ConfigurationError::NoRepositoryFormats)
//! 3. [`PrefixNotAdvertisedByRepository`](ConfigurationError::PrefixNotAdvertisedByRepository)
//! 4. [`SchemaNotSupportedLocally`](ConfigurationError::SchemaNotSupportedLocally)
//!
//! # Failed binds
//!
//! A rejected [`set_prefix`](TransformerDispatcher::set_prefix) keeps the
//! previous prefix and transformer. A rejected rebind after
//! [`set_repository_address`](TransformerDispatcher::set_repository_address)
//! clears the transformer, because it was bound against another repository.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::document::DataCiteDocument;
use crate::error::ConfigurationError;
use crate::fetch::Fetch;
use crate::formats::{FormatCatalog, RecordTransformer};
use crate::resolver::{RemoteFormatResolver, UsableFormatMap};
use crate::xml::XmlElement;

/// One consistent view of the dispatcher's configuration.
#[derive(Debug, Default, Clone)]
pub struct DispatchState {
    host_url: Option<String>,
    prefix: Option<String>,
    formats: UsableFormatMap,
    transformer: Option<Arc<dyn RecordTransformer>>,
}

impl DispatchState {
    /// Repository address the format map was resolved from.
    #[must_use]
    pub fn host_url(&self) -> Option<&str> {
        self.host_url.as_deref()
    }

    /// Prefix of the last successful bind, kept across address changes.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Advertised formats of the current repository.
    #[must_use]
    pub fn formats(&self) -> &UsableFormatMap {
        &self.formats
    }

    /// The bound transformer, if any.
    #[must_use]
    pub fn transformer(&self) -> Option<&Arc<dyn RecordTransformer>> {
        self.transformer.as_ref()
    }
}

/// Selects and holds the record transformer for the configured repository and prefix.
///
/// # Examples
///
/// ```no_run
/// use oai_harvest::{FormatCatalog, HttpFetcher, TransformerDispatcher};
///
/// let dispatcher = TransformerDispatcher::new(FormatCatalog::new(), HttpFetcher::new()?);
/// if let Err(e) = dispatcher.set_repository_address("https://api.figshare.com/v2/oai") {
///     eprintln!("{e}");
/// }
/// match dispatcher.set_prefix("oai_dc") {
///     Ok(transformer) => println!("bound {}", transformer.schema()),
///     Err(e) => eprintln!("{e}"),
/// }
/// # Ok::<(), oai_harvest::HarvestError>(())
/// ```
#[derive(Debug)]
pub struct TransformerDispatcher<F> {
    catalog: FormatCatalog,
    resolver: RemoteFormatResolver<F>,
    state: RwLock<Arc<DispatchState>>,
    reconfigure: Mutex<()>,
}

impl<F: Fetch> TransformerDispatcher<F> {
    /// Creates an unconfigured dispatcher.
    pub fn new(catalog: FormatCatalog, fetcher: F) -> Self {
        TransformerDispatcher {
            catalog,
            resolver: RemoteFormatResolver::new(fetcher),
            state: RwLock::new(Arc::new(DispatchState::default())),
            reconfigure: Mutex::new(()),
        }
    }

    /// The catalog of locally supported standards.
    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    /// The resolver used on address changes.
    pub fn resolver(&self) -> &RemoteFormatResolver<F> {
        &self.resolver
    }

    /// Current configuration snapshot.
    pub fn state(&self) -> Arc<DispatchState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Advertised formats of the current repository.
    pub fn usable_formats(&self) -> UsableFormatMap {
        self.state().formats.clone()
    }

    /// Prefixes an operator may choose from, in advertisement order.
    pub fn allowed_prefixes(&self) -> Vec<String> {
        self.state().formats.usable_prefixes(&self.catalog)
    }

    /// Points the dispatcher at a new repository and rebinds the current prefix.
    ///
    /// The format map is resolved afresh; a resolution failure leaves it empty.
    ///
    /// # Errors
    ///
    /// Returns the binding failure, in which case no transformer is bound.
    pub fn set_repository_address(
        &self,
        host_url: &str,
    ) -> Result<Arc<dyn RecordTransformer>, ConfigurationError> {
        let _guard = self.reconfigure.lock().unwrap_or_else(PoisonError::into_inner);
        let formats = self.resolver.resolve(host_url);
        let prefix = self.state().prefix.clone();

        let bound = bind(&self.catalog, &formats, prefix.as_deref());
        self.publish(DispatchState {
            host_url: Some(host_url.to_string()),
            prefix,
            formats,
            transformer: bound.as_ref().ok().cloned(),
        });
        if let Err(e) = &bound {
            debug!(host_url, error = %e, "No transformer bound after address change");
        }
        bound
    }

    /// Binds the transformer for `prefix` against the current format map.
    ///
    /// # Errors
    ///
    /// Returns the first failing binding check. The previous prefix and
    /// transformer stay in place.
    pub fn set_prefix(&self, prefix: &str) -> Result<Arc<dyn RecordTransformer>, ConfigurationError> {
        let _guard = self.reconfigure.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.state();

        match bind(&self.catalog, &current.formats, Some(prefix)) {
            Ok(transformer) => {
                self.publish(DispatchState {
                    host_url: current.host_url.clone(),
                    prefix: Some(prefix.trim().to_string()),
                    formats: current.formats.clone(),
                    transformer: Some(Arc::clone(&transformer)),
                });
                Ok(transformer)
            },
            Err(e) => {
                warn!(prefix, error = %e, "Rejected metadata prefix");
                Err(e)
            },
        }
    }

    /// The bound transformer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoTransformerBound`] before a successful bind.
    pub fn current_transformer(&self) -> Result<Arc<dyn RecordTransformer>, ConfigurationError> {
        self.state()
            .transformer
            .clone()
            .ok_or(ConfigurationError::NoTransformerBound)
    }

    /// Transforms one record with the bound transformer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoTransformerBound`] before a successful bind.
    pub fn transform(
        &self,
        record: &XmlElement,
    ) -> Result<Option<DataCiteDocument>, ConfigurationError> {
        Ok(self.current_transformer()?.transform(record))
    }

    fn publish(&self, next: DispatchState) {
        if let Some(transformer) = &next.transformer {
            info!(
                prefix = next.prefix.as_deref().unwrap_or_default(),
                schema = transformer.schema(),
                "Bound record transformer"
            );
        }
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
    }
}

/// Runs the ordered binding checks and instantiates the matching transformer.
///
/// # Errors
///
/// Returns the first failing check, listing the usable prefixes of `formats`.
pub fn bind(
    catalog: &FormatCatalog,
    formats: &UsableFormatMap,
    prefix: Option<&str>,
) -> Result<Arc<dyn RecordTransformer>, ConfigurationError> {
    let allowed = || formats.usable_prefixes(catalog);

    let prefix = match prefix.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ConfigurationError::EmptyPrefix { allowed: allowed() }),
    };
    if formats.is_empty() {
        return Err(ConfigurationError::NoRepositoryFormats);
    }
    let Some(schema) = formats.schema(prefix) else {
        return Err(ConfigurationError::PrefixNotAdvertisedByRepository {
            prefix: prefix.to_string(),
            allowed: allowed(),
        });
    };
    catalog
        .create(schema)
        .ok_or_else(|| ConfigurationError::SchemaNotSupportedLocally {
            prefix: prefix.to_string(),
            schema: schema.to_string(),
            allowed: allowed(),
        })
}
