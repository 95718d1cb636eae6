//! The table of locally supported metadata standards.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::traits::RecordTransformer;
use super::MetadataStandard;
use crate::dublin_core::DublinCoreTransformer;
use crate::iso19139::{Iso19139Transformer, DEFAULT_REPOSITORY_IDENTIFIER};

/// Zero-argument constructor of a fresh transformer.
pub type TransformerFactory = Arc<dyn Fn() -> Arc<dyn RecordTransformer> + Send + Sync>;

/// Maps schema identifiers to transformer factories.
///
/// The catalog is immutable once handed to a
/// [`TransformerDispatcher`](crate::dispatcher::TransformerDispatcher); build it
/// completely first, registering any custom standards.
///
/// # Examples
///
/// ```
/// use oai_harvest::formats::FormatCatalog;
///
/// let catalog = FormatCatalog::with_repository_identifier("PANGAEA");
/// assert!(catalog.supports("http://www.isotc211.org/2005/gmd"));
/// ```
#[derive(Clone)]
pub struct FormatCatalog {
    factories: IndexMap<String, TransformerFactory>,
}

impl FormatCatalog {
    /// Catalog with all built-in standards and the default repository identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_repository_identifier(DEFAULT_REPOSITORY_IDENTIFIER)
    }

    /// Catalog with all built-in standards; ISO 19139 documents are stamped with
    /// the given repository identifier.
    #[must_use]
    pub fn with_repository_identifier(repository_identifier: impl Into<String>) -> Self {
        let repository_identifier: Arc<str> = Arc::from(repository_identifier.into());
        let mut catalog = Self::empty();
        for standard in MetadataStandard::ALL {
            let factory: TransformerFactory = match standard {
                MetadataStandard::DublinCore => {
                    Arc::new(|| Arc::new(DublinCoreTransformer::new()) as Arc<dyn RecordTransformer>)
                },
                MetadataStandard::Iso19139 => {
                    let id = Arc::clone(&repository_identifier);
                    Arc::new(move || {
                        Arc::new(Iso19139Transformer::new(id.as_ref())) as Arc<dyn RecordTransformer>
                    })
                },
            };
            catalog.factories.insert(standard.schema().to_string(), factory);
        }
        catalog
    }

    /// Catalog without any standard.
    #[must_use]
    pub fn empty() -> Self {
        FormatCatalog {
            factories: IndexMap::new(),
        }
    }

    /// Registers a factory for a schema, replacing any previous one.
    pub fn register<F>(&mut self, schema: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn RecordTransformer> + Send + Sync + 'static,
    {
        self.factories.insert(schema.into(), Arc::new(factory));
    }

    /// Returns true if a transformer exists for the schema.
    #[must_use]
    pub fn supports(&self, schema: &str) -> bool {
        self.factories.contains_key(schema)
    }

    /// Constructs a fresh transformer for the schema.
    #[must_use]
    pub fn create(&self, schema: &str) -> Option<Arc<dyn RecordTransformer>> {
        self.factories.get(schema).map(|factory| factory())
    }

    /// Supported schema identifiers, in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of supported schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no schema is supported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatCatalog")
            .field("schemas", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
