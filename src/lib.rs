#![warn(missing_docs)]

//! # oai-harvest: OAI-PMH metadata harvesting
//!
//! A library for harvesting dataset metadata from OAI-PMH repositories that
//! serve records in several XML dialects, and turning each record into a
//! DataCite-shaped [`DataCiteDocument`].
//!
//! The crate solves two problems:
//!
//! - **Negotiation.** A repository advertises metadata prefixes mapped to
//!   schema identifiers. The [`TransformerDispatcher`] binds the prefix an
//!   operator asked for to a locally supported [`RecordTransformer`], and
//!   rebinds whenever the repository address or the prefix changes.
//! - **Transformation.** Each dialect transformer extracts fields from a raw
//!   record independently, so a malformed field is dropped and logged without
//!   losing the record.
//!
//! ## Quick Start
//!
//! ```no_run
//! use oai_harvest::{FormatCatalog, HarvestParameters, HttpFetcher, OaiPmhHarvester};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let parameters = HarvestParameters::new()
//!     .with_host_url("https://ws.pangaea.de/oai/provider")
//!     .with_metadata_prefix("iso19139")
//!     .with_from("2018-01-01");
//! let harvester =
//!     OaiPmhHarvester::with_parameters(FormatCatalog::new(), HttpFetcher::new()?, &parameters)?;
//!
//! harvester.harvest(|document| {
//!     println!("{:?}", document.identifier);
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Transforming a single record
//!
//! ```
//! use oai_harvest::{DublinCoreTransformer, RecordTransformer, XmlElement};
//!
//! let record = XmlElement::parse(
//!     r#"<record>
//!          <header><identifier>oai:figshare.com:article/1</identifier>
//!                  <datestamp>2018-01-10T00:00:00Z</datestamp></header>
//!          <metadata><oai_dc:dc><dc:title>Ocean temperatures</dc:title></oai_dc:dc></metadata>
//!        </record>"#,
//! )?;
//! let document = DublinCoreTransformer::new().transform(&record).expect("document");
//! assert_eq!(document.titles[0].value, "Ocean temperatures");
//! # Ok::<(), oai_harvest::HarvestError>(())
//! ```
//!
//! ## Modules
//!
//! - [`formats`] — Supported metadata standards and the transformer catalog
//! - [`resolver`] — Discovery of a repository's advertised formats
//! - [`dispatcher`] — Binding of the transformer for the configured prefix
//! - [`iso19139`] — ISO 19139 (`gmd`) record transformer
//! - [`dublin_core`] — Dublin Core (`oai_dc`) record transformer
//! - [`document`] — The DataCite-shaped output document
//! - [`xml`] — Owned XML element trees with descendant selectors
//! - [`reader`] — Paged `ListRecords` record source
//! - [`harvester`] — Parameters, negotiation and transformation wired together
//! - [`error`] — Error types and result type

pub mod config;
pub mod dispatcher;
pub mod document;
pub mod dublin_core;
pub mod error;
pub mod fetch;
pub mod field_helpers;
/// Metadata standards and the catalog of record transformers.
///
/// See the [`formats`] module documentation for how to register additional
/// standards.
pub mod formats;
pub mod harvester;
pub mod iso19139;
pub mod query;
pub mod reader;
pub mod repository;
pub mod resolver;
mod response;
pub mod xml;

pub use config::{HarvestParameters, ParameterKey};
pub use dispatcher::{DispatchState, TransformerDispatcher};
pub use document::DataCiteDocument;
pub use dublin_core::DublinCoreTransformer;
pub use error::{ConfigurationError, HarvestError, Result};
pub use fetch::Fetch;
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use formats::{
    DeletedRecordPolicy, FormatCatalog, MetadataStandard, RecordTransformer, TransformerFactory,
};
pub use harvester::{HarvestSummary, OaiPmhHarvester};
pub use iso19139::Iso19139Transformer;
pub use query::OaiPmhQuery;
pub use reader::{ListRecordsReader, RecordSource};
pub use repository::repository_name;
pub use resolver::{RemoteFormatResolver, UsableFormatMap};
pub use xml::XmlElement;
