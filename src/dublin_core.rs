//! Dublin Core (`oai_dc`) record transformation.
//!
//! This module converts OAI-PMH records in the simple Dublin Core dialect into
//! DataCite-shaped documents. The Dublin Core Metadata Element Set maps as
//! follows:
//!
//! | OAI-PMH / Dublin Core | Document field |
//! |----------------------|----------------|
//! | `header/identifier` | identifier |
//! | `header/datestamp` | date (Updated) |
//! | first `dc:date` | date (Available), publication year |
//! | `dc:type` | formats |
//! | `dc:creator` | creators |
//! | `dc:contributor` | contributors (ContactPerson) |
//! | `dc:title` | titles |
//! | `dc:description` | descriptions (Abstract) |
//! | `dc:identifier` | web links (ViewURL) |
//! | `dc:subject` | subjects |
//! | `dc:publisher` | publisher |
//! | `dc:language` | language |
//! | `DOI` | related identifiers (IsReferencedBy) |
//!
//! Withdrawn records are kept as tombstones: identifier, datestamp and the
//! deleted marker.
//!
//! # Examples
//!
//! ```ignore
//! use oai_harvest::dublin_core::DublinCoreTransformer;
//! use oai_harvest::formats::RecordTransformer;
//! use oai_harvest::xml::XmlElement;
//!
//! let record = XmlElement::parse(xml)?;
//! let doc = DublinCoreTransformer::new().transform(&record).expect("never skips");
//! println!("Titles: {:?}", doc.titles);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use chrono::Datelike;
use tracing::{debug, warn};

use crate::document::{
    Contributor, ContributorType, Creator, DataCiteDocument, Date, DateType, Description,
    DescriptionType, RelatedIdentifier, RelatedIdentifierType, RelationType, Subject, Title,
    WebLink, WebLinkType,
};
use crate::field_helpers::{all_texts, first_text, parse_leading_date};
use crate::formats::{
    header_text, record_metadata, DeletedRecordPolicy, MetadataStandard, RecordTransformer,
};
use crate::xml::XmlElement;

const HEADER_IDENTIFIER: &str = "identifier";
const HEADER_DATESTAMP: &str = "datestamp";

const DC_DATE: &str = "dc:date";
const DC_TYPE: &str = "dc:type";
const DC_CREATOR: &str = "dc:creator";
const DC_CONTRIBUTOR: &str = "dc:contributor";
const DC_TITLE: &str = "dc:title";
const DC_DESCRIPTION: &str = "dc:description";
const DC_IDENTIFIER: &str = "dc:identifier";
const DC_SUBJECT: &str = "dc:subject";
const DC_PUBLISHER: &str = "dc:publisher";
const DC_LANGUAGE: &str = "dc:language";
const DOI_REFERENCE: &str = "DOI";

/// Transformer for the `oai_dc` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct DublinCoreTransformer;

impl DublinCoreTransformer {
    /// Creates the transformer.
    #[must_use]
    pub fn new() -> Self {
        DublinCoreTransformer
    }
}

impl RecordTransformer for DublinCoreTransformer {
    fn schema(&self) -> &'static str {
        MetadataStandard::DublinCore.schema()
    }

    fn deleted_record_policy(&self) -> DeletedRecordPolicy {
        DeletedRecordPolicy::Tombstone
    }

    fn transform(&self, record: &XmlElement) -> Option<DataCiteDocument> {
        let identifier = header_text(record, HEADER_IDENTIFIER);
        let datestamp = header_text(record, HEADER_DATESTAMP);

        if identifier.is_none() {
            warn!("Dublin Core record has no header identifier");
        }
        if datestamp.is_none() {
            debug!(identifier = ?identifier, "Dublin Core record has no datestamp");
        }

        if self.is_deleted(record) {
            return Some(DataCiteDocument::tombstone(identifier, datestamp));
        }

        let mut doc = DataCiteDocument::new();
        doc.identifier = identifier;
        if let Some(datestamp) = datestamp {
            doc.dates.push(Date::new(datestamp, DateType::Updated));
        }

        let Some(metadata) = record_metadata(record) else {
            warn!(identifier = ?doc.identifier, "Dublin Core record has no metadata element");
            return Some(doc);
        };

        extract_publication_date(metadata, &mut doc);
        extract_formats(metadata, &mut doc);
        extract_creators(metadata, &mut doc);
        extract_contributors(metadata, &mut doc);
        extract_titles(metadata, &mut doc);
        extract_descriptions(metadata, &mut doc);
        extract_web_links(metadata, &mut doc);
        extract_subjects(metadata, &mut doc);
        extract_publisher_and_language(metadata, &mut doc);
        extract_doi_references(metadata, &mut doc);

        Some(doc)
    }
}

fn extract_publication_date(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    let Some(value) = first_text(metadata, DC_DATE) else {
        return;
    };
    match parse_leading_date(&value) {
        Some(date) => {
            doc.publication_year = Some(date.year());
            doc.dates.push(Date::new(value, DateType::Available));
        },
        None => {
            debug!(identifier = ?doc.identifier, date = %value, "Ignoring dc:date that is not YYYY-MM-DD");
        },
    }
}

fn extract_formats(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    doc.formats.extend(all_texts(metadata, DC_TYPE));
}

fn extract_creators(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    doc.creators
        .extend(all_texts(metadata, DC_CREATOR).into_iter().map(Creator::new));
}

fn extract_contributors(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    for name in all_texts(metadata, DC_CONTRIBUTOR) {
        doc.contributors.push(Contributor {
            name,
            contributor_type: ContributorType::ContactPerson,
        });
    }
}

fn extract_titles(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    doc.titles
        .extend(all_texts(metadata, DC_TITLE).into_iter().map(Title::new));
}

fn extract_descriptions(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    for text in all_texts(metadata, DC_DESCRIPTION) {
        doc.descriptions
            .push(Description::new(text, DescriptionType::Abstract));
    }
}

fn extract_web_links(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    let identifiers = all_texts(metadata, DC_IDENTIFIER);
    let count = identifiers.len();
    // Numbered from the total count downwards
    for (index, url) in identifiers.into_iter().enumerate() {
        doc.web_links.push(WebLink {
            url,
            name: format!("Identifier{}", count - index),
            link_type: WebLinkType::ViewURL,
        });
    }
}

fn extract_subjects(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    for value in all_texts(metadata, DC_SUBJECT) {
        doc.subjects.push(Subject { value });
    }
}

fn extract_publisher_and_language(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    doc.publisher = first_text(metadata, DC_PUBLISHER);
    doc.language = first_text(metadata, DC_LANGUAGE);
}

fn extract_doi_references(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    for value in all_texts(metadata, DOI_REFERENCE) {
        doc.related_identifiers.push(RelatedIdentifier {
            value,
            identifier_type: RelatedIdentifierType::DOI,
            relation_type: RelationType::IsReferencedBy,
        });
    }
}
