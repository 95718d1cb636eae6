//! ISO 19139 (`gmd`) record transformation.
//!
//! ISO 19139 is the XML encoding of the ISO 19115 geographic metadata standard
//! (<https://www.iso.org/standard/32557.html>). Its vocabulary does not line up
//! with DataCite one to one, so several fields are approximations:
//!
//! - **Creator**: ISO 19139 has no direct creator; the contact organisation is
//!   used, the same value as the publisher.
//! - **Publication year**: the metadata `dateStamp` is the best available guess
//!   and is overridden by a citation date of type `publication` when present.
//! - **Research data**: only the first online-resource linkage, and only when
//!   it is a valid URL and the record has a title to label it with.
//!
//! Withdrawn records are skipped entirely.

use tracing::{debug, info, warn};

use crate::document::{
    Creator, DataCiteDocument, Date, DateType, Description, DescriptionType, GeoLocation,
    ResearchData, ResourceType, ResourceTypeGeneral, Title,
};
use crate::field_helpers::{element_text, first_text, parse_coordinate, parse_year, validate_url};
use crate::formats::{record_metadata, DeletedRecordPolicy, MetadataStandard, RecordTransformer};
use crate::xml::XmlElement;

/// Repository identifier stamped on documents when none is configured.
pub const DEFAULT_REPOSITORY_IDENTIFIER: &str = "OAI-PMH";

const IDENTIFIER: &str = "gmd:fileIdentifier gco:CharacterString";
const PUBLISHER: &str = "gmd:contact gmd:organisationName gco:CharacterString";
const TITLE: &str = "gmd:identificationInfo gmd:citation gmd:title gco:CharacterString";
const DATESTAMP: &str = "gmd:dateStamp";
const RESOURCE_TYPE: &str = "gmd:hierarchyLevel gmd:MD_ScopeCode";
const RESEARCH_DATA: &str = "gmd:distributionInfo gmd:onLine gmd:linkage gmd:URL";
const DESCRIPTION: &str = "gmd:identificationInfo gmd:abstract gco:CharacterString";

const DATES: &str = "gmd:identificationInfo gmd:citation gmd:CI_Date";
const DATE: &str = "gmd:date";
const DATE_TYPE: &str = "gmd:dateType gmd:CI_DateTypeCode";

const GEOLOCS: &str = "gmd:EX_GeographicBoundingBox";
const GEOLOCS_WEST: &str = "gmd:westBoundLongitude";
const GEOLOCS_EAST: &str = "gmd:eastBoundLongitude";
const GEOLOCS_SOUTH: &str = "gmd:southBoundLatitude";
const GEOLOCS_NORTH: &str = "gmd:northBoundLatitude";

const CODE_LIST_VALUE: &str = "codeListValue";

/// Maps an ISO 19139 `CI_DateTypeCode` to a DataCite date type.
///
/// Codes outside the mapping (e.g. `expiry`, `lastUpdate` in later code lists)
/// carry no agreed DataCite meaning and return `None`.
#[must_use]
pub fn map_date_type(code: &str) -> Option<DateType> {
    match code {
        "creation" => Some(DateType::Created),
        "publication" => Some(DateType::Issued),
        "revision" => Some(DateType::Updated),
        _ => None,
    }
}

/// Transformer for the ISO 19139 dialect.
#[derive(Debug, Clone)]
pub struct Iso19139Transformer {
    repository_identifier: String,
}

impl Iso19139Transformer {
    /// Creates a transformer stamping documents with the given repository identifier.
    pub fn new(repository_identifier: impl Into<String>) -> Self {
        Iso19139Transformer {
            repository_identifier: repository_identifier.into(),
        }
    }

    /// The repository identifier stamped on every document.
    #[must_use]
    pub fn repository_identifier(&self) -> &str {
        &self.repository_identifier
    }
}

impl Default for Iso19139Transformer {
    fn default() -> Self {
        Self::new(DEFAULT_REPOSITORY_IDENTIFIER)
    }
}

impl RecordTransformer for Iso19139Transformer {
    fn schema(&self) -> &'static str {
        MetadataStandard::Iso19139.schema()
    }

    fn deleted_record_policy(&self) -> DeletedRecordPolicy {
        DeletedRecordPolicy::Skip
    }

    fn transform(&self, record: &XmlElement) -> Option<DataCiteDocument> {
        if self.is_deleted(record) {
            debug!("Skipping deleted ISO 19139 record");
            return None;
        }

        let mut doc = DataCiteDocument::new();
        doc.repository_identifier = Some(self.repository_identifier.clone());

        let Some(metadata) = record_metadata(record) else {
            warn!("ISO 19139 record has no metadata element");
            return Some(doc);
        };

        doc.identifier = first_text(metadata, IDENTIFIER);
        if doc.identifier.is_none() {
            warn!("ISO 19139 record has no file identifier");
        }

        // Creator and publisher share the contact organisation
        if let Some(organisation) = first_text(metadata, PUBLISHER) {
            doc.creators.push(Creator::new(organisation.clone()));
            doc.publisher = Some(organisation);
        }
        if let Some(title) = first_text(metadata, TITLE) {
            doc.titles.push(Title::new(title));
        }

        extract_datestamp_year(metadata, &mut doc);
        extract_resource_type(metadata, &mut doc);
        extract_research_data(metadata, &mut doc);
        extract_dates(metadata, &mut doc);

        if let Some(description) = first_text(metadata, DESCRIPTION) {
            doc.descriptions
                .push(Description::new(description, DescriptionType::Abstract));
        }

        doc.geo_locations = parse_geo_locations(metadata, doc.identifier.as_deref());

        Some(doc)
    }
}

fn extract_datestamp_year(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    let Some(datestamp) = first_text(metadata, DATESTAMP) else {
        return;
    };
    match parse_year(&datestamp) {
        Some(year) => doc.publication_year = Some(year),
        None => warn!(
            identifier = ?doc.identifier,
            datestamp = %datestamp,
            "Datestamp does not seem to be a date"
        ),
    }
}

fn extract_resource_type(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    let Some(scope) = metadata.select_first(RESOURCE_TYPE) else {
        return;
    };
    let label = element_text(scope).or_else(|| {
        scope
            .attr(CODE_LIST_VALUE)
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string())
    });
    if let Some(value) = label {
        doc.resource_type = Some(ResourceType {
            value,
            general_type: ResourceTypeGeneral::Dataset,
        });
    }
}

fn extract_research_data(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    let Some(candidate) = first_text(metadata, RESEARCH_DATA) else {
        return;
    };
    if let Err(e) = validate_url(&candidate) {
        warn!(identifier = ?doc.identifier, url = %candidate, error = %e, "URL is not valid, skipping");
        return;
    }
    match doc.titles.first() {
        Some(title) => doc.research_data.push(ResearchData {
            url: candidate,
            title: title.value.clone(),
        }),
        None => debug!(
            identifier = ?doc.identifier,
            url = %candidate,
            "Research data link has no title to label it, skipping"
        ),
    }
}

/// Collects citation dates with a mapped type; an Issued date overrides the
/// publication year derived from the datestamp.
fn extract_dates(metadata: &XmlElement, doc: &mut DataCiteDocument) {
    for iso_date in metadata.select(DATES) {
        let code = iso_date.select_first(DATE_TYPE).and_then(|code| {
            code.attr(CODE_LIST_VALUE)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| element_text(code))
        });
        let Some(date_type) = code.as_deref().and_then(map_date_type) else {
            continue;
        };
        let Some(value) = first_text(iso_date, DATE) else {
            debug!(identifier = ?doc.identifier, "Citation date without a value");
            continue;
        };
        doc.dates.push(Date::new(value, date_type));
    }

    let Some(issued) = doc.date_of_type(DateType::Issued).map(|d| d.value.clone()) else {
        return;
    };
    match parse_year(&issued) {
        Some(year) => doc.publication_year = Some(year),
        None => warn!(
            identifier = ?doc.identifier,
            date = %issued,
            "Publication date does not seem to be a date, keeping datestamp year"
        ),
    }
}

/// Parses bounding boxes in document order, skipping any block with a
/// missing or non-numeric edge.
fn parse_geo_locations(metadata: &XmlElement, identifier: Option<&str>) -> Vec<GeoLocation> {
    let mut locations = Vec::new();
    for block in metadata.select(GEOLOCS) {
        let edge = |selector: &str| -> std::result::Result<f64, String> {
            let text = block
                .select_first(selector)
                .and_then(element_text)
                .ok_or_else(|| format!("{selector} is missing"))?;
            parse_coordinate(&text)
        };
        let bounds = edge(GEOLOCS_WEST).and_then(|west| {
            Ok((west, edge(GEOLOCS_EAST)?, edge(GEOLOCS_SOUTH)?, edge(GEOLOCS_NORTH)?))
        });
        match bounds {
            Ok((west, east, south, north)) => {
                locations.push(GeoLocation::from_bounds(west, east, south, north));
            },
            Err(reason) => info!(
                identifier = identifier.unwrap_or("<unknown>"),
                geolocation = %block.text(),
                reason = %reason,
                "Ignoring geolocation without valid coordinates"
            ),
        }
    }
    locations
}
