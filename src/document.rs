//! DataCite-shaped output documents.
//!
//! Every record transformer produces a [`DataCiteDocument`]: a flat bag of
//! optional, typed fields modelled on the DataCite metadata kernel plus a few
//! harvesting extensions (web links, research data, deleted marker).
//!
//! Documents serialize to JSON with camelCase keys; unset fields and empty lists
//! are omitted, so partial documents stay compact.
//!
//! ```
//! use oai_harvest::document::{DataCiteDocument, Date, DateType};
//!
//! let mut doc = DataCiteDocument::new();
//! doc.identifier = Some("oai:example.org:1".into());
//! doc.dates.push(Date::new("2017-11-01", DateType::Updated));
//! let json = serde_json::to_string(&doc)?;
//! assert_eq!(
//!     json,
//!     r#"{"identifier":"oai:example.org:1","dates":[{"value":"2017-11-01","type":"Updated"}]}"#
//! );
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::{Deserialize, Serialize};

/// A normalized metadata record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCiteDocument {
    /// Persistent identifier of the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Identifier of the repository the record was harvested from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_identifier: Option<String>,
    /// Creators, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<Creator>,
    /// Titles, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<Title>,
    /// Publishing entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Year of publication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    /// Type of the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    /// Typed dates, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<Date>,
    /// Descriptions, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<Description>,
    /// Geographic coverage, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geo_locations: Vec<GeoLocation>,
    /// Links to the data described by the record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub research_data: Vec<ResearchData>,
    /// Links to landing pages and similar views.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_links: Vec<WebLink>,
    /// Identifiers of related resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_identifiers: Vec<RelatedIdentifier>,
    /// Subject keywords.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<Subject>,
    /// Contributors, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Contributor>,
    /// Format labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<String>,
    /// Primary language of the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Set when the source record was withdrawn by the repository.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl DataCiteDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the tombstone of a withdrawn record: identifier, last update and
    /// the deleted marker, nothing else.
    #[must_use]
    pub fn tombstone(identifier: Option<String>, updated: Option<String>) -> Self {
        DataCiteDocument {
            identifier,
            dates: updated
                .into_iter()
                .map(|value| Date::new(value, DateType::Updated))
                .collect(),
            deleted: true,
            ..Self::default()
        }
    }

    /// Returns true if the source record was withdrawn.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// First date of the given type.
    #[must_use]
    pub fn date_of_type(&self, date_type: DateType) -> Option<&Date> {
        self.dates.iter().find(|d| d.date_type == date_type)
    }
}

/// A creator name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Personal or organisational name.
    pub name: String,
}

impl Creator {
    /// Creates a creator.
    pub fn new(name: impl Into<String>) -> Self {
        Creator { name: name.into() }
    }
}

/// A title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    /// Title text.
    pub value: String,
}

impl Title {
    /// Creates a title.
    pub fn new(value: impl Into<String>) -> Self {
        Title {
            value: value.into(),
        }
    }
}

/// Coarse resource category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceTypeGeneral {
    /// Data encoded in a defined structure.
    Dataset,
}

/// Free-text resource type plus its general category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    /// Repository-supplied label.
    pub value: String,
    /// General category.
    pub general_type: ResourceTypeGeneral,
}

/// Semantic type of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateType {
    /// Date of creation of the resource.
    Created,
    /// Date of formal issuance.
    Issued,
    /// Date of the last update.
    Updated,
    /// Date the resource was made publicly available.
    Available,
}

/// A date together with its semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Date {
    /// Date as written by the repository.
    pub value: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub date_type: DateType,
}

impl Date {
    /// Creates a typed date.
    pub fn new(value: impl Into<String>, date_type: DateType) -> Self {
        Date {
            value: value.into(),
            date_type,
        }
    }
}

/// Category of a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptionType {
    /// A brief summary.
    Abstract,
}

/// A description text with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    /// Description text.
    pub value: String,
    /// Category.
    #[serde(rename = "type")]
    pub description_type: DescriptionType,
}

impl Description {
    /// Creates a description.
    pub fn new(value: impl Into<String>, description_type: DescriptionType) -> Self {
        Description {
            value: value.into(),
            description_type,
        }
    }
}

/// A geographic location, either a point or a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeoLocation {
    /// A single position.
    Point {
        /// Longitude.
        longitude: f64,
        /// Latitude.
        latitude: f64,
    },
    /// A rectangle given by its four edges.
    Box {
        /// Western longitude.
        west: f64,
        /// Eastern longitude.
        east: f64,
        /// Southern latitude.
        south: f64,
        /// Northern latitude.
        north: f64,
    },
}

impl GeoLocation {
    /// Builds a location from four bounding edges, collapsing a degenerate box
    /// (`west == east` and `south == north`) into a point at `(west, south)`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_bounds(west: f64, east: f64, south: f64, north: f64) -> Self {
        if west == east && south == north {
            GeoLocation::Point {
                longitude: west,
                latitude: south,
            }
        } else {
            GeoLocation::Box {
                west,
                east,
                south,
                north,
            }
        }
    }
}

/// A link to the data a record describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchData {
    /// Validated URL.
    pub url: String,
    /// Human-readable label.
    pub title: String,
}

/// Kind of a web link.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebLinkType {
    /// A page where the resource can be viewed.
    ViewURL,
}

/// A named link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebLink {
    /// Link target.
    pub url: String,
    /// Display name.
    pub name: String,
    /// Kind of link.
    #[serde(rename = "type")]
    pub link_type: WebLinkType,
}

/// Kind of a related identifier.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelatedIdentifierType {
    /// Digital Object Identifier.
    DOI,
}

/// Relation between the record and the related resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationType {
    /// The record is referenced by the related resource.
    IsReferencedBy,
}

/// Identifier of a related resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedIdentifier {
    /// Identifier value.
    pub value: String,
    /// Identifier scheme.
    pub identifier_type: RelatedIdentifierType,
    /// Relation to the record.
    pub relation_type: RelationType,
}

/// A subject keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Keyword text.
    pub value: String,
}

/// Role of a contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributorType {
    /// Person to contact about the resource.
    ContactPerson,
}

/// A contributor name with its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// Personal or organisational name.
    pub name: String,
    /// Role.
    pub contributor_type: ContributorType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_from_degenerate_bounds() {
        assert_eq!(
            GeoLocation::from_bounds(10.0, 10.0, 20.0, 20.0),
            GeoLocation::Point {
                longitude: 10.0,
                latitude: 20.0
            }
        );
    }

    #[test]
    fn test_box_from_bounds() {
        assert_eq!(
            GeoLocation::from_bounds(10.0, 20.0, 30.0, 40.0),
            GeoLocation::Box {
                west: 10.0,
                east: 20.0,
                south: 30.0,
                north: 40.0
            }
        );
    }

    #[test]
    fn test_line_is_a_box() {
        // Only one axis collapsed: still a box
        assert!(matches!(
            GeoLocation::from_bounds(10.0, 10.0, 30.0, 40.0),
            GeoLocation::Box { .. }
        ));
    }

    #[test]
    fn test_tombstone_has_only_identifier_date_and_marker() {
        let doc = DataCiteDocument::tombstone(Some("id".into()), Some("2020-01-01".into()));
        let expected = DataCiteDocument {
            identifier: Some("id".into()),
            dates: vec![Date::new("2020-01-01", DateType::Updated)],
            deleted: true,
            ..DataCiteDocument::default()
        };
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let mut doc = DataCiteDocument::new();
        doc.identifier = Some("id".into());
        doc.publication_year = Some(2012);
        let json = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(json, serde_json::json!({"identifier": "id", "publicationYear": 2012}));
    }

    #[test]
    fn test_json_keeps_deleted_marker() {
        let doc = DataCiteDocument::tombstone(Some("id".into()), None);
        let json = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(json["deleted"], serde_json::json!(true));
    }
}
