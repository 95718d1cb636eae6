//! Deserialization of OAI-PMH response envelopes.
//!
//! Only the small, fixed-shape verbs (`ListMetadataFormats`, `Identify`) and
//! protocol errors are deserialized here. `ListRecords` payloads are parsed into
//! [`XmlElement`](crate::xml::XmlElement) trees by the
//! [`reader`](crate::reader) module because record metadata is open-ended.

use lazy_static::lazy_static;
use quick_xml::de::from_str as xml_from_str;
use regex::Regex;
use serde::Deserialize;

use crate::error::{HarvestError, Result};

/// OAI-PMH error code for an empty result set, which is not a failure.
pub const NO_RECORDS_MATCH: &str = "noRecordsMatch";

lazy_static! {
    static ref XMLNS_DECLARATION: Regex = Regex::new(r#"\s+xmlns(?::[\w.-]+)?\s*=\s*"[^"]*""#)
        .expect("valid xmlns pattern");
    static ref ELEMENT_PREFIX: Regex =
        Regex::new(r"<(/?)[\w.-]+:").expect("valid element prefix pattern");
}

/// Strip XML namespace prefixes and declarations.
///
/// Handles both `oai:ListMetadataFormats` → `ListMetadataFormats` (prefixed
/// namespace) and `xmlns="..."` / `xmlns:oai="..."` (namespace declarations).
pub(crate) fn strip_namespaces(xml: &str) -> String {
    let stripped = XMLNS_DECLARATION.replace_all(xml, "");
    ELEMENT_PREFIX.replace_all(&stripped, "<$1").into_owned()
}

/// A protocol-level error reported by the repository.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseError {
    #[serde(rename = "@code", default)]
    pub code: String,
    #[serde(rename = "$text", default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetadataFormat {
    #[serde(rename = "metadataPrefix", default)]
    pub prefix: String,
    #[serde(rename = "metadataNamespace", default)]
    pub namespace: String,
    #[serde(default)]
    pub schema: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListMetadataFormats {
    #[serde(rename = "metadataFormat", default)]
    pub formats: Vec<MetadataFormat>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Identify {
    #[serde(rename = "repositoryName", default)]
    pub repository_name: String,
}

/// The `<OAI-PMH>` root element, reduced to the parts the harvester reads.
#[derive(Debug, Deserialize)]
pub(crate) struct OaiPmhResponse {
    #[serde(default)]
    pub error: Vec<ResponseError>,
    #[serde(rename = "ListMetadataFormats")]
    pub list_metadata_formats: Option<ListMetadataFormats>,
    #[serde(rename = "Identify")]
    pub identify: Option<Identify>,
}

impl OaiPmhResponse {
    /// Parses a response body, turning a reported protocol error into `Err`.
    pub(crate) fn parse(xml: &str) -> Result<Self> {
        let response: OaiPmhResponse = xml_from_str(&strip_namespaces(xml))?;
        match response.error.first() {
            Some(error) => Err(HarvestError::OaiPmh {
                code: error.code.clone(),
                message: error.message.trim().to_string(),
            }),
            None => Ok(response),
        }
    }
}
