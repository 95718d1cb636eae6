//! The record transformer capability.
//!
//! A transformer turns one raw OAI-PMH `<record>` element into one
//! [`DataCiteDocument`], or skips it.
//!
//! # Implementation Notes
//!
//! Implementations should:
//! - Test the deleted marker on the record header first and honour their
//!   [`DeletedRecordPolicy`]
//! - Extract every field independently; a missing or malformed field is
//!   omitted and logged, it never aborts the record
//! - Always return a document for a non-deleted record, even one without an
//!   identifier
//! - Keep no state between calls besides immutable configuration

use std::fmt::Debug;

use crate::document::DataCiteDocument;
use crate::field_helpers::element_text;
use crate::xml::XmlElement;

/// Attribute of the OAI-PMH `<header>` that marks withdrawn records.
pub(crate) const RECORD_STATUS: &str = "status";

/// Value of [`RECORD_STATUS`] for withdrawn records.
pub(crate) const RECORD_STATUS_DELETED: &str = "deleted";

/// The OAI-PMH `<header>` of a record.
///
/// Envelope elements are matched by local name, so `<header>` and
/// `<oai:header>` are the same element.
#[must_use]
pub fn record_header(record: &XmlElement) -> Option<&XmlElement> {
    record.child_local("header")
}

/// The OAI-PMH `<metadata>` payload wrapper of a record, matched by local name.
#[must_use]
pub fn record_metadata(record: &XmlElement) -> Option<&XmlElement> {
    record.child_local("metadata")
}

/// Text of a header field such as `identifier` or `datestamp`.
pub(crate) fn header_text(record: &XmlElement, local_name: &str) -> Option<String> {
    record_header(record)?
        .child_local(local_name)
        .and_then(element_text)
}

/// What a transformer emits for a record the repository marks as deleted.
///
/// Dialects disagree here on purpose: Dublin Core harvests keep withdrawn
/// records as tombstones so downstream indexes can remove them, while ISO 19139
/// harvests simply drop them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedRecordPolicy {
    /// Emit a document with identifier, Updated date and the deleted marker.
    Tombstone,
    /// Emit nothing.
    Skip,
}

/// Converts raw records of one metadata standard into documents.
///
/// Transformers are shared between threads once bound, so implementations must
/// be `Send + Sync` and must not mutate themselves in [`transform`](Self::transform).
pub trait RecordTransformer: Debug + Send + Sync {
    /// Schema identifier of the standard this transformer handles.
    fn schema(&self) -> &'static str;

    /// How withdrawn records are handled.
    fn deleted_record_policy(&self) -> DeletedRecordPolicy;

    /// Transform one `<record>` element.
    ///
    /// Returns:
    /// - `Some(document)` for every non-deleted record, however incomplete
    /// - `Some(tombstone)` or `None` for deleted records, depending on
    ///   [`deleted_record_policy`](Self::deleted_record_policy)
    fn transform(&self, record: &XmlElement) -> Option<DataCiteDocument>;

    /// Returns true if the record header carries the deleted marker.
    fn is_deleted(&self, record: &XmlElement) -> bool {
        record_header(record)
            .and_then(|header| header.attr(RECORD_STATUS))
            .is_some_and(|status| status == RECORD_STATUS_DELETED)
    }
}
