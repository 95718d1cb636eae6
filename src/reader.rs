//! Reading raw records from OAI-PMH `ListRecords` responses.
//!
//! This module provides the [`RecordSource`] trait and [`ListRecordsReader`],
//! which pages through a repository by following resumption tokens.
//!
//! # Examples
//!
//! ```no_run
//! use oai_harvest::formats::record_header;
//! use oai_harvest::{HttpFetcher, ListRecordsReader, RecordSource};
//!
//! let mut reader = ListRecordsReader::new(
//!     HttpFetcher::new()?,
//!     "https://api.figshare.com/v2/oai",
//!     "oai_dc",
//!     Some("2018-01-01"),
//!     None,
//! )?;
//!
//! while let Some(record) = reader.next_record()? {
//!     let identifier = record_header(&record).and_then(|h| h.child_local("identifier"));
//!     println!("{}", identifier.map(|e| e.text()).unwrap_or_default());
//! }
//! # Ok::<(), oai_harvest::HarvestError>(())
//! ```

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::error::{HarvestError, Result};
use crate::fetch::Fetch;
use crate::query::OaiPmhQuery;
use crate::response::NO_RECORDS_MATCH;
use crate::xml::XmlElement;

/// A sequence of raw `<record>` elements.
pub trait RecordSource {
    /// Next record, or `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the next record cannot be retrieved.
    fn next_record(&mut self) -> Result<Option<XmlElement>>;
}

/// Pages through `ListRecords` responses of one repository.
///
/// Each response is parsed into `<record>` elements; the reader then requests
/// the page named by the resumption token until the token is absent or empty.
/// A `noRecordsMatch` protocol error ends the sequence without error.
#[derive(Debug)]
pub struct ListRecordsReader<F> {
    fetcher: F,
    query: OaiPmhQuery,
    next_url: Option<String>,
    buffer: VecDeque<XmlElement>,
    pages_read: usize,
    records_read: usize,
    complete_list_size: Option<usize>,
}

impl<F: Fetch> ListRecordsReader<F> {
    /// Create a reader for the records of `host_url` in the `metadata_prefix` format.
    ///
    /// No request is made until the first record is read.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host URL or the prefix is empty.
    pub fn new(
        fetcher: F,
        host_url: &str,
        metadata_prefix: &str,
        from: Option<&str>,
        until: Option<&str>,
    ) -> Result<Self> {
        let query = OaiPmhQuery::new(host_url);
        let first_url = query.list_records(metadata_prefix, from, until)?;
        Ok(ListRecordsReader {
            fetcher,
            query,
            next_url: Some(first_url),
            buffer: VecDeque::new(),
            pages_read: 0,
            records_read: 0,
            complete_list_size: None,
        })
    }

    /// Number of responses fetched so far.
    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    /// Number of records handed out so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Total number of records, if the repository announced it.
    pub fn complete_list_size(&self) -> Option<usize> {
        self.complete_list_size
    }

    /// Fetch the next page of records.
    ///
    /// Returns `Ok(None)` when no further page exists. Records buffered by
    /// [`next_record`](RecordSource::next_record) are returned first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the response is not well-formed,
    /// or the repository reports a protocol error other than `noRecordsMatch`.
    pub fn read_page(&mut self) -> Result<Option<Vec<XmlElement>>> {
        if !self.buffer.is_empty() {
            let page: Vec<XmlElement> = self.buffer.drain(..).collect();
            self.records_read += page.len();
            return Ok(Some(page));
        }
        let Some(page) = self.fetch_page()? else {
            return Ok(None);
        };
        self.records_read += page.len();
        Ok(Some(page))
    }

    fn fetch_page(&mut self) -> Result<Option<Vec<XmlElement>>> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };
        let body = self.fetcher.fetch(&url)?;
        self.pages_read += 1;
        let root = XmlElement::parse(&body)?;

        if let Some(error) = root.child_local("error") {
            let code = error.attr("code").unwrap_or_default();
            if code == NO_RECORDS_MATCH {
                info!(url = %url, "Repository has no matching records");
                return Ok(None);
            }
            return Err(HarvestError::OaiPmh {
                code: code.to_string(),
                message: error.text(),
            });
        }

        let list = root
            .into_children()
            .find(|child| child.local_name() == "ListRecords")
            .ok_or_else(|| HarvestError::Xml("Response has no ListRecords element".to_string()))?;

        let mut records = Vec::new();
        for child in list.into_children() {
            match child.local_name() {
                "record" => records.push(child),
                "resumptionToken" => {
                    if let Some(size) = child.attr("completeListSize").and_then(|s| s.trim().parse().ok()) {
                        self.complete_list_size = Some(size);
                    }
                    let token = child.text();
                    if !token.is_empty() {
                        self.next_url = Some(self.query.resumption(&token)?);
                    }
                },
                _ => {},
            }
        }
        debug!(
            url = %url,
            records = records.len(),
            more = self.next_url.is_some(),
            "Read ListRecords page"
        );
        Ok(Some(records))
    }
}

impl<F: Fetch> RecordSource for ListRecordsReader<F> {
    fn next_record(&mut self) -> Result<Option<XmlElement>> {
        // Pages may be empty while a resumption token is still present.
        while self.buffer.is_empty() {
            match self.fetch_page()? {
                Some(page) => self.buffer.extend(page),
                None => return Ok(None),
            }
        }
        let record = self.buffer.pop_front();
        if record.is_some() {
            self.records_read += 1;
        }
        Ok(record)
    }
}

impl<F: Fetch> Iterator for ListRecordsReader<F> {
    type Item = Result<XmlElement>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
