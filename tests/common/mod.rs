//! Common test helpers and utilities shared across test suite.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use oai_harvest::{Fetch, HarvestError, Result, XmlElement};

/// Base URL of the fake repository served by [`StubFetch`].
pub const HOST: &str = "https://repo.example.org/oai";

/// Reads a fixture from `tests/data`.
pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/data/{name}"))
        .unwrap_or_else(|e| panic!("Could not open test file {name}: {e}"))
}

/// Parses a fixture from `tests/data` as a record tree.
#[allow(dead_code)]
pub fn record_fixture(name: &str) -> XmlElement {
    XmlElement::parse(&fixture(name)).expect("Failed to parse test record")
}

/// A [`Fetch`] that serves canned bodies by exact URL and counts requests.
///
/// Unknown URLs fail like an unreachable host.
#[derive(Debug, Default)]
pub struct StubFetch {
    bodies: HashMap<String, String>,
    requests: AtomicUsize,
}

#[allow(dead_code)]
impl StubFetch {
    /// A stub that knows no URL at all.
    pub fn unreachable() -> Self {
        StubFetch::default()
    }

    /// Serves `body` for `url`.
    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// The fake repository at [`HOST`] advertising `oai_dc`, `marc21` and `iso19139`.
    pub fn repository() -> Self {
        StubFetch::default()
            .with(
                format!("{HOST}?verb=ListMetadataFormats"),
                fixture("list_metadata_formats.xml"),
            )
            .with(format!("{HOST}?verb=Identify"), fixture("identify.xml"))
    }

    /// Number of requests served or refused so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Fetch for StubFetch {
    fn fetch(&self, url: &str) -> Result<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.bodies.get(url).cloned().ok_or_else(|| HarvestError::Fetch {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// Wraps record fragments into a `ListRecords` response.
#[allow(dead_code)]
pub fn list_records_page(records: &[String], resumption_token: Option<&str>) -> String {
    let token = resumption_token
        .map(|t| format!("<resumptionToken>{t}</resumptionToken>"))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2018-01-15T10:12:00Z</responseDate>
  <request verb="ListRecords">{HOST}</request>
  <ListRecords>{}{token}</ListRecords>
</OAI-PMH>"#,
        records.concat()
    )
}
