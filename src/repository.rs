//! Human-readable repository names.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::fetch::Fetch;
use crate::query::OaiPmhQuery;
use crate::response::OaiPmhResponse;

/// Name used when neither `Identify` nor the host name yield one.
pub const UNKNOWN_PROVIDER: &str = "Unknown Provider";

lazy_static! {
    static ref HOST_NAME: Regex = Regex::new(r"^(?:https?://)?(?:www\.)?(\w)([^/?#:]+)")
        .expect("valid host name pattern");
}

/// Name of the repository at `host_url`.
///
/// Asks the repository via `Identify` first. If that fails, derives a name from
/// the host (`https://www.pangaea.de/oai` becomes `Pangaea.de`), and falls back
/// to [`UNKNOWN_PROVIDER`].
pub fn repository_name<F: Fetch + ?Sized>(fetcher: &F, host_url: &str) -> String {
    match identify_name(fetcher, host_url) {
        Ok(Some(name)) => name,
        Ok(None) => {
            debug!(host_url, "Identify response has no repositoryName");
            name_from_host(host_url)
        },
        Err(e) => {
            warn!(host_url, error = %e, "Could not identify repository");
            name_from_host(host_url)
        },
    }
}

fn identify_name<F: Fetch + ?Sized>(fetcher: &F, host_url: &str) -> Result<Option<String>> {
    let url = OaiPmhQuery::new(host_url).identify()?;
    let response = OaiPmhResponse::parse(&fetcher.fetch(&url)?)?;
    Ok(response
        .identify
        .map(|identify| identify.repository_name.trim().to_string())
        .filter(|name| !name.is_empty()))
}

/// Derives a display name from the host part of a URL.
#[must_use]
pub fn name_from_host(host_url: &str) -> String {
    HOST_NAME
        .captures(host_url.trim())
        .map_or_else(
            || UNKNOWN_PROVIDER.to_string(),
            |caps| format!("{}{}", caps[1].to_uppercase(), &caps[2]),
        )
}
