//! The HTTP fetch capability.
//!
//! The negotiation core never talks to the network directly; it receives a
//! [`Fetch`] implementation by constructor injection. [`HttpFetcher`] is the
//! default, blocking implementation (feature `http`).

use std::time::Duration;

use crate::error::Result;

/// Default timeout for ordinary OAI-PMH requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the `Identify` lookup, which only feeds a display name.
pub const IDENTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Retrieves the body of a URL as text.
///
/// Implementations own timeouts and report every transport failure as an
/// error; they must not hang indefinitely.
pub trait Fetch: std::fmt::Debug + Send + Sync {
    /// Fetch the body of `url`.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Fetch`](crate::HarvestError::Fetch) on network
    /// failures, timeouts and non-success status codes.
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<F: Fetch + ?Sized> Fetch for std::sync::Arc<F> {
    fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url)
    }
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url)
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use tracing::debug;

    use super::{Fetch, DEFAULT_TIMEOUT};
    use crate::error::{HarvestError, Result};

    /// Blocking HTTP fetcher with a fixed timeout.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: reqwest::blocking::Client,
        timeout: Duration,
    }

    impl HttpFetcher {
        /// Creates a fetcher with [`DEFAULT_TIMEOUT`].
        ///
        /// # Errors
        ///
        /// Returns an error if the HTTP client cannot be initialized.
        pub fn new() -> Result<Self> {
            Self::with_timeout(DEFAULT_TIMEOUT)
        }

        /// Creates a fetcher with a custom timeout.
        ///
        /// # Errors
        ///
        /// Returns an error if the HTTP client cannot be initialized.
        pub fn with_timeout(timeout: Duration) -> Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("oai-harvest/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| HarvestError::Fetch {
                    url: String::new(),
                    reason: format!("Failed to build HTTP client: {e}"),
                })?;
            Ok(HttpFetcher { client, timeout })
        }

        /// The request timeout.
        #[must_use]
        pub fn timeout(&self) -> Duration {
            self.timeout
        }
    }

    impl Fetch for HttpFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            debug!(url, "GET");
            let fetch_error = |reason: String| HarvestError::Fetch {
                url: url.to_string(),
                reason,
            };
            let response = self
                .client
                .get(url)
                .send()
                .map_err(|e| fetch_error(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(fetch_error(format!("HTTP status {status}")));
            }
            response.text().map_err(|e| fetch_error(e.to_string()))
        }
    }
}
