//! Error types for harvesting operations.
//!
//! This module provides the [`HarvestError`] type for all library operations,
//! the [`ConfigurationError`] type for metadata-prefix negotiation failures,
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error raised when the harvester cannot be configured for a repository.
///
/// None of these are fatal: the dispatcher stays usable and the caller may
/// correct the offending parameter and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No metadata prefix has been set, or it is the empty string.
    #[error("The metadataPrefix parameter must be set!{}", allowed_suffix(.allowed))]
    EmptyPrefix {
        /// Usable prefixes of the repository, in advertisement order.
        allowed: Vec<String>,
    },

    /// The repository advertised no metadata formats, or was never resolved.
    #[error("No metadata formats are known: the hostUrl parameter must point to a reachable OAI-PMH repository!")]
    NoRepositoryFormats,

    /// The repository does not advertise the requested prefix.
    #[error("The repository does not support the metadataPrefix '{prefix}'!{}", allowed_suffix(.allowed))]
    PrefixNotAdvertisedByRepository {
        /// The rejected prefix.
        prefix: String,
        /// Usable prefixes of the repository, in advertisement order.
        allowed: Vec<String>,
    },

    /// The repository advertises the prefix, but no local transformer handles its schema.
    #[error("The harvester does not support the metadataPrefix '{prefix}' (schema {schema})!{}", allowed_suffix(.allowed))]
    SchemaNotSupportedLocally {
        /// The rejected prefix.
        prefix: String,
        /// The schema identifier the repository maps the prefix to.
        schema: String,
        /// Usable prefixes of the repository, in advertisement order.
        allowed: Vec<String>,
    },

    /// The hostUrl parameter is unset.
    #[error("The hostUrl parameter must be set!")]
    MissingHostUrl,

    /// A record transformer was requested before one could be bound.
    #[error("No record transformer is bound: set a valid hostUrl and metadataPrefix first")]
    NoTransformerBound,

    /// A parameter value was rejected.
    #[error("Invalid value '{value}' for parameter '{key}': {reason}")]
    InvalidParameter {
        /// Parameter key.
        key: String,
        /// Rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigurationError {
    /// Prefixes the operator may choose from, if the error carries any.
    #[must_use]
    pub fn allowed_values(&self) -> &[String] {
        match self {
            Self::EmptyPrefix { allowed }
            | Self::PrefixNotAdvertisedByRepository { allowed, .. }
            | Self::SchemaNotSupportedLocally { allowed, .. } => allowed,
            _ => &[],
        }
    }
}

fn allowed_suffix(allowed: &[String]) -> String {
    if allowed.is_empty() {
        String::new()
    } else {
        format!(" Allowed values: {}", allowed.join(", "))
    }
}

/// Error type for all harvesting operations.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// The harvester is misconfigured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A remote document could not be retrieved.
    #[error("Fetch error for {url}: {reason}")]
    Fetch {
        /// Requested URL.
        url: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// A document could not be parsed as XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// The repository answered with an OAI-PMH protocol error.
    #[error("OAI-PMH error '{code}': {message}")]
    OaiPmh {
        /// OAI-PMH error code, e.g. `badResumptionToken`.
        code: String,
        /// Human-readable message sent by the repository.
        message: String,
    },

    /// A configuration file could not be parsed.
    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for HarvestError {
    fn from(err: quick_xml::Error) -> Self {
        HarvestError::Xml(err.to_string())
    }
}

impl From<quick_xml::de::DeError> for HarvestError {
    fn from(err: quick_xml::de::DeError) -> Self {
        HarvestError::Xml(err.to_string())
    }
}

/// Convenience type alias for [`std::result::Result`] with [`HarvestError`].
pub type Result<T> = std::result::Result<T, HarvestError>;
