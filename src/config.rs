//! Harvest parameters.
//!
//! [`HarvestParameters`] carries the five operator-facing settings of a
//! harvest. They can be built in code, loaded from a TOML file, or changed one
//! at a time by key through [`HarvestParameters::set`].
//!
//! ```toml
//! hostUrl = "https://ws.pangaea.de/oai/provider"
//! metadataPrefix = "iso19139"
//! from = "2017-01-01"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::field_helpers::validate_url;

/// Names of the harvest parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    /// Lower datestamp bound.
    From,
    /// Upper datestamp bound.
    Until,
    /// Repository base URL.
    HostUrl,
    /// Requested metadata prefix.
    MetadataPrefix,
    /// Provider logo URL.
    LogoUrl,
}

impl ParameterKey {
    /// All keys in declaration order.
    pub const ALL: [ParameterKey; 5] = [
        ParameterKey::From,
        ParameterKey::Until,
        ParameterKey::HostUrl,
        ParameterKey::MetadataPrefix,
        ParameterKey::LogoUrl,
    ];

    /// The key as written in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterKey::From => "from",
            ParameterKey::Until => "until",
            ParameterKey::HostUrl => "hostUrl",
            ParameterKey::MetadataPrefix => "metadataPrefix",
            ParameterKey::LogoUrl => "logoUrl",
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKey {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ParameterKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigurationError::InvalidParameter {
                key: s.to_string(),
                value: String::new(),
                reason: "unknown parameter".to_string(),
            })
    }
}

/// Operator-facing harvest settings. All values are optional strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HarvestParameters {
    /// Only harvest records changed at or after this datestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Only harvest records changed at or before this datestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    /// Base URL of the OAI-PMH repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
    /// Metadata prefix to request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_prefix: Option<String>,
    /// URL of the provider logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl HarvestParameters {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lower datestamp bound.
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the upper datestamp bound.
    #[must_use]
    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    /// Sets the repository base URL.
    #[must_use]
    pub fn with_host_url(mut self, host_url: impl Into<String>) -> Self {
        self.host_url = Some(host_url.into());
        self
    }

    /// Sets the metadata prefix.
    #[must_use]
    pub fn with_metadata_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metadata_prefix = Some(prefix.into());
        self
    }

    /// Sets the provider logo URL.
    #[must_use]
    pub fn with_logo_url(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    /// Parses parameters from TOML and validates them.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML, unknown keys, or invalid URLs.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let parameters: HarvestParameters = toml::from_str(source)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Reads parameters from a TOML file and validates them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Current value of a parameter.
    #[must_use]
    pub fn get(&self, key: ParameterKey) -> Option<&str> {
        match key {
            ParameterKey::From => self.from.as_deref(),
            ParameterKey::Until => self.until.as_deref(),
            ParameterKey::HostUrl => self.host_url.as_deref(),
            ParameterKey::MetadataPrefix => self.metadata_prefix.as_deref(),
            ParameterKey::LogoUrl => self.logo_url.as_deref(),
        }
    }

    /// Changes one parameter. An empty value unsets it.
    ///
    /// Returns true if the stored value changed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidParameter`] if a URL parameter does
    /// not parse; the previous value is kept.
    pub fn set(
        &mut self,
        key: ParameterKey,
        value: &str,
    ) -> std::result::Result<bool, ConfigurationError> {
        let value = value.trim();
        let value = if value.is_empty() {
            None
        } else {
            check_value(key, value)?;
            Some(value.to_string())
        };

        let slot = match key {
            ParameterKey::From => &mut self.from,
            ParameterKey::Until => &mut self.until,
            ParameterKey::HostUrl => &mut self.host_url,
            ParameterKey::MetadataPrefix => &mut self.metadata_prefix,
            ParameterKey::LogoUrl => &mut self.logo_url,
        };
        if *slot == value {
            return Ok(false);
        }
        *slot = value;
        Ok(true)
    }

    /// Checks every set value.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        for key in ParameterKey::ALL {
            if let Some(value) = self.get(key).map(str::trim).filter(|v| !v.is_empty()) {
                check_value(key, value)?;
            }
        }
        Ok(())
    }
}

fn check_value(key: ParameterKey, value: &str) -> std::result::Result<(), ConfigurationError> {
    match key {
        ParameterKey::HostUrl | ParameterKey::LogoUrl => validate_url(value)
            .map(drop)
            .map_err(|e| ConfigurationError::InvalidParameter {
                key: key.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            }),
        ParameterKey::From | ParameterKey::Until | ParameterKey::MetadataPrefix => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarvestError;

    #[test]
    fn test_builder() {
        let parameters = HarvestParameters::new()
            .with_host_url("https://ws.pangaea.de/oai/provider")
            .with_metadata_prefix("iso19139")
            .with_from("2017-01-01");
        assert_eq!(parameters.get(ParameterKey::MetadataPrefix), Some("iso19139"));
        assert_eq!(parameters.get(ParameterKey::Until), None);
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let parameters = HarvestParameters::from_toml_str(
            "hostUrl = \"https://api.figshare.com/v2/oai\"\nmetadataPrefix = \"oai_dc\"\n",
        )
        .expect("valid toml");
        assert_eq!(parameters.host_url.as_deref(), Some("https://api.figshare.com/v2/oai"));
        assert_eq!(parameters.metadata_prefix.as_deref(), Some("oai_dc"));
        assert!(parameters.logo_url.is_none());
    }

    #[test]
    fn test_toml_rejects_bad_input() {
        assert!(matches!(
            HarvestParameters::from_toml_str("hostUrl = \"not a url\""),
            Err(HarvestError::Configuration(ConfigurationError::InvalidParameter { .. }))
        ));
        assert!(matches!(
            HarvestParameters::from_toml_str("colour = \"blue\""),
            Err(HarvestError::ConfigFile(_))
        ));
    }

    #[test]
    fn test_set_reports_changes() {
        let mut parameters = HarvestParameters::new();
        assert!(parameters.set(ParameterKey::MetadataPrefix, "oai_dc").expect("set"));
        assert!(!parameters.set(ParameterKey::MetadataPrefix, " oai_dc ").expect("set"));
        assert!(parameters.set(ParameterKey::MetadataPrefix, "").expect("set"));
        assert_eq!(parameters.metadata_prefix, None);
    }

    #[test]
    fn test_invalid_url_keeps_previous_value() {
        let mut parameters =
            HarvestParameters::new().with_logo_url("https://www.pangaea.de/logo.png");
        let err = parameters.set(ParameterKey::LogoUrl, "::nope").unwrap_err();
        assert!(err.to_string().contains("logoUrl"));
        assert_eq!(
            parameters.logo_url.as_deref(),
            Some("https://www.pangaea.de/logo.png")
        );
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("hostUrl".parse::<ParameterKey>(), Ok(ParameterKey::HostUrl));
        assert_eq!("METADATAPREFIX".parse::<ParameterKey>(), Ok(ParameterKey::MetadataPrefix));
        assert!("colour".parse::<ParameterKey>().is_err());
        for key in ParameterKey::ALL {
            assert_eq!(key.to_string().parse::<ParameterKey>(), Ok(key));
        }
    }
}
