//! [`Config`]: the validated `{SOURCE, TARGET}` pair a `TransferManager` is
//! constructed with.
//!
//! Loading and environment-merging lives in `transfer-core`'s
//! `ConfigLoader`; this module only defines the validated shape and the
//! errors that shape's invariants can produce, in the same style
//! `brane-cfg`'s `NodeConfig` separates "the typed config" from "the code
//! that populates it".

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use serde::{Deserialize, Serialize};

use crate::address::{AddressError, HttpUrl};

/// One server endpoint: a base URL and the API key used to authenticate
/// against it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    pub url: HttpUrl,
    pub api_key: String,
}
impl ServerConfig {
    /// Builds a `ServerConfig` from raw strings, validating the URL and
    /// rejecting an empty API key.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidUrl`] or [`ConfigError::EmptyApiKey`].
    pub fn new(url: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let url = HttpUrl::parse(url.as_ref()).map_err(|err| ConfigError::InvalidUrl { field: "url", err })?;
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey { field: "apiKey" });
        }
        Ok(Self { url, api_key })
    }
}

/// The validated configuration of both servers a transfer moves workflows
/// between.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub source: ServerConfig,
    pub target: ServerConfig,
}
impl Config {
    /// Whether `SOURCE` and `TARGET` point at the same URL.
    ///
    /// Not itself an error: a caller that wants this enforced as fatal
    /// should check this explicitly and abort; the `ConfigLoader` only
    /// logs a warning.
    #[must_use]
    pub fn same_url(&self) -> bool { self.source.url == self.target.url }
}

/// Errors raised while building or validating a [`Config`].
#[derive(Debug)]
pub enum ConfigError {
    /// A required key was missing from both the config file and the
    /// process environment.
    MissingKey { key: &'static str },
    /// A URL field failed to parse as an absolute `http(s)` URL.
    InvalidUrl { field: &'static str, err: AddressError },
    /// An API key field was present but empty.
    EmptyApiKey { field: &'static str },
}
impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        use ConfigError::*;
        match self {
            MissingKey { key } => write!(f, "missing required configuration key '{key}'"),
            InvalidUrl { field, err } => write!(f, "invalid '{field}': {err}"),
            EmptyApiKey { field } => write!(f, "'{field}' must not be empty"),
        }
    }
}
impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConfigError::InvalidUrl { err, .. } => Some(err),
            ConfigError::MissingKey { .. } | ConfigError::EmptyApiKey { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        let err = ServerConfig::new("http://localhost:5678", "").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyApiKey { .. }));
    }

    #[test]
    fn rejects_invalid_url() {
        let err = ServerConfig::new("not-a-url", "key").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn same_url_detection() {
        let a = ServerConfig::new("http://localhost:5678", "k1").unwrap();
        let b = ServerConfig::new("http://localhost:5678", "k2").unwrap();
        let c = ServerConfig::new("http://localhost:5679", "k3").unwrap();
        assert!(Config { source: a.clone(), target: b }.same_url());
        assert!(!Config { source: a, target: c }.same_url());
    }
}
