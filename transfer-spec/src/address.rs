//! Defines [`HttpUrl`], a newtype around [`url::Url`] that only accepts
//! absolute `http(s)` URLs.
//!
//! This is the transfer engine's equivalent of a `brane`-style lenient
//! `Address`: where that type accepts hostnames or raw IPs without a scheme
//! (suited to internal service addresses), a source/target server for this
//! engine is always reachable over plain HTTP(S), so the stricter
//! `url::Url` parse is the better fit and we simply narrow its accepted
//! schemes.

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use url::Url;

/***** ERRORS *****/
/// Errors that relate to parsing an [`HttpUrl`].
#[derive(Debug)]
pub enum AddressError {
    /// The string did not parse as a URL at all.
    Malformed { raw: String, err: url::ParseError },
    /// The string parsed, but used a scheme other than `http`/`https`.
    IllegalScheme { raw: String, scheme: String },
    /// The string parsed, but has no host component (e.g. `http:///path`).
    MissingHost { raw: String },
}
impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        use AddressError::*;
        match self {
            Malformed { raw, err } => write!(f, "'{raw}' is not a valid URL: {err}"),
            IllegalScheme { raw, scheme } => write!(f, "'{raw}' uses scheme '{scheme}', but only 'http' and 'https' are supported"),
            MissingHost { raw } => write!(f, "'{raw}' does not have a host"),
        }
    }
}
impl error::Error for AddressError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use AddressError::*;
        match self {
            Malformed { err, .. } => Some(err),
            IllegalScheme { .. } | MissingHost { .. } => None,
        }
    }
}

/***** LIBRARY *****/
/// An absolute `http(s)` URL, validated once at parse time.
///
/// Every place the engine needs "a server's base URL" (the `SOURCE`/`TARGET`
/// endpoints in [`Config`](crate::Config), or the descriptor of a `healthz`
/// probe) uses this type rather than a bare `String`, so an invalid URL is a
/// parse-time error instead of a surprise the first time a request goes out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpUrl(Url);
impl HttpUrl {
    /// Parses `raw` as an absolute `http(s)` URL.
    ///
    /// # Errors
    /// Returns an [`AddressError`] if `raw` is not a valid URL, uses a
    /// scheme other than `http`/`https`, or has no host.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, AddressError> {
        let raw = raw.as_ref();
        let url = Url::parse(raw).map_err(|err| AddressError::Malformed { raw: raw.into(), err })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AddressError::IllegalScheme { raw: raw.into(), scheme: url.scheme().into() });
        }
        if url.host_str().is_none() {
            return Err(AddressError::MissingHost { raw: raw.into() });
        }
        Ok(Self(url))
    }

    /// Joins a path onto this URL, e.g. `/api/v1/workflows`.
    ///
    /// # Panics
    /// Never panics on a well-formed relative `path` (this type guarantees
    /// a non-opaque base URL at construction time); a `path` containing a
    /// scheme or otherwise malformed segment falls back to the base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> Url { self.0.join(path).unwrap_or_else(|_| self.0.clone()) }

    /// Returns the underlying [`url::Url`].
    #[inline]
    #[must_use]
    pub fn as_url(&self) -> &Url { &self.0 }
}
impl Display for HttpUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.0) }
}
impl FromStr for HttpUrl {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}
impl Serialize for HttpUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> { serializer.serialize_str(self.0.as_str()) }
}
impl<'de> Deserialize<'de> for HttpUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HttpUrlVisitor;
        impl de::Visitor<'_> for HttpUrlVisitor {
            type Value = HttpUrl;

            fn expecting(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "an absolute http(s) URL") }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> { HttpUrl::parse(v).map_err(de::Error::custom) }
        }
        deserializer.deserialize_str(HttpUrlVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(HttpUrl::parse("http://localhost:5678").is_ok());
        assert!(HttpUrl::parse("https://n8n.example.com").is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        let err = HttpUrl::parse("ftp://example.com").unwrap_err();
        assert!(matches!(err, AddressError::IllegalScheme { .. }));
    }

    #[test]
    fn rejects_malformed() {
        let err = HttpUrl::parse("not a url").unwrap_err();
        assert!(matches!(err, AddressError::Malformed { .. }));
    }

    #[test]
    fn join_appends_path() {
        let url = HttpUrl::parse("https://n8n.example.com").unwrap();
        assert_eq!(url.join("/api/v1/workflows").as_str(), "https://n8n.example.com/api/v1/workflows");
    }
}
