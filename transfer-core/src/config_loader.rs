//! [`ConfigLoader`]: reads the `{SOURCE, TARGET}` configuration from an
//! environment file plus the process environment, validates it, and probes
//! reachability of either side.

use std::collections::HashMap;
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::warn;
use transfer_spec::{Config, ConfigError as FieldError, ServerConfig};

use crate::Side;

/// The four keys [`ConfigLoader::load`] requires, merged from the config
/// file and the process environment (environment wins).
const REQUIRED_KEYS: [&str; 4] = ["SOURCE_N8N_URL", "SOURCE_N8N_API_KEY", "TARGET_N8N_URL", "TARGET_N8N_API_KEY"];

/// An example config file, included verbatim in [`ConfigLoaderError`]
/// messages so a user who hits a validation failure has something to copy.
const EXAMPLE_FILE: &str = "\
# .env
SOURCE_N8N_URL=https://source.example.com
SOURCE_N8N_API_KEY=n8n_api_xxxxxxxxxxxxxxxxxxxxxxxxxxxx
TARGET_N8N_URL=https://target.example.com
TARGET_N8N_API_KEY=n8n_api_yyyyyyyyyyyyyyyyyyyyyyyyyyyy
";

/// Reads configuration from a key-value file plus the process environment,
/// validates it into a [`Config`], and probes SOURCE/TARGET reachability.
#[derive(Debug, Default)]
pub struct ConfigLoader;
impl ConfigLoader {
    /// Loads and validates configuration.
    ///
    /// Resolves the config file path as: `path`, if given; else
    /// `N8N_TRANSFER_CONFIG` from the process environment; else `./.env`
    /// relative to the current working directory. A missing file at the
    /// resolved path is not itself an error as long as every required key
    /// is present in the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigLoaderError::Invalid`] enumerating every offending
    /// field if any required key is missing, any URL fails to parse as an
    /// absolute `http(s)` URL, or any API key is empty. Emits (but does not
    /// fail on) a warning if `SOURCE.url == TARGET.url`.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigLoaderError> {
        let resolved = Self::resolve_path(path);
        let file_values = Self::read_file(&resolved)?;

        let mut issues = Vec::new();
        let mut merged: HashMap<&str, String> = HashMap::new();
        for key in REQUIRED_KEYS {
            match std::env::var(key).ok().or_else(|| file_values.get(key).cloned()) {
                Some(value) if !value.trim().is_empty() => {
                    merged.insert(key, value);
                },
                _ => issues.push(FieldError::MissingKey { key }.to_string()),
            }
        }
        if !issues.is_empty() {
            return Err(ConfigLoaderError::Invalid { issues });
        }

        let source = ServerConfig::new(&merged["SOURCE_N8N_URL"], merged["SOURCE_N8N_API_KEY"].clone())
            .map_err(|err| field_issue("SOURCE", err))
            .map_err(|issue| ConfigLoaderError::Invalid { issues: vec![issue] })?;
        let target = ServerConfig::new(&merged["TARGET_N8N_URL"], merged["TARGET_N8N_API_KEY"].clone())
            .map_err(|err| field_issue("TARGET", err))
            .map_err(|issue| ConfigLoaderError::Invalid { issues: vec![issue] })?;

        let config = Config { source, target };
        if config.same_url() {
            warn!("SOURCE and TARGET point at the same URL ({}); this is allowed but almost certainly not intended", config.source.url);
        }
        Ok(config)
    }

    fn resolve_path(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .or_else(|| std::env::var("N8N_TRANSFER_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(".env"))
    }

    fn read_file(path: &Path) -> Result<HashMap<String, String>, ConfigLoaderError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let iter = dotenvy::from_path_iter(path).map_err(|err| ConfigLoaderError::Io { path: path.to_path_buf(), err: err.to_string() })?;
        let mut map = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|err| ConfigLoaderError::Io { path: path.to_path_buf(), err: err.to_string() })?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Probes reachability of one server with a `GET /healthz`, carrying
    /// the configured API key in `X-N8N-API-KEY`.
    ///
    /// Any status in `[200, 400)` counts as success. Never retries; a
    /// timeout resolves to `{success: false, error: "timeout after Nms"}`.
    pub async fn test_connectivity(config: &Config, which: Side, timeout: Duration) -> ConnectivityReport {
        let server = match which {
            Side::Source => &config.source,
            Side::Target => &config.target,
        };
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(err) => return ConnectivityReport { success: false, status_code: None, response_time_ms: None, error: Some(err.to_string()) },
        };

        let url = server.url.join("/healthz");
        let started = Instant::now();
        match client.get(url).header("X-N8N-API-KEY", &server.api_key).send().await {
            Ok(resp) => {
                let elapsed = started.elapsed();
                let status = resp.status().as_u16();
                let success = (200..400).contains(&status);
                ConnectivityReport {
                    success,
                    status_code: Some(status),
                    response_time_ms: Some(elapsed.as_millis() as u64),
                    error: if success { None } else { Some(format!("unexpected status {status}")) },
                }
            },
            Err(err) if err.is_timeout() => {
                ConnectivityReport { success: false, status_code: None, response_time_ms: None, error: Some(format!("timeout after {}ms", timeout.as_millis())) }
            },
            Err(err) => ConnectivityReport { success: false, status_code: None, response_time_ms: None, error: Some(err.to_string()) },
        }
    }
}

fn field_issue(side: &str, err: FieldError) -> String { format!("{side}: {err}") }

/// The result of one [`ConfigLoader::test_connectivity`] probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub success: bool,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<u64>,
    pub error: Option<String>,
}

/// Errors raised by [`ConfigLoader::load`].
#[derive(Debug)]
pub enum ConfigLoaderError {
    /// One or more fields failed validation; `issues` enumerates every one
    /// of them so a caller doesn't have to fix-and-retry field by field.
    Invalid { issues: Vec<String> },
    /// The config file existed but could not be read or parsed.
    Io { path: PathBuf, err: String },
}
impl Display for ConfigLoaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Invalid { issues } => {
                writeln!(f, "invalid configuration:")?;
                for issue in issues {
                    writeln!(f, "  - {issue}")?;
                }
                write!(f, "example configuration file:\n{EXAMPLE_FILE}")
            },
            Self::Io { path, err } => write!(f, "failed to read config file '{}': {err}", path.display()),
        }
    }
}
impl error::Error for ConfigLoaderError {}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_env(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_from_file() {
        let file = write_env(
            "SOURCE_N8N_URL=https://source.example.com\n\
             SOURCE_N8N_API_KEY=sk_source\n\
             # a comment\n\
             TARGET_N8N_URL=https://target.example.com\n\
             TARGET_N8N_API_KEY=sk_target\n",
        );
        let config = ConfigLoader::load(Some(file.path())).unwrap();
        assert_eq!(config.source.api_key, "sk_source");
        assert_eq!(config.target.api_key, "sk_target");
    }

    #[test]
    fn missing_file_is_not_fatal_if_env_supplies_everything() {
        // SAFETY-adjacent: these tests run single-threaded enough for this
        // crate's test binary; we scope the vars to this test only.
        for key in REQUIRED_KEYS {
            std::env::set_var(key, format!("env-{key}"));
        }
        std::env::set_var("SOURCE_N8N_URL", "https://source.example.com");
        std::env::set_var("TARGET_N8N_URL", "https://target.example.com");

        let missing_path = PathBuf::from("/nonexistent/path/.env");
        let config = ConfigLoader::load(Some(&missing_path)).unwrap();
        assert_eq!(config.source.api_key, "env-SOURCE_N8N_API_KEY");

        for key in REQUIRED_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn enumerates_every_missing_key() {
        let file = write_env("");
        let err = ConfigLoader::load(Some(file.path())).unwrap_err();
        match err {
            ConfigLoaderError::Invalid { issues } => assert_eq!(issues.len(), REQUIRED_KEYS.len()),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_http_url() {
        let file = write_env(
            "SOURCE_N8N_URL=ftp://source.example.com\n\
             SOURCE_N8N_API_KEY=sk_source\n\
             TARGET_N8N_URL=https://target.example.com\n\
             TARGET_N8N_API_KEY=sk_target\n",
        );
        assert!(ConfigLoader::load(Some(file.path())).is_err());
    }
}
