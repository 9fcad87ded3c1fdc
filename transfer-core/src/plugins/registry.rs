//! [`PluginRegistry`]: indexes plugin instances by name and kind.
//!
//! Rust cannot load an arbitrary compiled module and heuristically pull a
//! default export the way a dynamically typed host can, so discovery is
//! re-architected here as *explicit registration at startup*:
//! the embedding binary calls [`PluginRegistry::register_builtin`] once for
//! every plugin type it links in, and [`PluginRegistry::discover`] only
//! then resolves `*.plugin.toml` descriptor files against that table — it
//! never loads code itself.

use std::collections::HashMap;
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;

use super::traits::{Deduplicator, PluginKind, PluginMeta, Reporter, Validator};

/// A constructed plugin instance, tagged by which trait it satisfies.
///
/// The registry is a single closed set of three kinds; this enum is the
/// Rust-idiomatic stand-in for the dynamically typed "default export" a
/// scripting-language host would accept.
#[derive(Clone)]
pub enum AnyPlugin {
    Deduplicator(Arc<dyn Deduplicator>),
    Validator(Arc<dyn Validator>),
    Reporter(Arc<dyn Reporter>),
}
impl AnyPlugin {
    #[must_use]
    pub fn meta(&self) -> &dyn PluginMeta {
        match self {
            Self::Deduplicator(p) => p.as_ref(),
            Self::Validator(p) => p.as_ref(),
            Self::Reporter(p) => p.as_ref(),
        }
    }

    #[must_use]
    pub fn as_deduplicator(&self) -> Option<Arc<dyn Deduplicator>> {
        match self {
            Self::Deduplicator(p) => Some(Arc::clone(p)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_validator(&self) -> Option<Arc<dyn Validator>> {
        match self {
            Self::Validator(p) => Some(Arc::clone(p)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reporter(&self) -> Option<Arc<dyn Reporter>> {
        match self {
            Self::Reporter(p) => Some(Arc::clone(p)),
            _ => None,
        }
    }
}

/// A constructor for one named, compile-time-known plugin type.
pub type PluginConstructor = fn() -> AnyPlugin;

/// One `<name>.plugin.toml` descriptor, as read by [`PluginRegistry::discover`].
#[derive(Debug, Deserialize)]
struct PluginDescriptor {
    name: String,
    #[allow(dead_code)]
    version: String,
    #[allow(dead_code)]
    kind: PluginKind,
}

struct Entry {
    exact_name: String,
    plugin: AnyPlugin,
}

/// Totals returned by [`PluginRegistry::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PluginStats {
    pub total: usize,
    pub deduplicators: usize,
    pub validators: usize,
    pub reporters: usize,
    pub enabled: usize,
    pub disabled: usize,
}

/// One `*.plugin.toml` parse/construction failure from [`PluginRegistry::discover`].
#[derive(Debug)]
pub struct DiscoveryError {
    pub file: std::path::PathBuf,
    pub message: String,
}

/// The outcome of one [`PluginRegistry::discover`] call.
#[derive(Debug, Default)]
pub struct DiscoveryResult {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,
    pub plugins: Vec<String>,
    pub errors: Vec<DiscoveryError>,
}

/// Indexes plugins by name (case-insensitive lookup, exact key preserved)
/// and by [`PluginKind`].
#[derive(Default)]
pub struct PluginRegistry {
    entries: Mutex<HashMap<String, Entry>>,
    constructors: Mutex<HashMap<String, PluginConstructor>>,
}
impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers a constructor an eventual `discover` call may invoke by
    /// name. Called once at startup by the embedding binary for every
    /// plugin type it links in.
    pub fn register_builtin(&self, name: impl Into<String>, ctor: PluginConstructor) { self.constructors.lock().insert(name.into(), ctor); }

    /// Registers an already-constructed plugin directly.
    ///
    /// # Errors
    /// Returns [`PluginError::DuplicateName`] if a plugin with the same
    /// name (case-insensitive) is already registered.
    pub fn register(&self, plugin: AnyPlugin) -> Result<(), PluginError> {
        let name = plugin.meta().name().to_string();
        let key = name.to_lowercase();
        let mut entries = self.entries.lock();
        if entries.contains_key(&key) {
            return Err(PluginError::DuplicateName { name });
        }
        entries.insert(key, Entry { exact_name: name, plugin });
        Ok(())
    }

    /// Reads every `*.plugin.toml` descriptor in `dir`, resolves its
    /// `name` against the registered constructor table, constructs and
    /// registers the result.
    ///
    /// Per-file failures (unparseable descriptor, unregistered name,
    /// duplicate registration) are collected in the result rather than
    /// aborting the whole pass.
    pub fn discover(&self, dir: &Path) -> DiscoveryResult {
        let mut result = DiscoveryResult::default();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                result.errors.push(DiscoveryError { file: dir.to_path_buf(), message: err.to_string() });
                result.failed = 1;
                return result;
            },
        };

        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") || !path.to_string_lossy().ends_with(".plugin.toml") {
                continue;
            }
            result.total += 1;
            match self.load_descriptor(&path) {
                Ok(name) => {
                    result.loaded += 1;
                    result.plugins.push(name);
                },
                Err(message) => {
                    result.failed += 1;
                    result.errors.push(DiscoveryError { file: path, message });
                },
            }
        }
        result
    }

    fn load_descriptor(&self, path: &Path) -> Result<String, String> {
        let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
        let descriptor: PluginDescriptor = toml::from_str(&contents).map_err(|err| err.to_string())?;
        let ctor = {
            let constructors = self.constructors.lock();
            *constructors.get(&descriptor.name).ok_or_else(|| format!("no constructor registered for plugin '{}'", descriptor.name))?
        };
        let plugin = ctor();
        self.register(plugin).map_err(|err| err.to_string())?;
        Ok(descriptor.name)
    }

    /// Looks up a plugin by name, optionally constrained to `kind`.
    #[must_use]
    pub fn get(&self, name: &str, kind: Option<PluginKind>) -> Option<AnyPlugin> {
        let entries = self.entries.lock();
        let entry = entries.get(&name.to_lowercase())?;
        match kind {
            Some(kind) if entry.plugin.meta().kind() != kind => None,
            _ => Some(entry.plugin.clone()),
        }
    }

    #[must_use]
    pub fn get_deduplicator(&self, name: &str) -> Option<Arc<dyn Deduplicator>> { self.get(name, Some(PluginKind::Deduplicator))?.as_deduplicator() }

    #[must_use]
    pub fn get_validator(&self, name: &str) -> Option<Arc<dyn Validator>> { self.get(name, Some(PluginKind::Validator))?.as_validator() }

    #[must_use]
    pub fn get_reporter(&self, name: &str) -> Option<Arc<dyn Reporter>> { self.get(name, Some(PluginKind::Reporter))?.as_reporter() }

    /// Returns every registered plugin.
    #[must_use]
    pub fn get_all(&self) -> Vec<AnyPlugin> { self.entries.lock().values().map(|e| e.plugin.clone()).collect() }

    /// Returns every registered plugin of one kind.
    #[must_use]
    pub fn list_by_type(&self, kind: PluginKind) -> Vec<AnyPlugin> { self.entries.lock().values().filter(|e| e.plugin.meta().kind() == kind).map(|e| e.plugin.clone()).collect() }

    /// Removes a plugin by name. Returns whether anything was removed.
    pub fn unregister(&self, name: &str) -> bool { self.entries.lock().remove(&name.to_lowercase()).is_some() }

    /// Returns the exact (non-lowercased) name a plugin was registered
    /// under, if present.
    #[must_use]
    pub fn exact_name(&self, name: &str) -> Option<String> { self.entries.lock().get(&name.to_lowercase()).map(|e| e.exact_name.clone()) }

    /// Aggregate counts across every registered plugin.
    #[must_use]
    pub fn stats(&self) -> PluginStats {
        let entries = self.entries.lock();
        let mut stats = PluginStats { total: entries.len(), ..PluginStats::default() };
        for entry in entries.values() {
            match entry.plugin.meta().kind() {
                PluginKind::Deduplicator => stats.deduplicators += 1,
                PluginKind::Validator => stats.validators += 1,
                PluginKind::Reporter => stats.reporters += 1,
            }
            if entry.plugin.meta().is_enabled() {
                stats.enabled += 1;
            } else {
                stats.disabled += 1;
            }
        }
        stats
    }
}

/// Errors raised while registering a plugin.
#[derive(Debug)]
pub enum PluginError {
    DuplicateName { name: String },
}
impl Display for PluginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::DuplicateName { name } => write!(f, "a plugin named '{name}' is already registered"),
        }
    }
}
impl error::Error for PluginError {}
