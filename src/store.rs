//! Registry store.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::atomic;
use crate::error::RegistryError;

/// Environment variable supplying the backing-file path.
pub const REGISTRY_ENV_VAR: &str = "BROCADE_REGISTRY";

/// Transient marker key holding the last load failure. Never persisted.
pub const KEY_ERROR: &str = "error";

/// Stamped key holding the resolved backing-file path.
pub const KEY_REGISTRY_FILE: &str = "brocade-registry-file";

/// Stamped key holding the registry schema URI.
pub const KEY_SCHEMA: &str = "$schema";

/// Default value for [`KEY_SCHEMA`] when the key is absent or empty.
pub const DEFAULT_SCHEMA_URI: &str = "https://dev.anet.be/brocade/schema/registry.schema.json";

/// File-backed registry of string settings.
///
/// The in-memory mapping mirrors a flat JSON object on disk whose path comes
/// from an environment variable ([`REGISTRY_ENV_VAR`] unless overridden at
/// construction). Keys are non-empty strings by convention; values are
/// arbitrary strings.
///
/// The struct owns process-wide state: construct it once at startup and pass
/// it explicitly to collaborators. It carries no internal synchronization;
/// callers mutating it from multiple threads must serialize externally.
/// Every mutation re-reads the backing file, merges the on-disk entries over
/// the in-memory ones, and writes the result back with an atomic replace, so
/// changes made by other processes sharing the file are picked up on the next
/// write (last-writer-wins, no optimistic concurrency check).
pub struct Registry {
    env_var: String,
    values: HashMap<String, String>,
}

impl Registry {
    /// Create an empty registry resolving its backing file from
    /// [`REGISTRY_ENV_VAR`]. Call [`Registry::load`] to populate it.
    pub fn new() -> Self {
        Self::with_env_var(REGISTRY_ENV_VAR)
    }

    /// Create an empty registry resolving its backing file from a custom
    /// environment variable.
    pub fn with_env_var(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            values: HashMap::new(),
        }
    }

    /// Construct and load in one step, the way a process initializes its
    /// registry at startup. A failed load leaves the registry degraded but
    /// usable; the failure stays visible through [`Registry::last_error`]
    /// and the caller decides whether that is fatal.
    pub fn from_env() -> Self {
        let mut registry = Self::new();
        if let Err(err) = registry.load() {
            warn!("registry load failed: {err}");
        }
        registry
    }

    /// Load the backing file into the mapping.
    ///
    /// A missing or empty file is initialised to `{}` on disk before parsing,
    /// so a successful load guarantees the file exists and holds valid JSON.
    /// After parsing, [`KEY_REGISTRY_FILE`] is stamped to the resolved path
    /// and [`KEY_SCHEMA`] is defaulted when absent or empty, each persisted
    /// via [`Registry::set`] when it changes.
    ///
    /// A failure is reported twice: as the returned error and as a rendered
    /// message under [`KEY_ERROR`] in the mapping, so collaborators that only
    /// see the shared mapping can detect a degraded registry. A successful
    /// load removes the marker.
    ///
    /// Backing-file paths are assumed to be UTF-8; a non-UTF-8 path is
    /// stamped lossily into [`KEY_REGISTRY_FILE`].
    pub fn load(&mut self) -> Result<(), RegistryError> {
        if let Err(err) = self.load_inner() {
            self.values
                .insert(KEY_ERROR.to_string(), err.to_string());
            return Err(err);
        }
        Ok(())
    }

    fn load_inner(&mut self) -> Result<(), RegistryError> {
        let path = self.backing_file()?;
        if path.is_dir() {
            return Err(RegistryError::IsDirectory(path));
        }

        let mut content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(source) => return Err(RegistryError::Read { path, source }),
        };
        if content.is_empty() {
            content = "{}".to_string();
            atomic::replace_file(&path, content.as_bytes()).map_err(|source| {
                RegistryError::Init {
                    path: path.clone(),
                    source,
                }
            })?;
            debug!("initialised registry file {}", path.display());
        }

        let parsed: HashMap<String, String> = serde_json::from_str(&content).map_err(|source| {
            RegistryError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        self.values.extend(parsed);
        self.values.remove(KEY_ERROR);

        let path_str = path.to_string_lossy().into_owned();
        if self.get(KEY_REGISTRY_FILE) != Some(path_str.as_str()) {
            // Stamping failures leave the load usable; the next write retries.
            if let Err(err) = self.set(KEY_REGISTRY_FILE, &path_str) {
                warn!("could not stamp {KEY_REGISTRY_FILE}: {err}");
            }
        }
        if self.get(KEY_SCHEMA).is_none_or(str::is_empty) {
            if let Err(err) = self.set(KEY_SCHEMA, DEFAULT_SCHEMA_URI) {
                warn!("could not stamp {KEY_SCHEMA}: {err}");
            }
        }

        debug!(
            "loaded {} registry entries from {}",
            self.values.len(),
            path.display()
        );
        Ok(())
    }

    /// Insert or overwrite a key and persist the mapping.
    ///
    /// The backing file is re-read and merged over the in-memory mapping
    /// first, so entries written by other processes since the last load are
    /// picked up. Setting a key to its current value is a no-op that leaves
    /// the file untouched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RegistryError> {
        self.upsert(key, value, true)
    }

    /// Insert a key only when it is not present yet, then persist.
    ///
    /// An existing key keeps its current value regardless of `value`; use
    /// this to seed defaults without clobbering earlier configuration.
    pub fn init_if_absent(&mut self, key: &str, value: &str) -> Result<(), RegistryError> {
        self.upsert(key, value, false)
    }

    fn upsert(&mut self, key: &str, value: &str, overwrite: bool) -> Result<(), RegistryError> {
        let path = self.backing_file()?;

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(source) => return Err(RegistryError::Read { path, source }),
        };
        let content = if content.is_empty() {
            "{}"
        } else {
            content.as_str()
        };
        let parsed: HashMap<String, String> = serde_json::from_str(content).map_err(|source| {
            RegistryError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        self.values.extend(parsed);

        match self.values.get(key) {
            Some(existing) if !overwrite || existing == value => return Ok(()),
            _ => {}
        }
        self.values.insert(key.to_string(), value.to_string());
        self.persist(&path)
    }

    fn persist(&self, path: &Path) -> Result<(), RegistryError> {
        // The error marker is in-memory state only and never written out.
        let durable: HashMap<&str, &str> = self
            .values
            .iter()
            .filter(|(key, _)| key.as_str() != KEY_ERROR)
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        let bytes = serde_json::to_vec(&durable).map_err(RegistryError::Marshal)?;
        atomic::replace_file(path, &bytes).map_err(|source| RegistryError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "wrote {} registry entries to {}",
            durable.len(),
            path.display()
        );
        Ok(())
    }

    /// Resolve the backing-file path from the environment. An unset or empty
    /// variable is a missing configuration.
    pub fn backing_file(&self) -> Result<PathBuf, RegistryError> {
        match std::env::var(&self.env_var) {
            Ok(value) if !value.is_empty() => Ok(PathBuf::from(value)),
            _ => Err(RegistryError::EnvNotSet(self.env_var.clone())),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The full in-memory mapping.
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// The last load failure message, when the registry is degraded.
    pub fn last_error(&self) -> Option<&str> {
        self.get(KEY_ERROR)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
