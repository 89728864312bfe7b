//! Persistence boundary for [`Settings`].
//!
//! The engine itself is pure; this module is the only place that touches
//! storage. Storage is a flat string key-value store (what a userscript
//! manager or `localStorage` offers), abstracted by [`KeyValueBackend`] so it
//! can be swapped for an in-memory map in tests or a directory of JSON files
//! on disk.
//!
//! [`SettingsStore`] wraps a backend and one key. Its [`load`](SettingsStore::load)
//! never fails: a missing, unreadable or corrupt value yields empty settings,
//! so a broken store can never break a page. Every edit is a full
//! read-modify-write followed by a wholesale save. Edits read strictly
//! through [`try_load`](SettingsStore::try_load): content that does not
//! decode makes the edit fail and is left untouched.
//!
//! # Example
//!
//! ```rust
//! use nocturne::store::{MemoryBackend, SettingsStore};
//! use nocturne::DomainRule;
//!
//! let store = SettingsStore::new(MemoryBackend::new());
//! assert!(store.load().is_empty());
//!
//! store.upsert_domain_rule("github.com", DomainRule::enabled()).unwrap();
//! assert_eq!(
//!     store.load().lookup_domain_rule("github.com"),
//!     Some(DomainRule::enabled())
//! );
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::config::Config;
use crate::error::{NocturneError, Result};
use crate::schedule::TimeRange;
use crate::settings::{DomainRule, Settings};

/// Default storage key for the settings object.
pub const DEFAULT_STORAGE_KEY: &str = "nocturne.settings";

/// A flat string key-value store.
pub trait KeyValueBackend: Send + Sync {
    /// Reads a value, returning `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process backend. Values live as long as the backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with one value.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let backend = Self::new();
        backend
            .values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.into(), value.into());
        backend
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backend storing each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBackend { dir: dir.into() }
    }

    /// The directory holding the value files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !key.starts_with('.');
        if !valid {
            return Err(NocturneError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("storage key '{}' is not a valid file name", key),
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // replace atomically
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Loads and saves [`Settings`] under a single key.
#[derive(Debug)]
pub struct SettingsStore<B> {
    backend: B,
    key: String,
}

impl<B: KeyValueBackend> SettingsStore<B> {
    /// Creates a store using [`DEFAULT_STORAGE_KEY`].
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    /// Creates a store using a custom key.
    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        SettingsStore {
            backend,
            key: key.into(),
        }
    }

    /// Creates a store using the configured storage key.
    pub fn from_config(backend: B, config: &Config) -> Self {
        Self::with_key(backend, config.storage_key.clone())
    }

    /// The storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads settings, falling back to empty settings on any failure.
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "ignoring unreadable settings");
                Settings::new()
            }
        }
    }

    /// Loads settings, reporting backend and decoding errors.
    ///
    /// A key that was never written is not an error.
    pub fn try_load(&self) -> Result<Settings> {
        match self.backend.get(&self.key)? {
            Some(json) if !json.trim().is_empty() => Settings::from_json(&json),
            _ => Ok(Settings::new()),
        }
    }

    /// Overwrites the persisted settings.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let json = settings.to_json()?;
        self.backend.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, rules = settings.len(), "settings saved");
        Ok(())
    }

    /// Adds or replaces a domain rule and saves.
    pub fn upsert_domain_rule(&self, pattern: &str, rule: DomainRule) -> Result<Settings> {
        self.update(|settings| settings.upsert_domain_rule(pattern, rule))
    }

    /// Removes a domain rule and saves.
    pub fn remove_domain_rule(&self, pattern: &str) -> Result<Settings> {
        self.update(|settings| {
            settings.remove_domain_rule(pattern);
            Ok(())
        })
    }

    /// Sets the activation window and saves.
    pub fn set_time_range(&self, range: TimeRange) -> Result<Settings> {
        self.update(|settings| {
            settings.set_time_range(range);
            Ok(())
        })
    }

    /// Clears the activation window and saves.
    pub fn clear_time_range(&self) -> Result<Settings> {
        self.update(|settings| {
            settings.clear_time_range();
            Ok(())
        })
    }

    fn update<F>(&self, edit: F) -> Result<Settings>
    where
        F: FnOnce(&mut Settings) -> Result<()>,
    {
        // never rewrite content that did not decode
        let mut settings = self.try_load()?;
        edit(&mut settings)?;
        self.save(&settings)?;
        Ok(settings)
    }
}
