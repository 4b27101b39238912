/// Preference key-value stores
///
/// The engine persists a handful of scalars through [`PreferenceStore`].
/// Writes land in memory; only `flush` touches the backing storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Process-wide key-value store for player preferences
pub trait PreferenceStore {
    fn get_float(&self, key: &str, default: f32) -> f32;

    fn get_int(&self, key: &str, default: i32) -> i32;

    fn set_float(&mut self, key: &str, value: f32);

    fn set_int(&mut self, key: &str, value: i32);

    /// Persist pending writes to the backing storage
    fn flush(&mut self) -> Result<(), SettingsError>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Box<T> {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        (**self).get_float(key, default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        (**self).get_int(key, default)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        (**self).set_float(key, value)
    }

    fn set_int(&mut self, key: &str, value: i32) {
        (**self).set_int(key, value)
    }

    fn flush(&mut self) -> Result<(), SettingsError> {
        (**self).flush()
    }
}

/// Serialized form shared by the stores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PreferenceData {
    #[serde(default)]
    floats: BTreeMap<String, f32>,

    #[serde(default)]
    ints: BTreeMap<String, i32>,
}

/// Store that never leaves memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    data: PreferenceData,
    flush_count: usize,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of flushes requested so far
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.data.floats.contains_key(key) || self.data.ints.contains_key(key)
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.data.floats.get(key).copied().unwrap_or(default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.data.ints.get(key).copied().unwrap_or(default)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.data.floats.insert(key.to_string(), value);
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.data.ints.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<(), SettingsError> {
        self.flush_count += 1;
        Ok(())
    }
}

/// Store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    data: PreferenceData,
}

impl JsonPreferenceStore {
    const FILE_NAME: &'static str = "preferences.json";

    /// Default location in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("CandyPopBlast").join(Self::FILE_NAME))
    }

    /// Open the store at the default location
    pub fn open_default() -> Result<Self, SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoPreferencesDir)?;
        Ok(Self::open(path))
    }

    /// Open the store at `path`
    ///
    /// A missing file starts empty. An unreadable or corrupt file also starts
    /// empty (the caller falls back to defaults) and is overwritten on the
    /// next flush.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match Self::read(&path) {
            Ok(Some(data)) => {
                tracing::debug!("Loaded preferences from: {}", path.display());
                data
            }
            Ok(None) => {
                tracing::debug!("No preferences found at {}, starting fresh", path.display());
                PreferenceData::default()
            }
            Err(e) => {
                tracing::warn!("{}, using defaults: {}", e, error_chain(&e));
                PreferenceData::default()
            }
        };
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<Option<PreferenceData>, SettingsError> {
        if !path.exists() {
            return Ok(None);
        }
        let read_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            SettingsError::ReadFailed {
                path: path.display().to_string(),
                source,
            }
        };
        let json = std::fs::read_to_string(path).map_err(|e| read_failed(Box::new(e)))?;
        let data = serde_json::from_str(&json).map_err(|e| read_failed(Box::new(e)))?;
        Ok(Some(data))
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.data.floats.get(key).copied().unwrap_or(default)
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.data.ints.get(key).copied().unwrap_or(default)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.data.floats.insert(key.to_string(), value);
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.data.ints.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<(), SettingsError> {
        let write_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            SettingsError::WriteFailed {
                path: self.path.display().to_string(),
                source,
            }
        };

        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(&self.data).map_err(|e| write_failed(Box::new(e)))?;
        std::fs::write(&self.path, json).map_err(|e| write_failed(Box::new(e)))?;

        tracing::debug!("Saved preferences to: {}", self.path.display());
        Ok(())
    }
}

/// Render an error's source chain on one line
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
