//! Settings
//!
//! User preferences are loaded once into a [`Settings`] value and written back
//! explicitly. Storage is a plain key-value port so the same code runs against
//! a JSON file, a browser store or memory.

use std::{collections::BTreeMap, fs, io, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Key for the beta features toggle.
pub const BETA_FEATURES_KEY: &str = "beta_features_enabled";

/// Key for the receipt reader API key.
pub const API_KEY_KEY: &str = "openrouter_api_key";

/// Key for the saved payee handle.
pub const VENMO_USERNAME_KEY: &str = "venmo_username";

/// Settings storage errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// IO error reading or writing the settings file
    #[error("failed to access settings file: {0}")]
    Io(#[from] io::Error),

    /// The settings file is not a JSON object of strings
    #[error("failed to parse settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value persistence for settings.
pub trait SettingsStore {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Writes a value.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Deletes a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;
}

/// Loaded user preferences.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    /// Whether beta features (receipt scanning) are shown
    pub beta_features_enabled: bool,

    /// Receipt reader API key
    pub api_key: Option<String>,

    /// Handle to request payments to
    pub venmo_username: Option<String>,
}

impl Settings {
    /// Reads settings from `store`. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the store cannot be read.
    pub fn load(store: &dyn SettingsStore) -> Result<Self, SettingsError> {
        Ok(Self {
            beta_features_enabled: store.get(BETA_FEATURES_KEY)?.as_deref() == Some("true"),
            api_key: store.get(API_KEY_KEY)?.filter(|value| !value.is_empty()),
            venmo_username: store
                .get(VENMO_USERNAME_KEY)?
                .filter(|value| !value.is_empty()),
        })
    }

    /// Writes settings to `store`. Unset values are removed.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the store cannot be written.
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
        store.set(
            BETA_FEATURES_KEY,
            if self.beta_features_enabled { "true" } else { "false" },
        )?;

        write_optional(store, API_KEY_KEY, self.api_key.as_deref())?;
        write_optional(store, VENMO_USERNAME_KEY, self.venmo_username.as_deref())
    }
}

fn write_optional(
    store: &mut dyn SettingsStore,
    key: &str,
    value: Option<&str>,
) -> Result<(), SettingsError> {
    match value {
        Some(value) => store.set(key, value),
        None => store.remove(key),
    }
}

/// In-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file. A missing file reads as empty.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(error.into()),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;

        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        let mut values = self.read_all()?;

        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn empty_store_gives_defaults() -> TestResult {
        let settings = Settings::load(&MemoryStore::new())?;

        assert_eq!(settings, Settings::default());

        Ok(())
    }

    #[test]
    fn save_then_load_in_memory() -> TestResult {
        let mut store = MemoryStore::new();
        let settings = Settings {
            beta_features_enabled: true,
            api_key: Some("sk-test".to_string()),
            venmo_username: Some("sam-pays".to_string()),
        };

        settings.save(&mut store)?;

        assert_eq!(Settings::load(&store)?, settings);
        assert_eq!(store.get(BETA_FEATURES_KEY)?.as_deref(), Some("true"));

        Ok(())
    }

    #[test]
    fn clearing_a_value_removes_the_key() -> TestResult {
        let mut store = MemoryStore::new();
        store.set(VENMO_USERNAME_KEY, "old-handle")?;

        Settings::default().save(&mut store)?;

        assert_eq!(store.get(VENMO_USERNAME_KEY)?, None);

        Ok(())
    }

    #[test]
    fn only_literal_true_enables_beta_features() -> TestResult {
        let mut store = MemoryStore::new();
        store.set(BETA_FEATURES_KEY, "yes")?;

        assert!(!Settings::load(&store)?.beta_features_enabled, "only \"true\" enables");

        Ok(())
    }

    #[test]
    fn json_file_store_persists_between_instances() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            venmo_username: Some("sam-pays".to_string()),
            ..Settings::default()
        };

        settings.save(&mut JsonFileStore::new(&path))?;

        assert_eq!(Settings::load(&JsonFileStore::new(&path))?, settings);

        Ok(())
    }

    #[test]
    fn missing_file_reads_as_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        assert_eq!(store.get(API_KEY_KEY)?, None);

        Ok(())
    }

    #[test]
    fn corrupt_file_is_an_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2")?;

        let result = JsonFileStore::new(&path).get(API_KEY_KEY);

        assert!(matches!(result, Err(SettingsError::Json(_))));

        Ok(())
    }
}
