use crate::error::{PickerError, Result};
use crate::settings::PickerSettings;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const APP_DIR: &str = "component-picker";
const SETTINGS_FILE: &str = "settings.json";

/// Persistence for [`PickerSettings`]
pub trait SettingsStore: Send + Sync {
    /// Stored settings, or `None` before anything has been saved
    fn get(&self) -> Result<Option<PickerSettings>>;

    fn set(&self, settings: &PickerSettings) -> Result<()>;

    /// Stored settings, falling back to defaults
    fn load_or_default(&self) -> PickerSettings {
        match self.get() {
            Ok(Some(settings)) => settings,
            Ok(None) => PickerSettings::default(),
            Err(e) => {
                log::warn!("Falling back to default settings: {}", e);
                PickerSettings::default()
            }
        }
    }
}

/// JSON file store, by default under the platform config directory
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/component-picker/settings.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
            .ok_or_else(|| PickerError::SettingsStorage("No configuration directory on this platform".to_string()))
    }

    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self) -> Result<Option<PickerSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            PickerError::SettingsStorage(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let settings = serde_json::from_str(&raw).map_err(|e| {
            PickerError::SettingsStorage(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        Ok(Some(settings))
    }

    fn set(&self, settings: &PickerSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PickerError::SettingsStorage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| PickerError::SettingsStorage(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&self.path, json)
            .map_err(|e| PickerError::SettingsStorage(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Option<PickerSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: PickerSettings) -> Self {
        Self { settings: Mutex::new(Some(settings)) }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Result<Option<PickerSettings>> {
        self.settings
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| PickerError::SettingsStorage(format!("Settings lock poisoned: {}", e)))
    }

    fn set(&self, settings: &PickerSettings) -> Result<()> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| PickerError::SettingsStorage(format!("Settings lock poisoned: {}", e)))?;
        *guard = Some(settings.clone());
        Ok(())
    }
}
