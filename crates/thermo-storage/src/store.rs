//! File-backed settings store.

use crate::error::{StorageError, StorageResult};
use crate::format;
use std::path::{Path, PathBuf};
use thermo_core::ThermostatSettings;
use thermo_core::constants::DEFAULT_SETTINGS_FILE;
use tracing::{debug, info, warn};

/// Loads and saves [`ThermostatSettings`] at a fixed path.
///
/// # Examples
///
/// ```no_run
/// use thermo_storage::SettingsStore;
///
/// #[tokio::main]
/// async fn main() -> thermo_storage::StorageResult<()> {
///     let store = SettingsStore::new("/etc/thermo/config.ini");
///     let mut settings = store.load_or_init().await;
///
///     settings.heat_setpoint = 71.5;
///     store.save(&settings).await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be read and
    /// `StorageError::Parse` if it is malformed.
    pub async fn load(&self) -> StorageResult<ThermostatSettings> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let settings = format::parse(&text)?;
        debug!(path = %self.path.display(), "settings loaded");
        Ok(settings)
    }

    /// Write the file atomically.
    ///
    /// The new contents go to a sibling temporary file that is then renamed
    /// over the target, so a reader never sees a half-written file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if writing or renaming fails.
    pub async fn save(&self, settings: &ThermostatSettings) -> StorageResult<()> {
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, format::render(settings)).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::Io(e));
        }

        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Load the settings, falling back to the defaults.
    ///
    /// A missing file is created with the defaults. A malformed or unreadable
    /// file is left alone and the defaults are used in memory only.
    pub async fn load_or_init(&self) -> ThermostatSettings {
        match self.load().await {
            Ok(settings) => settings,
            Err(e) if e.is_not_found() => {
                let defaults = ThermostatSettings::default();
                info!(
                    path = %self.path.display(),
                    "settings file not found, creating it with defaults"
                );
                if let Err(e) = self.save(&defaults).await {
                    warn!(path = %self.path.display(), error = %e, "could not write default settings");
                }
                defaults
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "settings file unusable, continuing with defaults"
                );
                ThermostatSettings::default()
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_sibling() {
        let store = SettingsStore::new("/var/lib/thermo/config.ini");
        assert_eq!(store.temp_path(), Path::new("/var/lib/thermo/config.ini.tmp"));
    }

    #[test]
    fn test_default_path() {
        assert_eq!(SettingsStore::default().path(), Path::new("config.ini"));
    }
}
