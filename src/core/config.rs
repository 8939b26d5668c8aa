/*
 * Manages the application's persisted session settings: the path of the folder
 * the user last opened. The value lives in a plain-text file whose entire content
 * is that path, stored in a subfolder named after the application under the user's
 * application data directory.
 *
 * It uses a trait-based approach (`SessionSettingsOperations`) so the presenter
 * can be tested against mocks. The store itself reports every failure; deciding
 * to ignore them (the setting is a convenience, never worth an error dialog) is
 * left to the caller.
 */
use crate::core::path_utils;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILENAME: &str = "settings.txt";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    NoSettingsDirectory,
    UnrepresentablePath(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Settings I/O error: {e}"),
            ConfigError::NoSettingsDirectory => {
                write!(f, "Could not determine the settings directory")
            }
            ConfigError::UnrepresentablePath(p) => {
                write!(f, "Path cannot be stored in the settings file: {p}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait SessionSettingsOperations: Send + Sync {
    /*
     * Returns the stored folder path exactly as written, or `None` when nothing
     * has been stored yet. The value is not checked against the file system.
     */
    fn load_last_folder_path(&self, app_name: &str) -> Result<Option<String>>;

    /* Replaces the stored folder path, creating the settings folder if needed. */
    fn save_last_folder_path(&self, app_name: &str, folder_path: &Path) -> Result<()>;
}

pub struct CoreSessionSettingsStore {
    // Replaces the per-user application data directory; used to keep tests hermetic.
    base_dir_override: Option<PathBuf>,
}

impl CoreSessionSettingsStore {
    pub fn new() -> Self {
        CoreSessionSettingsStore {
            base_dir_override: None,
        }
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        CoreSessionSettingsStore {
            base_dir_override: Some(base_dir),
        }
    }

    fn settings_file_path(&self, app_name: &str) -> Result<PathBuf> {
        let settings_dir = match &self.base_dir_override {
            Some(base_dir) => path_utils::app_settings_dir_under(base_dir, app_name),
            None => path_utils::get_app_settings_dir(app_name)
                .ok_or(ConfigError::NoSettingsDirectory)?,
        };
        Ok(settings_dir.join(SETTINGS_FILENAME))
    }

    /*
     * Converts a path into the single line of text stored in the settings file.
     * Paths that are not valid Unicode, or that contain line breaks, would not
     * read back unchanged and are refused.
     */
    fn path_to_settings_text(folder_path: &Path) -> Result<&str> {
        let text = folder_path.to_str().ok_or_else(|| {
            ConfigError::UnrepresentablePath(folder_path.to_string_lossy().into_owned())
        })?;
        if text.contains(['\r', '\n']) {
            return Err(ConfigError::UnrepresentablePath(text.to_string()));
        }
        Ok(text)
    }
}

impl Default for CoreSessionSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSettingsOperations for CoreSessionSettingsStore {
    fn load_last_folder_path(&self, app_name: &str) -> Result<Option<String>> {
        log::trace!("SessionSettingsStore: Loading last folder path for app '{app_name}'");
        let file_path = self.settings_file_path(app_name)?;

        if !file_path.exists() {
            log::debug!("SessionSettingsStore: Settings file {file_path:?} does not exist.");
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path)?;
        // A single trailing line break (e.g. from editing the file by hand) is not part of the path.
        let stored = contents
            .strip_suffix("\r\n")
            .or_else(|| contents.strip_suffix('\n'))
            .unwrap_or(&contents);

        if stored.is_empty() {
            log::debug!("SessionSettingsStore: Settings file {file_path:?} is empty.");
            Ok(None)
        } else {
            log::debug!("SessionSettingsStore: Loaded last folder path '{stored}' from {file_path:?}.");
            Ok(Some(stored.to_string()))
        }
    }

    fn save_last_folder_path(&self, app_name: &str, folder_path: &Path) -> Result<()> {
        log::trace!(
            "SessionSettingsStore: Saving last folder path {folder_path:?} for app '{app_name}'"
        );
        let text = Self::path_to_settings_text(folder_path)?;
        let file_path = self.settings_file_path(app_name)?;

        if let Some(settings_dir) = file_path.parent() {
            if !settings_dir.exists() {
                fs::create_dir_all(settings_dir)?;
                log::debug!("SessionSettingsStore: Created settings directory {settings_dir:?}");
            }
        }

        fs::write(&file_path, text)?;
        log::debug!("SessionSettingsStore: Saved last folder path '{text}' to {file_path:?}.");
        Ok(())
    }
}
