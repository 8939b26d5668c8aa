/*
 * This module provides utility functions for locating the per-user directories
 * the application relies on: the folder holding the settings file and the
 * documents folder used when no usable folder was remembered.
 * It centralizes all use of the `directories` crate.
 */
use directories::{BaseDirs, UserDirs};
use std::path::{Path, PathBuf};

/*
 * Retrieves the application's settings directory.
 * This is a subfolder named after the application directly under the user's
 * per-user application data directory (e.g. `AppData/Roaming/<app>` on Windows,
 * `~/.config/<app>` on Linux). The directory is not created here; writers are
 * expected to create it before storing anything.
 *
 * Returns `None` if no home directory can be determined for the current user.
 */
pub fn get_app_settings_dir(app_name: &str) -> Option<PathBuf> {
    let settings_dir = BaseDirs::new().map(|dirs| app_settings_dir_under(dirs.config_dir(), app_name));
    match &settings_dir {
        Some(path) => log::trace!("PathUtils: Settings directory for '{app_name}' is {path:?}"),
        None => log::warn!("PathUtils: Could not determine the user's application data directory."),
    }
    settings_dir
}

pub fn app_settings_dir_under(base_dir: &Path, app_name: &str) -> PathBuf {
    base_dir.join(app_name)
}

/*
 * Retrieves the user's documents folder, the default root for browsing.
 * Falls back to the home directory on systems without a documents folder.
 */
pub fn get_default_documents_dir() -> Option<PathBuf> {
    if let Some(documents) = UserDirs::new().and_then(|dirs| dirs.document_dir().map(Path::to_path_buf)) {
        return Some(documents);
    }
    log::debug!("PathUtils: No documents folder known, falling back to the home directory.");
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}
