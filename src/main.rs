// The platform backend only exists on Windows; elsewhere the layers above it
// are still built and unit-tested.
#![cfg_attr(not(target_os = "windows"), allow(dead_code))]

mod app_logic;
mod core;
mod platform_layer;
mod ui_description_layer;

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use time::macros::format_description;

const LOG_LEVEL_ENV_VAR: &str = "PDF_EXPLORER_LOG";

fn log_level_from_env() -> LevelFilter {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    match std::env::var(LOG_LEVEL_ENV_VAR) {
        Ok(value) => value.trim().parse().unwrap_or(default_level),
        Err(_) => default_level,
    }
}

/*
 * Installs the terminal logger. Safe to call more than once; only the first
 * call has an effect, which lets every test call it.
 */
pub fn initialize_logging() {
    let config = ConfigBuilder::new()
        .set_time_format_custom(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        ))
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    // Fails when a logger is already installed.
    let _ = TermLogger::init(
        log_level_from_env(),
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}

#[cfg(target_os = "windows")]
fn main() {
    use crate::app_logic::{MyAppLogic, handler::APP_NAME, ui_constants};
    use crate::core::{
        CoreDirectoryIndexer, CoreFileSystemReader, CoreSessionSettingsStore,
        DirectoryIndexerOperations, FileSystemReaderOperations, SessionSettingsOperations,
        path_utils,
    };
    use crate::platform_layer::{PlatformEventHandler, PlatformInterface, WindowConfig};
    use std::sync::{Arc, Mutex};

    initialize_logging();
    log::info!("Application starting...");

    let file_system: Arc<dyn FileSystemReaderOperations> = Arc::new(CoreFileSystemReader::new());
    let indexer: Arc<dyn DirectoryIndexerOperations> =
        Arc::new(CoreDirectoryIndexer::new(Arc::clone(&file_system)));
    let settings_store: Arc<dyn SessionSettingsOperations> = Arc::new(CoreSessionSettingsStore::new());
    let default_root = path_utils::get_default_documents_dir();

    let my_app_logic = Arc::new(Mutex::new(MyAppLogic::new(
        settings_store,
        indexer,
        file_system,
        default_root,
    )));

    let platform_interface = match PlatformInterface::new(APP_NAME) {
        Ok(pi) => pi,
        Err(e) => {
            log::error!("Failed to initialize platform interface: {e}");
            return;
        }
    };

    let main_window_id = match platform_interface.create_window(WindowConfig {
        title: ui_constants::APP_TITLE,
        width: ui_constants::MAIN_WINDOW_WIDTH,
        height: ui_constants::MAIN_WINDOW_HEIGHT,
    }) {
        Ok(id) => id,
        Err(e) => {
            log::error!("Failed to create main window: {e}");
            return;
        }
    };

    let initial_commands = ui_description_layer::build_main_window_static_layout(main_window_id);
    let event_handler: Arc<Mutex<dyn PlatformEventHandler>> = my_app_logic;

    if let Err(e) = platform_interface.main_event_loop(event_handler, initial_commands) {
        log::error!("Error during application run: {e}");
    }
    log::info!("Application exited.");
}

#[cfg(not(target_os = "windows"))]
fn main() {
    initialize_logging();
    log::error!("PDF Explorer hosts the Windows shell preview handlers and only runs on Windows.");
    std::process::exit(1);
}
