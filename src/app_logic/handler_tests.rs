use super::handler::*;
use crate::app_logic::ui_constants;

use crate::core::{
    ConfigError, CoreDirectoryIndexer, CoreFileSystemReader, DirectoryIndexerOperations,
    FileSystemError, FileSystemNode, FileSystemReaderOperations, SessionSettingsOperations,
};
use crate::platform_layer::{
    AppEvent, MessageSeverity, PlatformCommand, PlatformEventHandler, TreeItemDescriptor,
    TreeItemId, WindowId, types::MenuAction,
};

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

/*
 * This module contains unit tests for `MyAppLogic` from the `super::handler` module.
 * The settings store is mocked so tests never touch the user's real settings;
 * folder loading runs the real indexer against temporary directory trees, with
 * a failing indexer mock for I/O errors that cannot be provoked portably.
 */

const WINDOW: WindowId = WindowId(1);

// --- MockSessionSettings ---
enum MockLoadResult {
    Value(Option<String>),
    IoError,
}

struct MockSessionSettings {
    load_result: Mutex<MockLoadResult>,
    saved_paths: Mutex<Vec<(String, PathBuf)>>,
    fail_saves: Mutex<bool>,
}

impl MockSessionSettings {
    fn new() -> Self {
        MockSessionSettings {
            load_result: Mutex::new(MockLoadResult::Value(None)),
            saved_paths: Mutex::new(Vec::new()),
            fail_saves: Mutex::new(false),
        }
    }

    fn with_stored(path: &Path) -> Self {
        let mock = Self::new();
        *mock.load_result.lock().unwrap() =
            MockLoadResult::Value(Some(path.to_string_lossy().into_owned()));
        mock
    }

    fn saved_paths(&self) -> Vec<(String, PathBuf)> {
        self.saved_paths.lock().unwrap().clone()
    }
}

impl SessionSettingsOperations for MockSessionSettings {
    fn load_last_folder_path(&self, _app_name: &str) -> Result<Option<String>, ConfigError> {
        match &*self.load_result.lock().unwrap() {
            MockLoadResult::Value(value) => Ok(value.clone()),
            MockLoadResult::IoError => Err(ConfigError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mocked io error",
            ))),
        }
    }

    fn save_last_folder_path(&self, app_name: &str, folder_path: &Path) -> Result<(), ConfigError> {
        if *self.fail_saves.lock().unwrap() {
            return Err(ConfigError::NoSettingsDirectory);
        }
        self.saved_paths
            .lock()
            .unwrap()
            .push((app_name.to_string(), folder_path.to_path_buf()));
        Ok(())
    }
}
// --- End MockSessionSettings ---

// Indexer whose scans fail with an unexpected I/O error for one specific root.
struct BrokenRootIndexer {
    inner: CoreDirectoryIndexer,
    broken_root: PathBuf,
}

impl DirectoryIndexerOperations for BrokenRootIndexer {
    fn index_directory(&self, root_path: &Path) -> Result<FileSystemNode, FileSystemError> {
        if root_path == self.broken_root {
            return Err(FileSystemError::Io(io::Error::other("device not ready")));
        }
        self.inner.index_directory(root_path)
    }
}

fn core_reader() -> Arc<dyn FileSystemReaderOperations> {
    Arc::new(CoreFileSystemReader::new())
}

fn setup_logic(settings: Arc<MockSessionSettings>, default_root: Option<PathBuf>) -> MyAppLogic {
    crate::initialize_logging();
    let file_system = core_reader();
    let indexer = Arc::new(CoreDirectoryIndexer::new(file_system.clone()));
    MyAppLogic::new(settings, indexer, file_system, default_root)
}

fn drain_commands(logic: &mut MyAppLogic) -> Vec<PlatformCommand> {
    let mut commands = Vec::new();
    while let Some(command) = logic.try_dequeue_command() {
        commands.push(command);
    }
    commands
}

// Creates R/{A/a.pdf, b.pdf, notes.txt} and returns (tempdir guard, R).
fn create_sample_root() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("R");
    fs::create_dir_all(root.join("A")).unwrap();
    File::create(root.join("A").join("a.pdf")).unwrap();
    File::create(root.join("b.pdf")).unwrap();
    File::create(root.join("notes.txt")).unwrap();
    (dir, root)
}

fn start_up(logic: &mut MyAppLogic) -> Vec<PlatformCommand> {
    logic.handle_event(AppEvent::MainWindowUISetupComplete { window_id: WINDOW });
    drain_commands(logic)
}

fn populated_items(commands: &[PlatformCommand]) -> Option<&Vec<TreeItemDescriptor>> {
    commands.iter().find_map(|cmd| match cmd {
        PlatformCommand::PopulateTreeView {
            control_id, items, ..
        } if *control_id == ui_constants::TREE_VIEW_ID => Some(items),
        _ => None,
    })
}

fn status_update(commands: &[PlatformCommand]) -> Option<(String, MessageSeverity)> {
    commands.iter().find_map(|cmd| match cmd {
        PlatformCommand::UpdateLabelText {
            control_id,
            text,
            severity,
            ..
        } if *control_id == ui_constants::STATUS_LABEL_ID => Some((text.clone(), *severity)),
        _ => None,
    })
}

fn item_id_for(logic: &MyAppLogic, path: &Path) -> TreeItemId {
    logic.ui_state().unwrap().path_to_tree_item_id[path]
}

fn select(logic: &mut MyAppLogic, item_id: Option<TreeItemId>) -> Vec<PlatformCommand> {
    logic.handle_event(AppEvent::TreeViewItemSelectionChanged {
        window_id: WINDOW,
        item_id,
    });
    drain_commands(logic)
}

#[test]
fn test_startup_without_stored_folder_loads_default_root() {
    // Arrange
    let (_dir, root) = create_sample_root();
    let settings = Arc::new(MockSessionSettings::new());
    let mut logic = setup_logic(settings.clone(), Some(root.clone()));

    // Act
    let commands = start_up(&mut logic);

    // Assert
    let items = populated_items(&commands).expect("Tree should be populated on startup");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "R");
    let child_texts: Vec<&str> = items[0].children.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(child_texts, vec!["A", "b.pdf"]);
    assert_eq!(items[0].children[0].children[0].text, "a.pdf");

    assert!(commands.contains(&PlatformCommand::SetWindowTitle {
        window_id: WINDOW,
        title: format!("PDF Explorer - {}", root.display()),
    }));
    assert_eq!(
        status_update(&commands),
        Some(("1 folder, 2 PDF documents".to_string(), MessageSeverity::Information))
    );
    assert!(commands.contains(&PlatformCommand::ShowPreviewPlaceholder {
        window_id: WINDOW,
        control_id: ui_constants::PREVIEW_HOST_ID,
        text: ui_constants::PREVIEW_PLACEHOLDER_TEXT.to_string(),
    }));
    assert_eq!(
        commands.last(),
        Some(&PlatformCommand::ShowWindow { window_id: WINDOW })
    );
    assert!(
        settings.saved_paths().is_empty(),
        "Startup must not write the settings."
    );
}

#[test]
fn test_startup_reopens_stored_existing_folder() {
    let (_dir, root) = create_sample_root();
    let default_dir = tempdir().unwrap();
    let settings = Arc::new(MockSessionSettings::with_stored(&root.join("A")));
    let mut logic = setup_logic(settings, Some(default_dir.path().to_path_buf()));

    let commands = start_up(&mut logic);

    let items = populated_items(&commands).unwrap();
    assert_eq!(items[0].text, "A");
    assert_eq!(
        logic.ui_state().unwrap().current_root(),
        Some(root.join("A").as_path())
    );
}

#[test]
fn test_startup_falls_back_when_stored_folder_is_gone() {
    let (_dir, root) = create_sample_root();
    let settings = Arc::new(MockSessionSettings::with_stored(&root.join("deleted_since")));
    let mut logic = setup_logic(settings, Some(root.clone()));

    let commands = start_up(&mut logic);

    assert_eq!(populated_items(&commands).unwrap()[0].text, "R");
}

#[test]
fn test_startup_ignores_unreadable_settings() {
    let (_dir, root) = create_sample_root();
    let settings = Arc::new(MockSessionSettings::new());
    *settings.load_result.lock().unwrap() = MockLoadResult::IoError;
    let mut logic = setup_logic(settings, Some(root.clone()));

    let commands = start_up(&mut logic);

    assert!(populated_items(&commands).is_some());
    assert_eq!(
        status_update(&commands).map(|(_, severity)| severity),
        Some(MessageSeverity::Information),
        "A settings failure is never shown to the user."
    );
}

#[test]
fn test_startup_without_any_folder_still_shows_window() {
    let settings = Arc::new(MockSessionSettings::new());
    let mut logic = setup_logic(settings, None);

    let commands = start_up(&mut logic);

    assert!(populated_items(&commands).is_none());
    assert_eq!(
        status_update(&commands).map(|(_, severity)| severity),
        Some(MessageSeverity::Warning)
    );
    assert!(commands.contains(&PlatformCommand::ShowWindow { window_id: WINDOW }));
    assert!(logic.ui_state().unwrap().current_tree.is_none());
}

#[test]
fn test_selecting_pdf_previews_it_each_time() {
    // Arrange
    let (_dir, root) = create_sample_root();
    let mut logic = setup_logic(Arc::new(MockSessionSettings::new()), Some(root.clone()));
    start_up(&mut logic);
    let a_pdf = root.join("A").join("a.pdf");
    let a_pdf_id = item_id_for(&logic, &a_pdf);

    // Act
    let first = select(&mut logic, Some(a_pdf_id));
    let second = select(&mut logic, Some(a_pdf_id));

    // Assert
    let expected = PlatformCommand::ShowDocumentPreview {
        window_id: WINDOW,
        control_id: ui_constants::PREVIEW_HOST_ID,
        path: a_pdf,
    };
    assert_eq!(first, vec![expected.clone()]);
    assert_eq!(second, vec![expected]);
}

#[test]
fn test_selecting_folder_or_nothing_does_not_preview() {
    let (_dir, root) = create_sample_root();
    let mut logic = setup_logic(Arc::new(MockSessionSettings::new()), Some(root.clone()));
    start_up(&mut logic);
    let folder_id = item_id_for(&logic, &root.join("A"));

    assert!(select(&mut logic, Some(folder_id)).is_empty());
    assert!(select(&mut logic, None).is_empty());
    assert!(select(&mut logic, Some(TreeItemId(9999))).is_empty());
}

#[test]
fn test_selecting_deleted_pdf_does_not_preview() {
    let (_dir, root) = create_sample_root();
    let mut logic = setup_logic(Arc::new(MockSessionSettings::new()), Some(root.clone()));
    start_up(&mut logic);
    let b_pdf = root.join("b.pdf");
    let b_pdf_id = item_id_for(&logic, &b_pdf);
    fs::remove_file(&b_pdf).unwrap();

    assert!(select(&mut logic, Some(b_pdf_id)).is_empty());
}

#[test]
fn test_open_folder_menu_shows_picker_at_current_root() {
    let (_dir, root) = create_sample_root();
    let mut logic = setup_logic(Arc::new(MockSessionSettings::new()), Some(root.clone()));
    start_up(&mut logic);

    logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::OpenFolder,
    });
    let commands = drain_commands(&mut logic);

    assert_eq!(
        commands,
        vec![PlatformCommand::ShowFolderPickerDialog {
            window_id: WINDOW,
            title: ui_constants::FOLDER_PICKER_TITLE.to_string(),
            initial_dir: Some(root),
        }]
    );
}

#[test]
fn test_cancelled_or_blank_folder_pick_changes_nothing() {
    let (_dir, root) = create_sample_root();
    let settings = Arc::new(MockSessionSettings::new());
    let mut logic = setup_logic(settings.clone(), Some(root.clone()));
    start_up(&mut logic);

    logic.handle_event(AppEvent::FolderPickerDialogCompleted {
        window_id: WINDOW,
        path: None,
    });
    logic.handle_event(AppEvent::FolderPickerDialogCompleted {
        window_id: WINDOW,
        path: Some(PathBuf::from("   ")),
    });

    assert!(drain_commands(&mut logic).is_empty());
    assert!(settings.saved_paths().is_empty());
    assert_eq!(logic.ui_state().unwrap().current_root(), Some(root.as_path()));
}

#[test]
fn test_picked_folder_is_loaded_and_remembered() {
    // Arrange
    let (_dir, root) = create_sample_root();
    let other = tempdir().unwrap();
    File::create(other.path().join("Thesis.PDF")).unwrap();
    let settings = Arc::new(MockSessionSettings::new());
    let mut logic = setup_logic(settings.clone(), Some(root));
    start_up(&mut logic);

    // Act
    logic.handle_event(AppEvent::FolderPickerDialogCompleted {
        window_id: WINDOW,
        path: Some(other.path().to_path_buf()),
    });
    let commands = drain_commands(&mut logic);

    // Assert
    let items = populated_items(&commands).expect("Picked folder should replace the tree");
    assert_eq!(items[0].children.len(), 1);
    assert_eq!(items[0].children[0].text, "Thesis.PDF");
    assert_eq!(
        settings.saved_paths(),
        vec![(APP_NAME.to_string(), other.path().to_path_buf())]
    );
    assert_eq!(
        status_update(&commands),
        Some(("0 folders, 1 PDF document".to_string(), MessageSeverity::Information))
    );
    assert!(commands.iter().any(|c| matches!(c, PlatformCommand::ShowPreviewPlaceholder { .. })));
}

#[test]
fn test_picking_missing_folder_keeps_previous_tree() {
    let (_dir, root) = create_sample_root();
    let settings = Arc::new(MockSessionSettings::new());
    let mut logic = setup_logic(settings.clone(), Some(root.clone()));
    start_up(&mut logic);
    let b_pdf_id = item_id_for(&logic, &root.join("b.pdf"));

    logic.handle_event(AppEvent::FolderPickerDialogCompleted {
        window_id: WINDOW,
        path: Some(root.join("no_such_folder")),
    });
    let commands = drain_commands(&mut logic);

    assert!(populated_items(&commands).is_none());
    assert_eq!(
        status_update(&commands).map(|(_, severity)| severity),
        Some(MessageSeverity::Warning)
    );
    assert!(settings.saved_paths().is_empty());
    assert_eq!(logic.ui_state().unwrap().current_root(), Some(root.as_path()));
    assert_eq!(
        select(&mut logic, Some(b_pdf_id)).len(),
        1,
        "The previous tree must remain usable."
    );
}

#[test]
fn test_io_failure_during_scan_reports_error_and_keeps_tree() {
    // Arrange
    let (_dir, root) = create_sample_root();
    let broken = tempdir().unwrap();
    let file_system = core_reader();
    let indexer = Arc::new(BrokenRootIndexer {
        inner: CoreDirectoryIndexer::new(file_system.clone()),
        broken_root: broken.path().to_path_buf(),
    });
    let settings = Arc::new(MockSessionSettings::new());
    let mut logic = MyAppLogic::new(settings.clone(), indexer, file_system, Some(root.clone()));
    start_up(&mut logic);

    // Act
    logic.handle_event(AppEvent::FolderPickerDialogCompleted {
        window_id: WINDOW,
        path: Some(broken.path().to_path_buf()),
    });
    let commands = drain_commands(&mut logic);

    // Assert
    let (text, severity) = status_update(&commands).unwrap();
    assert_eq!(severity, MessageSeverity::Error);
    assert!(text.contains("device not ready"), "Unexpected status text: {text}");
    assert!(populated_items(&commands).is_none());
    assert!(settings.saved_paths().is_empty());
    assert_eq!(logic.ui_state().unwrap().current_root(), Some(root.as_path()));
}

#[test]
fn test_failure_to_remember_folder_is_not_shown() {
    let (_dir, root) = create_sample_root();
    let settings = Arc::new(MockSessionSettings::new());
    *settings.fail_saves.lock().unwrap() = true;
    let mut logic = setup_logic(settings, Some(root.clone()));
    start_up(&mut logic);

    logic.handle_event(AppEvent::FolderPickerDialogCompleted {
        window_id: WINDOW,
        path: Some(root.join("A")),
    });
    let commands = drain_commands(&mut logic);

    assert!(populated_items(&commands).is_some());
    assert_eq!(
        status_update(&commands).map(|(_, severity)| severity),
        Some(MessageSeverity::Information)
    );
}

#[test]
fn test_exit_close_and_destroy_lifecycle() {
    let (_dir, root) = create_sample_root();
    let mut logic = setup_logic(Arc::new(MockSessionSettings::new()), Some(root));
    start_up(&mut logic);

    logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::Exit,
    });
    assert_eq!(
        drain_commands(&mut logic),
        vec![PlatformCommand::QuitApplication]
    );

    logic.handle_event(AppEvent::WindowCloseRequestedByUser { window_id: WINDOW });
    assert_eq!(
        drain_commands(&mut logic),
        vec![PlatformCommand::CloseWindow { window_id: WINDOW }]
    );

    logic.handle_event(AppEvent::WindowDestroyed { window_id: WINDOW });
    assert_eq!(
        drain_commands(&mut logic),
        vec![PlatformCommand::QuitApplication]
    );
    assert!(logic.ui_state().is_none());
}
