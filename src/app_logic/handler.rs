use crate::core::{
    DirectoryIndexerOperations, FileSystemError, FileSystemReaderOperations, PreviewDecision,
    SessionSettingsOperations, decide_preview,
};
use crate::platform_layer::{
    AppEvent, MessageSeverity, PlatformCommand, PlatformEventHandler, TreeItemId, WindowId,
    types::MenuAction,
};

use super::main_window_ui_state::MainWindowUiState;
use super::ui_constants;

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) const APP_NAME: &str = "PdfExplorer";

pub(crate) type PathToTreeItemIdMap = HashMap<PathBuf, TreeItemId>;
pub(crate) type TreeItemIdToPathMap = HashMap<TreeItemId, PathBuf>;

/*
 * Manages the application state and UI logic in a platform-agnostic manner.
 * It processes UI events received from the platform layer and enqueues commands
 * to update the UI. Its collaborators are injected as traits: the session
 * settings store (last opened folder), the directory indexer that builds the
 * folder/PDF tree, and the file system reader used to re-check documents at
 * selection time.
 *
 * Every operation runs to completion on the caller's thread. A folder load is a
 * single synchronous scan whose result replaces the shown tree in one
 * `PopulateTreeView` command.
 */
pub struct MyAppLogic {
    ui_state: Option<MainWindowUiState>,
    settings_store: Arc<dyn SessionSettingsOperations>,
    indexer: Arc<dyn DirectoryIndexerOperations>,
    file_system: Arc<dyn FileSystemReaderOperations>,
    // Used on startup when no usable folder was remembered.
    default_root: Option<PathBuf>,
    command_queue: VecDeque<PlatformCommand>,
}

impl MyAppLogic {
    pub fn new(
        settings_store: Arc<dyn SessionSettingsOperations>,
        indexer: Arc<dyn DirectoryIndexerOperations>,
        file_system: Arc<dyn FileSystemReaderOperations>,
        default_root: Option<PathBuf>,
    ) -> Self {
        log::debug!("MyAppLogic::new called. Default root: {default_root:?}");
        MyAppLogic {
            ui_state: None,
            settings_store,
            indexer,
            file_system,
            default_root,
            command_queue: VecDeque::new(),
        }
    }

    fn enqueue_command(&mut self, command: PlatformCommand) {
        self.command_queue.push_back(command);
    }

    pub(crate) fn ui_state(&self) -> Option<&MainWindowUiState> {
        self.ui_state.as_ref()
    }

    /*
     * Chooses the folder shown at startup: the remembered folder when it is
     * still an existing directory, otherwise the default documents folder.
     * Settings failures are logged and treated like a missing setting.
     */
    fn resolve_startup_root(&self) -> Option<PathBuf> {
        match self.settings_store.load_last_folder_path(APP_NAME) {
            Ok(Some(stored)) => {
                let stored_path = PathBuf::from(&stored);
                if self.file_system.directory_exists(&stored_path) {
                    log::info!("AppLogic: Reopening last folder {stored_path:?}.");
                    return Some(stored_path);
                }
                log::info!(
                    "AppLogic: Last folder '{stored}' is no longer a directory. Using the default folder."
                );
            }
            Ok(None) => {
                log::debug!("AppLogic: No last folder stored. Using the default folder.");
            }
            Err(e) => {
                log::warn!("AppLogic: Could not read the last folder setting: {e}. Using the default folder.");
            }
        }
        self.default_root.clone()
    }

    /*
     * Handles the event signaling that the static UI of the main window exists.
     * Loads the startup folder (without writing any settings), resets the preview
     * pane to its placeholder and shows the window.
     */
    fn on_main_window_ui_setup_complete(&mut self, window_id: WindowId) {
        log::debug!("AppLogic: Main window UI setup complete for {window_id:?}.");
        self.ui_state = Some(MainWindowUiState::new(window_id));

        match self.resolve_startup_root() {
            Some(root) => {
                self.load_folder(window_id, &root);
            }
            None => {
                log::warn!("AppLogic: No folder available to show on startup.");
                self.enqueue_command(PlatformCommand::SetWindowTitle {
                    window_id,
                    title: MainWindowUiState::compose_window_title(None),
                });
                self.enqueue_command(PlatformCommand::UpdateLabelText {
                    window_id,
                    control_id: ui_constants::STATUS_LABEL_ID,
                    text: "No documents folder found. Use File > Open Folder... to choose one."
                        .to_string(),
                    severity: MessageSeverity::Warning,
                });
            }
        }

        self.enqueue_command(PlatformCommand::ShowPreviewPlaceholder {
            window_id,
            control_id: ui_constants::PREVIEW_HOST_ID,
            text: ui_constants::PREVIEW_PLACEHOLDER_TEXT.to_string(),
        });
        self.enqueue_command(PlatformCommand::ShowWindow { window_id });
    }

    /*
     * Scans `root` and, on success, replaces the shown tree, the window title and
     * the status text. On failure the previous tree stays untouched and the
     * status line reports the problem. Returns whether the load succeeded.
     */
    fn load_folder(&mut self, window_id: WindowId, root: &Path) -> bool {
        log::info!("AppLogic: Loading folder {root:?}.");
        let Some(ui_state) = self.ui_state.as_mut() else {
            log::error!("AppLogic: Cannot load {root:?}, the main window is not set up.");
            return false;
        };

        match self.indexer.index_directory(root) {
            Ok(tree) => {
                let status_text = MainWindowUiState::compose_status_text(&tree);
                let items = ui_state.replace_tree(tree);
                let title = MainWindowUiState::compose_window_title(ui_state.current_root());

                self.enqueue_command(PlatformCommand::PopulateTreeView {
                    window_id,
                    control_id: ui_constants::TREE_VIEW_ID,
                    items,
                });
                self.enqueue_command(PlatformCommand::SetWindowTitle { window_id, title });
                self.enqueue_command(PlatformCommand::UpdateLabelText {
                    window_id,
                    control_id: ui_constants::STATUS_LABEL_ID,
                    text: status_text,
                    severity: MessageSeverity::Information,
                });
                true
            }
            Err(e) => {
                let (text, severity) = match &e {
                    FileSystemError::InvalidPath(path) => (
                        format!("Folder not found: {}", path.display()),
                        MessageSeverity::Warning,
                    ),
                    other => (
                        format!("Could not read {}: {other}", root.display()),
                        MessageSeverity::Error,
                    ),
                };
                log::warn!("AppLogic: Loading {root:?} failed: {e}. Keeping the current tree.");
                self.enqueue_command(PlatformCommand::UpdateLabelText {
                    window_id,
                    control_id: ui_constants::STATUS_LABEL_ID,
                    text,
                    severity,
                });
                false
            }
        }
    }

    fn handle_menu_action(&mut self, action: MenuAction) {
        log::debug!("AppLogic: Menu action {action:?} clicked.");
        match action {
            MenuAction::OpenFolder => {
                let Some(ui_state) = self.ui_state.as_ref() else {
                    log::warn!("AppLogic: Open Folder requested before the main window exists.");
                    return;
                };
                let window_id = ui_state.window_id;
                let initial_dir = ui_state
                    .current_root()
                    .map(Path::to_path_buf)
                    .or_else(|| self.default_root.clone());
                self.enqueue_command(PlatformCommand::ShowFolderPickerDialog {
                    window_id,
                    title: ui_constants::FOLDER_PICKER_TITLE.to_string(),
                    initial_dir,
                });
            }
            MenuAction::Exit => {
                self.enqueue_command(PlatformCommand::QuitApplication);
            }
        }
    }

    /*
     * Handles the outcome of the folder picker. A cancelled dialog or a blank
     * path changes nothing. A folder that loads successfully resets the preview
     * pane and becomes the remembered folder; failing to persist it is logged
     * and otherwise ignored.
     */
    fn handle_folder_picker_completed(&mut self, window_id: WindowId, path: Option<PathBuf>) {
        let Some(folder) = path else {
            log::debug!("AppLogic: Folder picker cancelled.");
            return;
        };
        if folder.as_os_str().to_string_lossy().trim().is_empty() {
            log::debug!("AppLogic: Folder picker returned a blank path, ignoring.");
            return;
        }
        if self.ui_state.as_ref().map(|s| s.window_id) != Some(window_id) {
            log::warn!("AppLogic: Folder picker result for unknown window {window_id:?}, ignoring.");
            return;
        }

        if self.load_folder(window_id, &folder) {
            // The shown document belongs to the previous tree.
            self.enqueue_command(PlatformCommand::ShowPreviewPlaceholder {
                window_id,
                control_id: ui_constants::PREVIEW_HOST_ID,
                text: ui_constants::PREVIEW_PLACEHOLDER_TEXT.to_string(),
            });
            if let Err(e) = self.settings_store.save_last_folder_path(APP_NAME, &folder) {
                log::warn!("AppLogic: Could not remember folder {folder:?}: {e}");
            }
        }
    }

    fn handle_tree_selection_changed(&mut self, window_id: WindowId, item_id: Option<TreeItemId>) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        if ui_state.window_id != window_id {
            return;
        }

        let selected = item_id.and_then(|id| ui_state.node_for_item(id));
        log::trace!("AppLogic: Selection changed to {item_id:?} ({:?}).", selected.map(|n| n.path()));
        match decide_preview(selected, self.file_system.as_ref()) {
            PreviewDecision::Display(path) => {
                log::debug!("AppLogic: Previewing {path:?}.");
                self.enqueue_command(PlatformCommand::ShowDocumentPreview {
                    window_id,
                    control_id: ui_constants::PREVIEW_HOST_ID,
                    path,
                });
            }
            PreviewDecision::NoAction => {}
        }
    }
}

impl PlatformEventHandler for MyAppLogic {
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::MainWindowUISetupComplete { window_id } => {
                self.on_main_window_ui_setup_complete(window_id);
            }
            AppEvent::MenuActionClicked { action } => self.handle_menu_action(action),
            AppEvent::FolderPickerDialogCompleted { window_id, path } => {
                self.handle_folder_picker_completed(window_id, path);
            }
            AppEvent::TreeViewItemSelectionChanged { window_id, item_id } => {
                self.handle_tree_selection_changed(window_id, item_id);
            }
            AppEvent::WindowCloseRequestedByUser { window_id } => {
                log::debug!("AppLogic: Close requested for {window_id:?}.");
                self.enqueue_command(PlatformCommand::CloseWindow { window_id });
            }
            AppEvent::WindowDestroyed { window_id } => {
                log::debug!("AppLogic: Window {window_id:?} destroyed.");
                if self.ui_state.as_ref().map(|s| s.window_id) == Some(window_id) {
                    self.ui_state = None;
                    self.enqueue_command(PlatformCommand::QuitApplication);
                }
            }
            AppEvent::WindowResized { .. } => {}
        }
    }

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
        self.command_queue.pop_front()
    }

    fn on_quit(&mut self) {
        log::debug!("AppLogic: on_quit called by platform. Application is exiting.");
    }
}
