use super::command_executor;
use super::controls::{
    dialog_handler, label_handler, menu_handler, preview_handler, treeview_handler,
};
use super::error::{PlatformError, Result as PlatformResult};
use super::types::{AppEvent, PlatformCommand, PlatformEventHandler, WindowConfig, WindowId};
use super::window_common::{self, NativeWindowData};

use windows::{
    Win32::{
        Foundation::{GetLastError, HINSTANCE, RPC_E_CHANGED_MODE},
        System::{
            Com::{COINIT_APARTMENTTHREADED, COINIT_DISABLE_OLE1DDE, CoInitializeEx, CoUninitialize},
            LibraryLoader::GetModuleHandleW,
        },
        UI::{
            Controls::{
                ICC_STANDARD_CLASSES, ICC_TREEVIEW_CLASSES, INITCOMMONCONTROLSEX,
                InitCommonControlsEx,
            },
            WindowsAndMessaging::{DispatchMessageW, GetMessageW, MSG, TranslateMessage},
        },
    },
    core::PCWSTR,
};

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex, RwLock, Weak,
    atomic::{AtomicUsize, Ordering},
};

/// Internal state for the Win32 platform layer.
///
/// Holds the module instance, the per-window native data and a weak reference
/// to the application's event handler. Shared by `PlatformInterface`, the
/// `WndProc` and the command handlers.
pub(crate) struct Win32ApiInternalState {
    h_instance: HINSTANCE,
    next_window_id_counter: AtomicUsize,
    /// Native data of every live window, keyed by its platform-agnostic id.
    pub(crate) active_windows: RwLock<HashMap<WindowId, NativeWindowData>>,
    /// Weak, so the platform never keeps the application logic alive.
    application_event_handler: Mutex<Option<Weak<Mutex<dyn PlatformEventHandler>>>>,
    app_name_for_class: String,
    com_initialized: bool,
}

impl Win32ApiInternalState {
    fn new(app_name_for_class: String) -> PlatformResult<Arc<Self>> {
        unsafe {
            // The shell dialogs and preview handlers require an STA.
            let hr = CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE);
            if hr.is_err() && hr != RPC_E_CHANGED_MODE {
                return Err(PlatformError::InitializationFailed(format!(
                    "CoInitializeEx failed: {hr:?}"
                )));
            }
            // S_FALSE (already initialized) still needs a matching CoUninitialize.
            let com_initialized = hr.is_ok();

            let icex = INITCOMMONCONTROLSEX {
                dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
                dwICC: ICC_TREEVIEW_CLASSES | ICC_STANDARD_CLASSES,
            };
            if !InitCommonControlsEx(&icex).as_bool() {
                log::warn!(
                    "Platform: InitCommonControlsEx failed. Error: {:?}",
                    GetLastError()
                );
            }

            let h_instance = HINSTANCE(GetModuleHandleW(PCWSTR::null())?.0);
            Ok(Arc::new(Self {
                h_instance,
                next_window_id_counter: AtomicUsize::new(1),
                active_windows: RwLock::new(HashMap::new()),
                application_event_handler: Mutex::new(None),
                app_name_for_class,
                com_initialized,
            }))
        }
    }

    pub(crate) fn h_instance(&self) -> HINSTANCE {
        self.h_instance
    }

    pub(crate) fn app_name_for_class(&self) -> &str {
        &self.app_name_for_class
    }

    fn generate_window_id(&self) -> WindowId {
        WindowId(self.next_window_id_counter.fetch_add(1, Ordering::Relaxed))
    }

    /*
     * Runs `f` with shared access to a window's native data.
     * Win32 calls that send messages back into the WndProc must not be made
     * from inside `f`.
     */
    pub(crate) fn with_window_data_read<R>(
        &self,
        window_id: WindowId,
        f: impl FnOnce(&NativeWindowData) -> PlatformResult<R>,
    ) -> PlatformResult<R> {
        let windows_guard = self.active_windows.read().map_err(|e| {
            log::error!("Platform: Failed to acquire read lock on windows map: {e:?}");
            PlatformError::OperationFailed("Failed to acquire read lock on windows map".into())
        })?;
        let window_data = windows_guard.get(&window_id).ok_or_else(|| {
            PlatformError::InvalidHandle(format!("WindowId {window_id:?} not found"))
        })?;
        f(window_data)
    }

    /* Runs `f` with exclusive access to a window's native data. */
    pub(crate) fn with_window_data_write<R>(
        &self,
        window_id: WindowId,
        f: impl FnOnce(&mut NativeWindowData) -> PlatformResult<R>,
    ) -> PlatformResult<R> {
        let mut windows_guard = self.active_windows.write().map_err(|e| {
            log::error!("Platform: Failed to acquire write lock on windows map: {e:?}");
            PlatformError::OperationFailed("Failed to acquire write lock on windows map".into())
        })?;
        let window_data = windows_guard.get_mut(&window_id).ok_or_else(|| {
            PlatformError::InvalidHandle(format!("WindowId {window_id:?} not found"))
        })?;
        f(window_data)
    }

    /*
     * Delivers an event to the application logic. The handler only records
     * commands in its queue; they are executed by the main event loop.
     */
    pub(crate) fn send_event(&self, event: AppEvent) {
        let handler_arc = self
            .application_event_handler
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(Weak::upgrade));

        let Some(handler_arc) = handler_arc else {
            log::debug!("Platform: No event handler to receive {event:?}.");
            return;
        };
        match handler_arc.lock() {
            Ok(mut handler_guard) => handler_guard.handle_event(event),
            Err(e) => log::error!("Platform: Failed to lock the event handler for {event:?}: {e:?}"),
        }
    }

    /*
     * Executes commands from the application's queue until it is empty. The
     * handler lock is only held while dequeuing, so commands that raise events
     * (dialogs, setup signals) can reach the handler again.
     */
    fn drain_application_commands(self: &Arc<Self>, handler: &Arc<Mutex<dyn PlatformEventHandler>>) {
        loop {
            let next_command = match handler.lock() {
                Ok(mut handler_guard) => handler_guard.try_dequeue_command(),
                Err(e) => {
                    log::error!("Platform: Failed to lock the event handler to dequeue commands: {e:?}");
                    None
                }
            };
            let Some(command) = next_command else {
                break;
            };
            if let Err(e) = self.execute_platform_command(command) {
                log::error!("Platform: Error executing command: {e}");
            }
        }
    }

    pub(crate) fn execute_platform_command(self: &Arc<Self>, command: PlatformCommand) -> PlatformResult<()> {
        log::trace!("Platform: Executing {command:?}");
        match command {
            PlatformCommand::SetWindowTitle { window_id, title } => {
                command_executor::execute_set_window_title(self, window_id, &title)
            }
            PlatformCommand::ShowWindow { window_id } => {
                command_executor::execute_show_window(self, window_id)
            }
            PlatformCommand::CloseWindow { window_id } => {
                command_executor::execute_close_window(self, window_id)
            }
            PlatformCommand::QuitApplication => command_executor::execute_quit_application(),
            PlatformCommand::CreateMainMenu { window_id, menu_items } => {
                menu_handler::handle_create_main_menu_command(self, window_id, menu_items)
            }
            PlatformCommand::CreateTreeView { window_id, control_id } => {
                treeview_handler::handle_create_treeview_command(self, window_id, control_id)
            }
            PlatformCommand::CreateLabel {
                window_id,
                parent_control_id,
                control_id,
                initial_text,
            } => label_handler::handle_create_label_command(
                self,
                window_id,
                parent_control_id,
                control_id,
                initial_text,
            ),
            PlatformCommand::CreatePreviewHost { window_id, control_id } => {
                preview_handler::handle_create_preview_host_command(self, window_id, control_id)
            }
            PlatformCommand::DefineLayout { window_id, rules } => {
                command_executor::execute_define_layout(self, window_id, rules)
            }
            PlatformCommand::PopulateTreeView {
                window_id,
                control_id,
                items,
            } => treeview_handler::populate_treeview(self, window_id, control_id, items),
            PlatformCommand::UpdateLabelText {
                window_id,
                control_id,
                text,
                severity,
            } => command_executor::execute_update_label_text(self, window_id, control_id, text, severity),
            PlatformCommand::ShowFolderPickerDialog {
                window_id,
                title,
                initial_dir,
            } => dialog_handler::handle_show_folder_picker_dialog_command(self, window_id, title, initial_dir),
            PlatformCommand::ShowDocumentPreview {
                window_id,
                control_id,
                path,
            } => preview_handler::handle_show_document_preview_command(self, window_id, control_id, &path),
            PlatformCommand::ShowPreviewPlaceholder {
                window_id,
                control_id,
                text,
            } => preview_handler::handle_show_preview_placeholder_command(self, window_id, control_id, &text),
            PlatformCommand::SignalMainWindowUISetupComplete { window_id } => {
                command_executor::execute_signal_main_window_ui_setup_complete(self, window_id)
            }
        }
    }
}

impl Drop for Win32ApiInternalState {
    fn drop(&mut self) {
        log::debug!("Platform: Win32ApiInternalState dropped.");
        if self.com_initialized {
            unsafe { CoUninitialize() };
        }
    }
}

/// The primary interface to the platform abstraction layer.
pub struct PlatformInterface {
    internal_state: Arc<Win32ApiInternalState>,
}

impl PlatformInterface {
    pub fn new(app_name_for_class: &str) -> PlatformResult<Self> {
        let internal_state = Win32ApiInternalState::new(app_name_for_class.to_string())?;
        window_common::register_window_class(&internal_state)?;
        Ok(PlatformInterface { internal_state })
    }

    /*
     * Creates a hidden top-level window. Its native data is registered before
     * the native window exists, so messages sent during creation find it.
     */
    pub fn create_window(&self, config: WindowConfig) -> PlatformResult<WindowId> {
        let window_id = self.internal_state.generate_window_id();

        self.internal_state
            .active_windows
            .write()
            .map_err(|_| PlatformError::OperationFailed("Failed to lock windows map for preliminary insert".into()))?
            .insert(window_id, NativeWindowData::new(window_id));

        let hwnd = match window_common::create_native_window(
            &self.internal_state,
            window_id,
            config.title,
            config.width,
            config.height,
        ) {
            Ok(hwnd) => hwnd,
            Err(e) => {
                if let Ok(mut windows_map_guard) = self.internal_state.active_windows.write() {
                    windows_map_guard.remove(&window_id);
                }
                log::error!("Platform: Creating the native window for {window_id:?} failed: {e}");
                return Err(e);
            }
        };

        self.internal_state.with_window_data_write(window_id, |window_data| {
            window_data.set_hwnd(hwnd);
            Ok(())
        })?;
        log::debug!("Platform: Native window created with HWND {hwnd:?} for {window_id:?}");
        Ok(window_id)
    }

    /*
     * Runs the application. `initial_commands` (typically the static UI
     * description) are executed first; afterwards every dispatched message is
     * followed by draining the application's command queue. Returns when
     * WM_QUIT is received.
     */
    pub fn main_event_loop(
        &self,
        event_handler: Arc<Mutex<dyn PlatformEventHandler>>,
        initial_commands: Vec<PlatformCommand>,
    ) -> PlatformResult<()> {
        if let Ok(mut handler_slot) = self.internal_state.application_event_handler.lock() {
            *handler_slot = Some(Arc::downgrade(&event_handler));
        }

        for command in initial_commands {
            if let Err(e) = self.internal_state.execute_platform_command(command) {
                log::error!("Platform: Error executing initial command: {e}");
            }
        }
        self.internal_state.drain_application_commands(&event_handler);

        let loop_result = unsafe {
            let mut msg = MSG::default();
            loop {
                let result = GetMessageW(&mut msg, None, 0, 0);
                if result.0 > 0 {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                    self.internal_state.drain_application_commands(&event_handler);
                } else if result.0 == 0 {
                    log::debug!("Platform: WM_QUIT received, exiting message loop.");
                    break Ok(());
                } else {
                    let last_error = GetLastError();
                    log::error!("Platform: GetMessageW failed. LastError: {last_error:?}");
                    break Err(PlatformError::OperationFailed(format!(
                        "GetMessageW failed: {last_error:?}"
                    )));
                }
            }
        };

        if let Ok(mut handler_guard) = event_handler.lock() {
            handler_guard.on_quit();
        }
        if let Ok(mut handler_slot) = self.internal_state.application_event_handler.lock() {
            *handler_slot = None;
        }
        loop_result
    }
}
