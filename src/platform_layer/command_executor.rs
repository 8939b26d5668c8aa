/*
 * Executes the `PlatformCommand`s that are not owned by a specific control
 * handler: window-level operations, layout definition, status text logging and
 * the application lifecycle. Control-specific commands are routed to the
 * modules under `controls`.
 */

use super::app::Win32ApiInternalState;
use super::controls::label_handler;
use super::error::Result as PlatformResult;
use super::types::{AppEvent, ControlId, LayoutRule, MessageSeverity, WindowId};
use super::window_common;

use std::sync::Arc;
use windows::Win32::UI::WindowsAndMessaging::PostQuitMessage;

/*
 * Stores the layout rules for a window and applies them to its current size.
 * Later WM_SIZE messages re-apply the same rules.
 */
pub(crate) fn execute_define_layout(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    rules: Vec<LayoutRule>,
) -> PlatformResult<()> {
    log::debug!(
        "CommandExecutor: execute_define_layout for WinID {window_id:?}, with {} rules.",
        rules.len()
    );
    internal_state.with_window_data_write(window_id, |window_data| {
        window_data.set_layout_rules(rules);
        Ok(())
    })?;
    window_common::relayout_window(internal_state, window_id)
}

/*
 * Updates a status label. Every status message is also written to the log at a
 * level matching its severity.
 */
pub(crate) fn execute_update_label_text(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    control_id: ControlId,
    text: String,
    severity: MessageSeverity,
) -> PlatformResult<()> {
    match severity {
        MessageSeverity::Error => log::error!("Status (WinID {window_id:?}): {text}"),
        MessageSeverity::Warning => log::warn!("Status (WinID {window_id:?}): {text}"),
        MessageSeverity::Information => log::info!("Status (WinID {window_id:?}): {text}"),
    }
    label_handler::handle_update_label_text_command(internal_state, window_id, control_id, text, severity)
}

/*
 * Posts WM_QUIT, which ends the main event loop in
 * `PlatformInterface::main_event_loop`.
 */
pub(crate) fn execute_quit_application() -> PlatformResult<()> {
    log::debug!("CommandExecutor: execute_quit_application. Posting WM_QUIT.");
    unsafe { PostQuitMessage(0) };
    Ok(())
}

/*
 * Tells the application logic that the static UI of the main window exists,
 * so it can load its data-dependent content.
 */
pub(crate) fn execute_signal_main_window_ui_setup_complete(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
) -> PlatformResult<()> {
    log::debug!("CommandExecutor: execute_signal_main_window_ui_setup_complete for {window_id:?}");
    internal_state.send_event(AppEvent::MainWindowUISetupComplete { window_id });
    Ok(())
}

pub(crate) fn execute_set_window_title(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    title: &str,
) -> PlatformResult<()> {
    window_common::set_window_title(internal_state, window_id, title)
}

pub(crate) fn execute_show_window(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
) -> PlatformResult<()> {
    window_common::show_window(internal_state, window_id, true)
}

pub(crate) fn execute_close_window(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
) -> PlatformResult<()> {
    window_common::destroy_native_window(internal_state, window_id)
}
