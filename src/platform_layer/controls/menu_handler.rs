/*
 * Win32-specific menu creation and command routing. Menu items carry
 * generated numeric IDs; the semantic `MenuAction` behind each ID is kept in
 * the window's `NativeWindowData` and looked up again on WM_COMMAND.
 */

use crate::platform_layer::app::Win32ApiInternalState;
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use crate::platform_layer::types::{AppEvent, MenuItemConfig, WindowId};
use crate::platform_layer::window_common::NativeWindowData;

use std::sync::Arc;
use windows::{
    Win32::{
        Foundation::GetLastError,
        UI::WindowsAndMessaging::{
            AppendMenuW, CreateMenu, CreatePopupMenu, DestroyMenu, DrawMenuBar, HMENU, MF_POPUP,
            MF_STRING, SetMenu,
        },
    },
    core::HSTRING,
};

/*
 * Handles the `CreateMainMenu` command: builds the menu bar from `menu_items`,
 * registers an ID for every actionable item and attaches the bar to the window.
 * Items are registered under the write lock; SetMenu runs after it is released.
 */
pub(crate) fn handle_create_main_menu_command(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    menu_items: Vec<MenuItemConfig>,
) -> PlatformResult<()> {
    let h_main_menu = unsafe { CreateMenu()? };

    let populated = internal_state.with_window_data_write(window_id, |window_data| {
        let hwnd_owner = window_data.get_hwnd();
        if hwnd_owner.is_invalid() {
            return Err(PlatformError::InvalidHandle(format!(
                "HWND not yet valid for WindowId {window_id:?} during menu creation"
            )));
        }
        for item_config in &menu_items {
            unsafe { add_menu_item_recursive_impl(h_main_menu, item_config, window_data)? };
        }
        Ok(hwnd_owner)
    });

    let hwnd_owner = match populated {
        Ok(hwnd) => hwnd,
        Err(e) => {
            unsafe { DestroyMenu(h_main_menu).unwrap_or_default() };
            return Err(e);
        }
    };

    unsafe {
        if SetMenu(hwnd_owner, Some(h_main_menu)).is_err() {
            let last_error = GetLastError();
            DestroyMenu(h_main_menu).unwrap_or_default();
            return Err(PlatformError::OperationFailed(format!(
                "SetMenu failed for main menu on WindowId {window_id:?}: {last_error:?}"
            )));
        }
        let _ = DrawMenuBar(hwnd_owner);
    }
    log::debug!("MenuHandler: Main menu created and set for WindowId {window_id:?}");
    Ok(())
}

/*
 * Recursively appends `item_config` to `parent_menu_handle`. Leaf items get a
 * generated ID mapped to their action; items with children become popups.
 */
pub(crate) unsafe fn add_menu_item_recursive_impl(
    parent_menu_handle: HMENU,
    item_config: &MenuItemConfig,
    window_data: &mut NativeWindowData,
) -> PlatformResult<()> {
    let text = HSTRING::from(item_config.text.as_str());
    if item_config.children.is_empty() {
        let Some(action) = item_config.action else {
            log::warn!(
                "MenuHandler: Menu item '{}' has no children and no action. It will be non-functional.",
                item_config.text
            );
            return Ok(());
        };
        let generated_id = window_data.generate_menu_item_id();
        window_data.register_menu_action(generated_id, action);
        log::debug!(
            "MenuHandler: Mapping menu action {action:?} to ID {generated_id} for window {:?}",
            window_data.get_id()
        );
        unsafe { AppendMenuW(parent_menu_handle, MF_STRING, generated_id as usize, &text)? };
    } else {
        let h_submenu = unsafe { CreatePopupMenu()? };
        for child_config in &item_config.children {
            unsafe { add_menu_item_recursive_impl(h_submenu, child_config, window_data)? };
        }
        unsafe { AppendMenuW(parent_menu_handle, MF_POPUP, h_submenu.0 as usize, &text)? };
    }
    Ok(())
}

/*
 * Translates a menu-originated WM_COMMAND into `AppEvent::MenuActionClicked`.
 * Returns None for IDs that do not belong to a registered menu item.
 */
pub(crate) fn handle_wm_command_for_menu(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    command_id: i32,
) -> Option<AppEvent> {
    let action = internal_state
        .with_window_data_read(window_id, |window_data| Ok(window_data.get_menu_action(command_id)))
        .ok()
        .flatten();

    match action {
        Some(action) => {
            log::debug!("MenuHandler: Menu ID {command_id} resolved to {action:?} in WinID {window_id:?}.");
            Some(AppEvent::MenuActionClicked { action })
        }
        None => {
            log::trace!("MenuHandler: WM_COMMAND ID {command_id} is not a known menu item in WinID {window_id:?}.");
            None
        }
    }
}
