use super::app::Win32ApiInternalState;
use super::controls::{label_handler, menu_handler, preview_handler, treeview_handler};
use super::error::{PlatformError, Result as PlatformResult};
use super::layout::{LayoutRect, calculate_layout};
use super::types::{AppEvent, ControlId, LayoutRule, MenuAction, MessageSeverity, WindowId};

use windows::{
    Win32::{
        Foundation::{
            ERROR_INVALID_WINDOW_HANDLE, GetLastError, HWND, LPARAM, LRESULT, RECT, WPARAM,
        },
        Graphics::Gdi::{COLOR_WINDOW, HBRUSH, HDC},
        UI::Controls::NMHDR,
        UI::WindowsAndMessaging::*,
    },
    core::{HSTRING, PCWSTR, w},
};

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::Arc;

pub(crate) const WC_STATIC: PCWSTR = w!("STATIC");
pub(crate) const SS_LEFT: WINDOW_STYLE = WINDOW_STYLE(0x00000000);
pub(crate) const SS_CENTER: WINDOW_STYLE = WINDOW_STYLE(0x00000001);
pub(crate) const SS_NOPREFIX: WINDOW_STYLE = WINDOW_STYLE(0x00000080);

// Menu item ids are generated from here upwards, away from the control ids.
const FIRST_MENU_ITEM_ID: i32 = 20000;

/*
 * Holds native data associated with a specific window managed by the platform layer.
 * This includes the native window handle, the handles of its controls keyed by
 * logical `ControlId`, and control-specific state (tree items, preview handler,
 * label severities, menu action mapping, layout rules).
 */
pub(crate) struct NativeWindowData {
    this_window_hwnd: HWND,
    id: WindowId,
    control_hwnd_map: HashMap<ControlId, HWND>,
    pub(crate) treeview_state: Option<treeview_handler::TreeViewInternalState>,
    pub(crate) preview_state: Option<preview_handler::PreviewHostState>,
    layout_rules: Option<Vec<LayoutRule>>,
    label_severities: HashMap<ControlId, MessageSeverity>,
    menu_action_map: HashMap<i32, MenuAction>,
    next_menu_item_id_counter: i32,
}

impl NativeWindowData {
    pub(crate) fn new(id: WindowId) -> Self {
        NativeWindowData {
            this_window_hwnd: HWND(std::ptr::null_mut()), // Set once CreateWindowExW returns
            id,
            control_hwnd_map: HashMap::new(),
            treeview_state: None,
            preview_state: None,
            layout_rules: None,
            label_severities: HashMap::new(),
            menu_action_map: HashMap::new(),
            next_menu_item_id_counter: FIRST_MENU_ITEM_ID,
        }
    }

    pub(crate) fn get_hwnd(&self) -> HWND {
        self.this_window_hwnd
    }

    pub(crate) fn set_hwnd(&mut self, hwnd: HWND) {
        self.this_window_hwnd = hwnd;
    }

    pub(crate) fn get_id(&self) -> WindowId {
        self.id
    }

    pub(crate) fn get_control_hwnd(&self, control_id: ControlId) -> Option<HWND> {
        self.control_hwnd_map.get(&control_id).copied()
    }

    pub(crate) fn has_control(&self, control_id: ControlId) -> bool {
        self.control_hwnd_map.contains_key(&control_id)
    }

    pub(crate) fn register_control_hwnd(&mut self, control_id: ControlId, hwnd: HWND) {
        self.control_hwnd_map.insert(control_id, hwnd);
    }

    /* Resolves the container for a new control: a registered control, or the window itself. */
    pub(crate) fn get_parent_hwnd(&self, parent_control_id: Option<ControlId>) -> PlatformResult<HWND> {
        match parent_control_id {
            Some(id) => self.get_control_hwnd(id).ok_or_else(|| {
                PlatformError::InvalidHandle(format!(
                    "Parent control {id} not found in WinID {:?}",
                    self.id
                ))
            }),
            None if self.this_window_hwnd.is_invalid() => Err(PlatformError::InvalidHandle(
                format!("HWND for WinID {:?} is not valid yet", self.id),
            )),
            None => Ok(self.this_window_hwnd),
        }
    }

    pub(crate) fn set_layout_rules(&mut self, rules: Vec<LayoutRule>) {
        self.layout_rules = Some(rules);
    }

    pub(crate) fn generate_menu_item_id(&mut self) -> i32 {
        let id = self.next_menu_item_id_counter;
        self.next_menu_item_id_counter += 1;
        id
    }

    pub(crate) fn register_menu_action(&mut self, menu_item_id: i32, action: MenuAction) {
        self.menu_action_map.insert(menu_item_id, action);
    }

    pub(crate) fn get_menu_action(&self, menu_item_id: i32) -> Option<MenuAction> {
        self.menu_action_map.get(&menu_item_id).copied()
    }

    pub(crate) fn set_label_severity(&mut self, control_id: ControlId, severity: MessageSeverity) {
        self.label_severities.insert(control_id, severity);
    }

    pub(crate) fn get_label_severity(&self, control_id: ControlId) -> Option<MessageSeverity> {
        self.label_severities.get(&control_id).copied()
    }

    /*
     * Computes where every laid-out control goes for a client area of the given
     * size, descending into controls that are themselves containers.
     */
    fn compute_control_placements(&self, client_width: i32, client_height: i32) -> Vec<(HWND, LayoutRect)> {
        let Some(rules) = &self.layout_rules else {
            return Vec::new();
        };
        let mut placements = Vec::new();
        let mut pending = vec![(None, LayoutRect::new(0, 0, client_width, client_height))];
        while let Some((parent_id, container)) = pending.pop() {
            for (control_id, rect) in calculate_layout(rules, parent_id, container) {
                match self.get_control_hwnd(control_id) {
                    Some(hwnd) => placements.push((hwnd, rect)),
                    None => log::warn!(
                        "WindowCommon: Layout rule for control {control_id} but no such control in WinID {:?}.",
                        self.id
                    ),
                }
                pending.push((Some(control_id), LayoutRect::new(0, 0, rect.width, rect.height)));
            }
        }
        placements
    }
}

/// Context passed to `CreateWindowExW` via `lpCreateParams`.
/// This allows the static `WndProc` to retrieve the necessary `Arc`-ed state
/// for the specific window instance being created.
struct WindowCreationContext {
    internal_state_arc: Arc<Win32ApiInternalState>,
    window_id: WindowId,
}

fn window_class_name(internal_state: &Win32ApiInternalState) -> HSTRING {
    HSTRING::from(format!("{}_PlatformWindowClass", internal_state.app_name_for_class()))
}

/// Registers the main window class for the application.
///
/// Called once during platform initialization, before any windows are created.
pub(crate) fn register_window_class(internal_state: &Arc<Win32ApiInternalState>) -> PlatformResult<()> {
    let class_name_hstring = window_class_name(internal_state);
    let class_name_pcwstr = PCWSTR(class_name_hstring.as_ptr());

    unsafe {
        let mut wc_test = WNDCLASSEXW::default();
        if GetClassInfoExW(Some(internal_state.h_instance()), class_name_pcwstr, &mut wc_test).is_ok() {
            return Ok(());
        }

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(facade_wnd_proc_router),
            cbClsExtra: 0,
            cbWndExtra: 0, // We use GWLP_USERDATA for per-instance context
            hInstance: internal_state.h_instance(),
            hIcon: LoadIconW(None, IDI_APPLICATION)?,
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as *mut c_void),
            lpszMenuName: PCWSTR::null(),
            lpszClassName: class_name_pcwstr,
            hIconSm: LoadIconW(None, IDI_APPLICATION)?,
        };

        if RegisterClassExW(&wc) == 0 {
            let error = GetLastError();
            log::error!("WindowCommon: RegisterClassExW failed: {error:?}");
            Err(PlatformError::InitializationFailed(format!(
                "RegisterClassExW failed: {error:?}"
            )))
        } else {
            log::debug!("WindowCommon: Registered window class for '{}'.", internal_state.app_name_for_class());
            Ok(())
        }
    }
}

/// Creates a native top-level window. The window starts hidden; `ShowWindow` reveals it.
pub(crate) fn create_native_window(
    internal_state_arc: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    title: &str,
    width: i32,
    height: i32,
) -> PlatformResult<HWND> {
    let class_name_hstring = window_class_name(internal_state_arc);

    // Retrieved and owned by the WndProc from WM_NCCREATE onwards.
    let creation_context = Box::new(WindowCreationContext {
        internal_state_arc: Arc::clone(internal_state_arc),
        window_id,
    });

    unsafe {
        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            &class_name_hstring,
            &HSTRING::from(title),
            WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            width,
            height,
            None,
            None,
            Some(internal_state_arc.h_instance()),
            Some(Box::into_raw(creation_context) as *const c_void),
        )?;
        Ok(hwnd)
    }
}

/// The window procedure router for all windows created by this platform layer.
///
/// Retrieves the per-window `WindowCreationContext` stored in `GWLP_USERDATA`
/// and delegates to `Win32ApiInternalState::handle_window_message`.
unsafe extern "system" fn facade_wnd_proc_router(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let context_ptr = if msg == WM_NCCREATE {
        let create_struct = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
        let context_raw_ptr = create_struct.lpCreateParams as *mut WindowCreationContext;
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, context_raw_ptr as isize) };
        context_raw_ptr
    } else {
        unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut WindowCreationContext }
    };

    if context_ptr.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    let context = unsafe { &*context_ptr };
    let internal_state_arc = Arc::clone(&context.internal_state_arc);
    let window_id = context.window_id;

    let result = internal_state_arc.handle_window_message(hwnd, msg, wparam, lparam, window_id);

    if msg == WM_NCDESTROY {
        // Last message for this window: reclaim the context.
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
        drop(unsafe { Box::from_raw(context_ptr) });
    }

    result
}

#[inline]
pub(crate) fn loword_from_lparam(lparam: LPARAM) -> i32 {
    (lparam.0 & 0xFFFF) as i32
}

#[inline]
pub(crate) fn hiword_from_lparam(lparam: LPARAM) -> i32 {
    ((lparam.0 >> 16) & 0xFFFF) as i32
}

#[inline]
pub(crate) fn loword_from_wparam(wparam: WPARAM) -> i32 {
    (wparam.0 & 0xFFFF) as i32
}

#[inline]
pub(crate) fn hiword_from_wparam(wparam: WPARAM) -> i32 {
    ((wparam.0 >> 16) & 0xFFFF) as i32
}

impl Win32ApiInternalState {
    fn handle_window_message(
        self: &Arc<Self>,
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
        window_id: WindowId,
    ) -> LRESULT {
        let mut event_to_send: Option<AppEvent> = None;
        let mut handled_result: Option<LRESULT> = None;

        match msg {
            WM_SIZE => {
                let width = loword_from_lparam(lparam);
                let height = hiword_from_lparam(lparam);
                apply_layout_rules(self, window_id, width, height);
                preview_handler::resize_active_preview(self, window_id);
                event_to_send = Some(AppEvent::WindowResized {
                    window_id,
                    width,
                    height,
                });
            }
            WM_COMMAND => {
                // Menu items report a zero notification code and no control handle.
                if hiword_from_wparam(wparam) == 0 && lparam.0 == 0 {
                    let command_id = loword_from_wparam(wparam);
                    if let Some(event) = menu_handler::handle_wm_command_for_menu(self, window_id, command_id) {
                        event_to_send = Some(event);
                        handled_result = Some(LRESULT(0));
                    }
                }
            }
            WM_NOTIFY => {
                let nmhdr = unsafe { &*(lparam.0 as *const NMHDR) };
                if let Some(event) = treeview_handler::handle_treeview_notification(self, window_id, nmhdr, lparam) {
                    event_to_send = Some(event);
                }
            }
            WM_CTLCOLORSTATIC => {
                let hdc = HDC(wparam.0 as *mut c_void);
                let hwnd_static = HWND(lparam.0 as *mut c_void);
                handled_result = label_handler::handle_wm_ctlcolorstatic(self, window_id, hdc, hwnd_static);
            }
            WM_CLOSE => {
                log::debug!("WindowCommon: WM_CLOSE for WinID {window_id:?}.");
                // The application logic decides; it answers with CloseWindow to proceed.
                event_to_send = Some(AppEvent::WindowCloseRequestedByUser { window_id });
                handled_result = Some(LRESULT(0));
            }
            WM_DESTROY => {
                log::debug!("WindowCommon: WM_DESTROY for WinID {window_id:?}.");
                preview_handler::release_preview_for_window(self, window_id);
                if let Ok(mut windows_map_guard) = self.active_windows.write() {
                    windows_map_guard.remove(&window_id);
                }
                event_to_send = Some(AppEvent::WindowDestroyed { window_id });
                handled_result = Some(LRESULT(0));
            }
            _ => {}
        }

        if let Some(event) = event_to_send {
            self.send_event(event);
        }

        match handled_result {
            Some(result) => result,
            None => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        }
    }
}

/*
 * Positions the window's controls for a client area of `width` x `height`.
 * Placements are computed under the read lock; windows are moved after it is
 * released, since moving them sends messages back into the WndProc.
 */
fn apply_layout_rules(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    width: i32,
    height: i32,
) {
    let placements = match internal_state.with_window_data_read(window_id, |window_data| {
        Ok(window_data.compute_control_placements(width, height))
    }) {
        Ok(placements) => placements,
        Err(e) => {
            log::debug!("WindowCommon: No layout applied for WinID {window_id:?}: {e}");
            return;
        }
    };

    for (hwnd_control, rect) in placements {
        unsafe {
            if let Err(e) = MoveWindow(hwnd_control, rect.x, rect.y, rect.width, rect.height, true) {
                log::warn!("WindowCommon: MoveWindow failed for control HWND {hwnd_control:?}: {e:?}");
            }
        }
    }
}

/* Re-applies the layout to the current client area, e.g. after the rules changed. */
pub(crate) fn relayout_window(internal_state: &Arc<Win32ApiInternalState>, window_id: WindowId) -> PlatformResult<()> {
    let hwnd = internal_state.with_window_data_read(window_id, |window_data| Ok(window_data.get_hwnd()))?;
    if hwnd.is_invalid() {
        return Ok(());
    }
    let mut client_rect = RECT::default();
    unsafe { GetClientRect(hwnd, &mut client_rect)? };
    apply_layout_rules(
        internal_state,
        window_id,
        client_rect.right - client_rect.left,
        client_rect.bottom - client_rect.top,
    );
    preview_handler::resize_active_preview(internal_state, window_id);
    Ok(())
}

// --- Helpers used by the command executor ---

pub(crate) fn set_window_title(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    title: &str,
) -> PlatformResult<()> {
    let hwnd = internal_state.with_window_data_read(window_id, |window_data| Ok(window_data.get_hwnd()))?;
    unsafe { SetWindowTextW(hwnd, &HSTRING::from(title))? };
    Ok(())
}

pub(crate) fn show_window(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    show: bool,
) -> PlatformResult<()> {
    let hwnd = internal_state.with_window_data_read(window_id, |window_data| Ok(window_data.get_hwnd()))?;
    let cmd = if show { SW_SHOW } else { SW_HIDE };
    unsafe {
        let _ = ShowWindow(hwnd, cmd);
    }
    Ok(())
}

/// Destroys a native window. Called once the application logic confirmed a close.
pub(crate) fn destroy_native_window(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
) -> PlatformResult<()> {
    let hwnd_to_destroy = match internal_state.with_window_data_read(window_id, |window_data| Ok(window_data.get_hwnd())) {
        Ok(hwnd) => hwnd,
        Err(_) => {
            log::debug!("WindowCommon: WinID {window_id:?} not found for destroy, likely already processed.");
            return Ok(());
        }
    };

    if hwnd_to_destroy.is_invalid() {
        log::warn!("WindowCommon: Attempted to destroy an invalid HWND for WinID {window_id:?}.");
        return Ok(());
    }
    unsafe {
        // DestroyWindow sends WM_DESTROY then WM_NCDESTROY.
        if DestroyWindow(hwnd_to_destroy).is_err() {
            let err = GetLastError();
            if err != ERROR_INVALID_WINDOW_HANDLE {
                log::error!("WindowCommon: DestroyWindow failed for WinID {window_id:?}: {err:?}");
            }
        }
    }
    Ok(())
}
