/*
 * Label controls (STATIC controls in Win32): creation, text updates and the
 * severity-based coloring applied through WM_CTLCOLORSTATIC.
 */

use crate::platform_layer::{
    app::Win32ApiInternalState,
    error::{PlatformError, Result as PlatformResult},
    types::{ControlId, MessageSeverity, WindowId},
    window_common::{SS_LEFT, SS_NOPREFIX, WC_STATIC},
};

use std::sync::Arc;
use windows::{
    Win32::{
        Foundation::{COLORREF, GetLastError, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{
            COLOR_WINDOW, COLOR_WINDOWTEXT, DEFAULT_GUI_FONT, GetStockObject, GetSysColor,
            GetSysColorBrush, HBRUSH, HDC, InvalidateRect, SetBkMode, SetTextColor, TRANSPARENT,
        },
        UI::WindowsAndMessaging::{
            CreateWindowExW, GetDlgCtrlID, HMENU, SendMessageW, SetWindowTextW, WINDOW_EX_STYLE,
            WM_SETFONT, WS_CHILD, WS_VISIBLE,
        },
    },
    core::HSTRING,
};

fn severity_text_color(severity: MessageSeverity) -> COLORREF {
    match severity {
        MessageSeverity::Error => COLORREF(0x000000FF), // Red
        MessageSeverity::Warning => COLORREF(0x000080C0), // Dark orange
        MessageSeverity::Information => COLORREF(unsafe { GetSysColor(COLOR_WINDOWTEXT) }),
    }
}

/*
 * Creates a native label inside the window or inside a parent control. The
 * new label is registered with its logical ID and starts at Information severity.
 */
pub(crate) fn handle_create_label_command(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    parent_control_id: Option<ControlId>,
    control_id: ControlId,
    initial_text: String,
) -> PlatformResult<()> {
    log::debug!(
        "LabelHandler: handle_create_label_command for WinID {window_id:?}, ControlID: {control_id}, Parent: {parent_control_id:?}, Text: '{initial_text}'",
    );

    internal_state.with_window_data_write(window_id, |window_data| {
        if window_data.has_control(control_id) {
            log::warn!("LabelHandler: Label with logical ID {control_id} already exists for window {window_id:?}.");
            return Err(PlatformError::ControlCreationFailed(format!(
                "Label with logical ID {control_id} already exists for window {window_id:?}"
            )));
        }

        let hwnd_parent = window_data.get_parent_hwnd(parent_control_id)?;

        let hwnd_label = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                WC_STATIC,
                &HSTRING::from(initial_text.as_str()),
                WS_CHILD | WS_VISIBLE | SS_LEFT | SS_NOPREFIX,
                0,
                0,
                10,
                10, // Layout rules set the real geometry
                Some(hwnd_parent),
                Some(HMENU(control_id.raw() as isize as *mut _)),
                Some(internal_state.h_instance()),
                None,
            )?
        };

        unsafe {
            let h_font = GetStockObject(DEFAULT_GUI_FONT);
            SendMessageW(hwnd_label, WM_SETFONT, Some(WPARAM(h_font.0 as usize)), Some(LPARAM(1)));
        }

        window_data.register_control_hwnd(control_id, hwnd_label);
        window_data.set_label_severity(control_id, MessageSeverity::Information);
        log::debug!("LabelHandler: Created label {control_id} for WinID {window_id:?} with HWND {hwnd_label:?}");
        Ok(())
    })
}

/*
 * Updates a label's text and severity. The severity is recorded under the write
 * lock; the lock is released before SetWindowTextW, which synchronously sends
 * messages back into the WndProc.
 */
pub(crate) fn handle_update_label_text_command(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    control_id: ControlId,
    text: String,
    severity: MessageSeverity,
) -> PlatformResult<()> {
    log::debug!(
        "LabelHandler: UpdateLabelText for WinID {window_id:?}, ControlID: {control_id}, Text: '{text}', Severity: {severity:?}"
    );

    let hwnd_label = internal_state.with_window_data_write(window_id, |window_data| {
        let hwnd = window_data.get_control_hwnd(control_id).ok_or_else(|| {
            log::warn!("LabelHandler: Label {control_id} not found for UpdateLabelText in WinID {window_id:?}.");
            PlatformError::InvalidHandle(format!(
                "Label {control_id} not found for UpdateLabelText in WinID {window_id:?}"
            ))
        })?;
        window_data.set_label_severity(control_id, severity);
        Ok(hwnd)
    })?;

    unsafe {
        if SetWindowTextW(hwnd_label, &HSTRING::from(text.as_str())).is_err() {
            let last_error = GetLastError();
            log::error!("LabelHandler: SetWindowTextW for label {control_id} failed: {last_error:?}");
            return Err(PlatformError::OperationFailed(format!(
                "SetWindowTextW for label {control_id} failed: {last_error:?}"
            )));
        }
        // Repaint so WM_CTLCOLORSTATIC picks up the new severity.
        _ = InvalidateRect(Some(hwnd_label), None, true);
    }
    Ok(())
}

/*
 * Colors a label according to its last reported severity. Returns None for
 * STATIC controls that are not severity-tracked labels, leaving them to the system.
 */
pub(crate) fn handle_wm_ctlcolorstatic(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    hdc_static_ctrl: HDC,
    hwnd_static_ctrl: HWND,
) -> Option<LRESULT> {
    let raw_id = unsafe { GetDlgCtrlID(hwnd_static_ctrl) };
    if raw_id == 0 {
        return None;
    }
    let control_id = ControlId::new(raw_id);

    let severity = internal_state
        .with_window_data_read(window_id, |window_data| Ok(window_data.get_label_severity(control_id)))
        .ok()
        .flatten()?;

    unsafe {
        SetTextColor(hdc_static_ctrl, severity_text_color(severity));
        SetBkMode(hdc_static_ctrl, TRANSPARENT);
        let brush: HBRUSH = GetSysColorBrush(COLOR_WINDOW);
        Some(LRESULT(brush.0 as isize))
    }
}
