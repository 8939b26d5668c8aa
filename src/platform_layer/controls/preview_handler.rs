/*
 * The document preview pane. A STATIC host control shows placeholder text
 * when no document is displayed, and acts as the parent window of the shell
 * preview handler registered for the document's file type when one is.
 *
 * Preview handlers are COM objects looked up through the file association
 * (ASSOCSTR_SHELLEXTENSION with the IPreviewHandler interface ID). A handler
 * is initialized from the file path when it supports IInitializeWithFile, and
 * from a read-only stream otherwise.
 */

use crate::platform_layer::app::Win32ApiInternalState;
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use crate::platform_layer::types::{ControlId, WindowId};
use crate::platform_layer::window_common::{SS_CENTER, SS_NOPREFIX, WC_STATIC};

use std::path::Path;
use std::sync::Arc;

use windows::{
    Win32::{
        Foundation::{HWND, LPARAM, RECT, WPARAM},
        Graphics::Gdi::{DEFAULT_GUI_FONT, GetStockObject, InvalidateRect},
        System::Com::{
            CLSCTX_INPROC_SERVER, CLSCTX_LOCAL_SERVER, CLSIDFromString, CoCreateInstance,
            STGM_READ, STGM_SHARE_DENY_NONE,
        },
        UI::Shell::{
            ASSOCF_INIT_DEFAULTTOSTAR, ASSOCSTR_SHELLEXTENSION, AssocQueryStringW, IPreviewHandler,
            PropertiesSystem::{IInitializeWithFile, IInitializeWithStream},
            SHCreateStreamOnFileEx,
        },
        UI::WindowsAndMessaging::{
            CreateWindowExW, GetClientRect, HMENU, SendMessageW, SetWindowTextW, WINDOW_EX_STYLE,
            WM_SETFONT, WS_CHILD, WS_CLIPCHILDREN, WS_VISIBLE,
        },
    },
    core::{GUID, HSTRING, Interface, PCWSTR, PWSTR, w},
};

// Interface ID of IPreviewHandler, as registered under a file type's shellex key.
const PREVIEW_HANDLER_SHELLEX_KEY: PCWSTR = w!("{8895b1c6-b41f-4c1c-a562-0d564250836f}");

pub(crate) struct PreviewHostState {
    control_id: ControlId,
    hwnd_host: HWND,
    active_handler: Option<IPreviewHandler>,
}

impl PreviewHostState {
    fn unload_active_handler(&mut self) {
        if let Some(handler) = self.active_handler.take() {
            unsafe {
                if let Err(e) = handler.Unload() {
                    log::warn!("PreviewHandler: IPreviewHandler::Unload failed: {e:?}");
                }
            }
        }
    }
}

fn host_client_rect(hwnd_host: HWND) -> PlatformResult<RECT> {
    let mut rect = RECT::default();
    unsafe { GetClientRect(hwnd_host, &mut rect)? };
    Ok(rect)
}

/*
 * Creates the STATIC control that hosts previews. Only one preview host per
 * window is supported.
 */
pub(crate) fn handle_create_preview_host_command(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    control_id: ControlId,
) -> PlatformResult<()> {
    log::debug!("PreviewHandler: handle_create_preview_host_command for WinID {window_id:?}, ControlID {control_id}");

    internal_state.with_window_data_write(window_id, |window_data| {
        if window_data.has_control(control_id) || window_data.preview_state.is_some() {
            return Err(PlatformError::ControlCreationFailed(format!(
                "Preview host {control_id} or existing preview state already present for window {window_id:?}"
            )));
        }
        let hwnd_parent = window_data.get_parent_hwnd(None)?;

        let hwnd_host = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                WC_STATIC,
                None,
                WS_CHILD | WS_VISIBLE | WS_CLIPCHILDREN | SS_CENTER | SS_NOPREFIX,
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
            SendMessageW(hwnd_host, WM_SETFONT, Some(WPARAM(h_font.0 as usize)), Some(LPARAM(1)));
        }

        window_data.register_control_hwnd(control_id, hwnd_host);
        window_data.preview_state = Some(PreviewHostState {
            control_id,
            hwnd_host,
            active_handler: None,
        });
        Ok(())
    })
}

/*
 * Removes the preview state from the window data so COM calls can be made
 * without holding the lock. Preview handlers may send messages to the host's
 * parent, which is our WndProc.
 */
fn take_preview_state(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    control_id: ControlId,
) -> PlatformResult<PreviewHostState> {
    internal_state.with_window_data_write(window_id, |window_data| {
        match window_data.preview_state.take() {
            Some(state) if state.control_id == control_id => Ok(state),
            other => {
                window_data.preview_state = other;
                Err(PlatformError::InvalidHandle(format!(
                    "Preview host {control_id} not found in WinID {window_id:?}"
                )))
            }
        }
    })
}

fn restore_preview_state(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    state: PreviewHostState,
) {
    let mut slot = Some(state);
    let _ = internal_state.with_window_data_write(window_id, |window_data| {
        window_data.preview_state = slot.take();
        Ok(())
    });
    if let Some(mut orphaned) = slot {
        // The window is gone; release whatever was still loaded.
        log::debug!("PreviewHandler: WinID {window_id:?} vanished, unloading preview.");
        orphaned.unload_active_handler();
    }
}

/*
 * Looks up the CLSID of the preview handler registered for `extension`
 * (including the leading dot).
 */
fn find_preview_handler_clsid(extension: &str) -> PlatformResult<GUID> {
    let mut buffer = [0u16; 64];
    let mut length = buffer.len() as u32;
    unsafe {
        AssocQueryStringW(
            ASSOCF_INIT_DEFAULTTOSTAR,
            ASSOCSTR_SHELLEXTENSION,
            &HSTRING::from(extension),
            PREVIEW_HANDLER_SHELLEX_KEY,
            Some(PWSTR(buffer.as_mut_ptr())),
            &mut length,
        )
        .ok()
        .map_err(|e| {
            PlatformError::OperationFailed(format!("No preview handler registered for '{extension}': {e}"))
        })?;
        Ok(CLSIDFromString(PCWSTR(buffer.as_ptr()))?)
    }
}

/*
 * Instantiates and initializes the preview handler for `path`, parented to
 * `hwnd_host` and sized to its client area, and renders the document.
 */
fn load_preview(hwnd_host: HWND, path: &Path) -> PlatformResult<IPreviewHandler> {
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let clsid = find_preview_handler_clsid(&extension)?;
    log::debug!("PreviewHandler: Using preview handler {clsid:?} for {path:?}.");

    let path_hstring = HSTRING::from(path.as_os_str());
    let grf_mode = (STGM_READ | STGM_SHARE_DENY_NONE).0;

    unsafe {
        let handler: IPreviewHandler =
            CoCreateInstance(&clsid, None, CLSCTX_INPROC_SERVER | CLSCTX_LOCAL_SERVER)?;

        if let Ok(with_file) = handler.cast::<IInitializeWithFile>() {
            with_file.Initialize(&path_hstring, grf_mode)?;
        } else {
            let with_stream: IInitializeWithStream = handler.cast()?;
            let stream = SHCreateStreamOnFileEx(&path_hstring, grf_mode, 0, false.into(), None)?;
            with_stream.Initialize(&stream, grf_mode)?;
        }

        let rect = host_client_rect(hwnd_host)?;
        handler.SetWindow(hwnd_host, &rect)?;
        handler.DoPreview()?;
        Ok(handler)
    }
}

/*
 * Handles `ShowDocumentPreview`: unloads whatever is shown and renders `path`.
 * If the document cannot be previewed, the host shows a short message instead.
 */
pub(crate) fn handle_show_document_preview_command(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    control_id: ControlId,
    path: &Path,
) -> PlatformResult<()> {
    log::debug!("PreviewHandler: Showing {path:?} in preview host {control_id} of WinID {window_id:?}.");
    let mut state = take_preview_state(internal_state, window_id, control_id)?;

    state.unload_active_handler();
    unsafe {
        let _ = SetWindowTextW(state.hwnd_host, &HSTRING::new());
    }

    let outcome = match load_preview(state.hwnd_host, path) {
        Ok(handler) => {
            state.active_handler = Some(handler);
            Ok(())
        }
        Err(e) => {
            log::error!("PreviewHandler: Could not preview {path:?}: {e}");
            let message = format!("Cannot preview {}", path.display());
            unsafe {
                let _ = SetWindowTextW(state.hwnd_host, &HSTRING::from(message));
            }
            Err(e)
        }
    };

    restore_preview_state(internal_state, window_id, state);
    outcome
}

/* Handles `ShowPreviewPlaceholder`: unloads any preview and shows `text`. */
pub(crate) fn handle_show_preview_placeholder_command(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    control_id: ControlId,
    text: &str,
) -> PlatformResult<()> {
    let mut state = take_preview_state(internal_state, window_id, control_id)?;
    state.unload_active_handler();
    unsafe {
        let _ = SetWindowTextW(state.hwnd_host, &HSTRING::from(text));
        _ = InvalidateRect(Some(state.hwnd_host), None, true);
    }
    restore_preview_state(internal_state, window_id, state);
    Ok(())
}

/* Keeps an active preview sized to its host after the host was moved. */
pub(crate) fn resize_active_preview(internal_state: &Arc<Win32ApiInternalState>, window_id: WindowId) {
    let target = internal_state.with_window_data_read(window_id, |window_data| {
        Ok(window_data
            .preview_state
            .as_ref()
            .and_then(|state| state.active_handler.clone().map(|handler| (handler, state.hwnd_host))))
    });
    let Ok(Some((handler, hwnd_host))) = target else {
        return;
    };
    match host_client_rect(hwnd_host) {
        Ok(rect) => unsafe {
            if let Err(e) = handler.SetRect(&rect) {
                log::warn!("PreviewHandler: IPreviewHandler::SetRect failed: {e:?}");
            }
        },
        Err(e) => log::warn!("PreviewHandler: Could not read preview host size: {e}"),
    }
}

/* Unloads the preview of a window that is being destroyed. */
pub(crate) fn release_preview_for_window(internal_state: &Arc<Win32ApiInternalState>, window_id: WindowId) {
    let state = internal_state
        .with_window_data_write(window_id, |window_data| Ok(window_data.preview_state.take()))
        .ok()
        .flatten();
    if let Some(mut state) = state {
        state.unload_active_handler();
    }
}
