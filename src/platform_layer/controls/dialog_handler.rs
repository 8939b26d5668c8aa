/*
 * Platform-specific dialog interactions. The application only needs a folder
 * picker, shown with the shell's `IFileOpenDialog` in folder mode. The outcome
 * is reported back to the application logic as an `AppEvent`.
 */

use crate::platform_layer::app::Win32ApiInternalState;
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use crate::platform_layer::types::{AppEvent, WindowId};

use std::ffi::c_void;
use std::path::PathBuf;
use std::sync::Arc;

use windows::{
    Win32::{
        Foundation::HWND,
        System::Com::{CLSCTX_INPROC_SERVER, CoCreateInstance, CoTaskMemFree},
        UI::Shell::{
            FOS_FORCEFILESYSTEM, FOS_PATHMUSTEXIST, FOS_PICKFOLDERS, FileOpenDialog,
            IFileOpenDialog, IShellItem, SHCreateItemFromParsingName, SIGDN_FILESYSPATH,
        },
    },
    core::HSTRING,
};

/*
 * Retrieves the owner HWND for a given WindowId, failing if the window has
 * no valid native handle.
 */
pub(crate) fn get_hwnd_owner(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
) -> PlatformResult<HWND> {
    internal_state.with_window_data_read(window_id, |window_data| {
        let hwnd = window_data.get_hwnd();
        if hwnd.is_invalid() {
            log::warn!("DialogHandler: Invalid HWND for WindowId {window_id:?}");
            return Err(PlatformError::InvalidHandle(format!(
                "HWND for WindowId {window_id:?} is invalid"
            )));
        }
        Ok(hwnd)
    })
}

/*
 * Runs the modal folder picker and returns the chosen folder, or None if the
 * user cancelled. `initial_dir` is only a suggestion; failing to apply it is logged.
 */
fn pick_folder(hwnd_owner: HWND, title: &str, initial_dir: Option<&PathBuf>) -> PlatformResult<Option<PathBuf>> {
    unsafe {
        let file_dialog: IFileOpenDialog = CoCreateInstance(&FileOpenDialog, None, CLSCTX_INPROC_SERVER)?;

        let options = file_dialog.GetOptions()?;
        file_dialog.SetOptions(options | FOS_PICKFOLDERS | FOS_FORCEFILESYSTEM | FOS_PATHMUSTEXIST)?;

        if let Err(e) = file_dialog.SetTitle(&HSTRING::from(title)) {
            log::error!("DialogHandler: IFileOpenDialog::SetTitle failed: {e:?}");
        }

        if let Some(dir_path) = initial_dir {
            let dir_hstring = HSTRING::from(dir_path.as_os_str());
            match SHCreateItemFromParsingName::<_, _, IShellItem>(&dir_hstring, None) {
                Ok(item) => {
                    if let Err(e) = file_dialog.SetFolder(&item) {
                        log::error!("DialogHandler: IFileOpenDialog::SetFolder failed: {e:?}");
                    }
                }
                Err(e) => {
                    log::warn!("DialogHandler: Initial folder {dir_path:?} is not usable: {e:?}");
                }
            }
        }

        // Show fails with ERROR_CANCELLED when the user dismisses the dialog.
        if file_dialog.Show(Some(hwnd_owner)).is_err() {
            log::debug!("DialogHandler: Folder picker cancelled.");
            return Ok(None);
        }

        let shell_item = file_dialog.GetResult()?;
        let pwstr_path = shell_item.GetDisplayName(SIGDN_FILESYSPATH)?;
        let path_string = pwstr_path.to_string().unwrap_or_default();
        CoTaskMemFree(Some(pwstr_path.as_ptr() as *const c_void));

        if path_string.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(path_string)))
        }
    }
}

/*
 * Handles the `ShowFolderPickerDialog` platform command.
 * Always answers with `AppEvent::FolderPickerDialogCompleted`, carrying None
 * when the dialog was cancelled or could not be shown.
 */
pub(crate) fn handle_show_folder_picker_dialog_command(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    title: String,
    initial_dir: Option<PathBuf>,
) -> PlatformResult<()> {
    log::debug!("DialogHandler: Showing folder picker. Title: '{title}', Initial Dir: {initial_dir:?}");
    let hwnd_owner = get_hwnd_owner(internal_state, window_id)?;

    let outcome = pick_folder(hwnd_owner, &title, initial_dir.as_ref());
    let path = match &outcome {
        Ok(path) => path.clone(),
        Err(e) => {
            log::error!("DialogHandler: Folder picker failed: {e}");
            None
        }
    };
    internal_state.send_event(AppEvent::FolderPickerDialogCompleted { window_id, path });
    outcome.map(|_| ())
}
