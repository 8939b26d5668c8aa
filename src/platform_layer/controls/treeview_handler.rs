/*
 * Win32 implementation of the folder TreeView: creation, population from
 * platform-agnostic `TreeItemDescriptor`s, and translation of selection
 * notifications into `AppEvent`s. `TreeViewInternalState` maps native
 * `HTREEITEM` handles back to application `TreeItemId`s.
 */
use crate::platform_layer::app::Win32ApiInternalState;
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use crate::platform_layer::types::{AppEvent, ControlId, TreeItemDescriptor, TreeItemId, WindowId};

use windows::{
    Win32::{
        Foundation::{GetLastError, HWND, LPARAM, WPARAM},
        UI::Controls::{
            HTREEITEM, NMHDR, NMTREEVIEWW, TVE_EXPAND, TVGN_CARET, TVI_LAST, TVI_ROOT,
            TVIF_CHILDREN, TVIF_PARAM, TVIF_TEXT, TVINSERTSTRUCTW, TVINSERTSTRUCTW_0, TVITEMEXW,
            TVITEMEXW_CHILDREN, TVM_DELETEITEM, TVM_EXPAND, TVM_INSERTITEMW, TVM_SELECTITEM,
            TVN_SELCHANGEDW, TVS_HASBUTTONS, TVS_HASLINES, TVS_LINESATROOT, TVS_SHOWSELALWAYS,
            WC_TREEVIEWW,
        },
        UI::WindowsAndMessaging::{
            CreateWindowExW, DestroyWindow, HMENU, SendMessageW, WINDOW_EX_STYLE, WINDOW_STYLE,
            WS_BORDER, WS_CHILD, WS_EX_CLIENTEDGE, WS_TABSTOP, WS_VISIBLE,
        },
    },
    core::PWSTR,
};

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct TreeViewInternalState {
    control_id: ControlId,
    htreeitem_to_item_id: HashMap<isize, TreeItemId>,
}

impl TreeViewInternalState {
    pub(crate) fn new(control_id: ControlId) -> Self {
        Self {
            control_id,
            htreeitem_to_item_id: HashMap::new(),
        }
    }

    fn clear_items_impl(&mut self, hwnd_treeview: HWND) {
        unsafe {
            SendMessageW(
                hwnd_treeview,
                TVM_DELETEITEM,
                Some(WPARAM(0)),
                Some(LPARAM(TVI_ROOT.0)), // Deletes every item
            );
        }
        self.htreeitem_to_item_id.clear();
    }

    fn add_item_recursive_impl(
        &mut self,
        hwnd_treeview: HWND,
        h_parent_native: HTREEITEM,
        item_desc: &TreeItemDescriptor,
    ) -> PlatformResult<HTREEITEM> {
        let mut text_buffer: Vec<u16> = item_desc.text.encode_utf16().collect();
        text_buffer.push(0);

        let tv_item = TVITEMEXW {
            mask: TVIF_TEXT | TVIF_PARAM | TVIF_CHILDREN,
            hItem: HTREEITEM::default(),
            pszText: PWSTR(text_buffer.as_mut_ptr()),
            cchTextMax: text_buffer.len() as i32,
            lParam: LPARAM(item_desc.id.0 as isize),
            cChildren: TVITEMEXW_CHILDREN(if item_desc.is_folder && !item_desc.children.is_empty() { 1 } else { 0 }),
            ..Default::default()
        };

        let tv_insert_struct = TVINSERTSTRUCTW {
            hParent: h_parent_native,
            hInsertAfter: TVI_LAST,
            Anonymous: TVINSERTSTRUCTW_0 { itemex: tv_item },
        };

        let h_item = HTREEITEM(
            unsafe {
                SendMessageW(
                    hwnd_treeview,
                    TVM_INSERTITEMW,
                    Some(WPARAM(0)),
                    Some(LPARAM(&tv_insert_struct as *const _ as isize)),
                )
            }
            .0,
        );

        if h_item.0 == 0 {
            return Err(PlatformError::ControlCreationFailed(format!(
                "Failed to insert TreeView item '{}': {:?}",
                item_desc.text,
                unsafe { GetLastError() }
            )));
        }

        self.htreeitem_to_item_id.insert(h_item.0, item_desc.id);

        for child_desc in &item_desc.children {
            self.add_item_recursive_impl(hwnd_treeview, h_item, child_desc)?;
        }
        Ok(h_item)
    }
}

/*
 * Creates the native TreeView and its empty internal state. Only one TreeView
 * per window is supported.
 */
pub(crate) fn handle_create_treeview_command(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    control_id: ControlId,
) -> PlatformResult<()> {
    log::debug!("TreeViewHandler: handle_create_treeview_command for WinID {window_id:?}, ControlID {control_id}");

    // Phase 1: checks and parent handle under the read lock.
    let hwnd_parent = internal_state.with_window_data_read(window_id, |window_data| {
        if window_data.has_control(control_id) || window_data.treeview_state.is_some() {
            log::warn!(
                "TreeViewHandler: TreeView with ID {control_id} or existing TreeView state already present for window {window_id:?}."
            );
            return Err(PlatformError::ControlCreationFailed(format!(
                "TreeView with ID {control_id} or existing TreeView state already present for window {window_id:?}"
            )));
        }
        window_data.get_parent_hwnd(None)
    })?;

    // Phase 2: create the control without holding the lock.
    let tvs_style = WINDOW_STYLE(TVS_HASLINES | TVS_LINESATROOT | TVS_HASBUTTONS | TVS_SHOWSELALWAYS);
    let hwnd_tv = unsafe {
        CreateWindowExW(
            WS_EX_CLIENTEDGE,
            WC_TREEVIEWW,
            None,
            WS_CHILD | WS_VISIBLE | WS_BORDER | WS_TABSTOP | tvs_style,
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

    // Phase 3: register under the write lock.
    internal_state
        .with_window_data_write(window_id, |window_data| {
            window_data.register_control_hwnd(control_id, hwnd_tv);
            window_data.treeview_state = Some(TreeViewInternalState::new(control_id));
            Ok(())
        })
        .inspect_err(|_| unsafe {
            DestroyWindow(hwnd_tv).ok();
        })?;

    log::debug!("TreeViewHandler: Created TreeView (ID {control_id}) for window {window_id:?} with HWND {hwnd_tv:?}");
    Ok(())
}

/*
 * Replaces the whole content of the TreeView with `items`. The top-level items
 * are expanded and the selection is cleared.
 *
 * The internal state is taken out of the window data while the control is
 * manipulated, because the control sends notifications (TVN_SELCHANGEDW while
 * deleting) back into the WndProc. Those find no state and are ignored.
 */
pub(crate) fn populate_treeview(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    control_id: ControlId,
    items: Vec<TreeItemDescriptor>,
) -> PlatformResult<()> {
    log::debug!(
        "TreeViewHandler: populate_treeview for WinID {window_id:?}, ControlID {control_id}, {} top-level items",
        items.len()
    );

    // Phase 1: take the state.
    let (hwnd_treeview, mut tv_state) = internal_state.with_window_data_write(window_id, |window_data| {
        let hwnd = window_data.get_control_hwnd(control_id).ok_or_else(|| {
            log::warn!("TreeViewHandler: TreeView {control_id} not found in WinID {window_id:?} before populating.");
            PlatformError::InvalidHandle(format!(
                "TreeView {control_id} not found in WinID {window_id:?} before populating"
            ))
        })?;
        let state = window_data
            .treeview_state
            .take()
            .unwrap_or_else(|| TreeViewInternalState::new(control_id));
        Ok((hwnd, state))
    })?;

    // Phase 2: rebuild the native items without the lock.
    tv_state.clear_items_impl(hwnd_treeview);
    let mut outcome = Ok(());
    for item_desc in &items {
        match tv_state.add_item_recursive_impl(hwnd_treeview, TVI_ROOT, item_desc) {
            Ok(h_item) => unsafe {
                SendMessageW(
                    hwnd_treeview,
                    TVM_EXPAND,
                    Some(WPARAM(TVE_EXPAND.0 as usize)),
                    Some(LPARAM(h_item.0)),
                );
            },
            Err(e) => {
                log::error!("TreeViewHandler: Populating TreeView {control_id} failed: {e}");
                outcome = Err(e);
                break;
            }
        }
    }
    unsafe {
        SendMessageW(hwnd_treeview, TVM_SELECTITEM, Some(WPARAM(TVGN_CARET as usize)), Some(LPARAM(0)));
    }

    // Phase 3: put the state back.
    internal_state.with_window_data_write(window_id, |window_data| {
        window_data.treeview_state = Some(tv_state);
        Ok(())
    })?;
    outcome
}

/*
 * Translates TVN_SELCHANGEDW from the window's TreeView into
 * `AppEvent::TreeViewItemSelectionChanged`. Other notifications yield None.
 */
pub(crate) fn handle_treeview_notification(
    internal_state: &Arc<Win32ApiInternalState>,
    window_id: WindowId,
    nmhdr: &NMHDR,
    lparam: LPARAM,
) -> Option<AppEvent> {
    if nmhdr.code != TVN_SELCHANGEDW {
        return None;
    }
    let nmtv = unsafe { &*(lparam.0 as *const NMTREEVIEWW) };
    let h_new = nmtv.itemNew.hItem;

    let lookup = internal_state.with_window_data_read(window_id, |window_data| {
        let Some(tv_state) = window_data.treeview_state.as_ref() else {
            return Ok(None);
        };
        if nmhdr.idFrom != tv_state.control_id.raw() as usize {
            return Ok(None);
        }
        Ok(Some(tv_state.htreeitem_to_item_id.get(&h_new.0).copied()))
    });

    match lookup {
        Ok(Some(item_id)) => {
            log::trace!("TreeViewHandler: Selection changed to {item_id:?} in WinID {window_id:?}.");
            Some(AppEvent::TreeViewItemSelectionChanged { window_id, item_id })
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("TreeViewHandler: Ignoring selection change in WinID {window_id:?}: {e}");
            None
        }
    }
}
