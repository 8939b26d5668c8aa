/*
 * Handlers for the native controls of the main window. Each module owns the
 * Win32 calls for one kind of control and is invoked by the command executor
 * or by the WndProc for the messages that control produces.
 */
pub(crate) mod dialog_handler;
pub(crate) mod label_handler;
pub(crate) mod menu_handler;
pub(crate) mod preview_handler;
pub(crate) mod treeview_handler;
