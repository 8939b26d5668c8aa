/*
 * Defines shared constants for logical UI control identifiers and the fixed
 * geometry of the main window. These IDs are used by the `ui_description_layer`
 * to define the initial UI structure and by the `app_logic` (Presenter) to
 * target specific controls for dynamic updates. The `platform_layer` maps these
 * logical IDs to native UI element handles.
 */

use crate::platform_layer::types::ControlId;

// Logical ID for the folder/PDF TreeView.
pub const TREE_VIEW_ID: ControlId = ControlId::new(1001);

// Logical ID for the container hosting the document preview.
pub const PREVIEW_HOST_ID: ControlId = ControlId::new(1002);

// Logical ID for the label displaying status messages at the bottom of the window.
pub const STATUS_LABEL_ID: ControlId = ControlId::new(1003);

pub const APP_TITLE: &str = "PDF Explorer";

pub const MAIN_WINDOW_WIDTH: i32 = 1100;
pub const MAIN_WINDOW_HEIGHT: i32 = 720;
pub const TREE_VIEW_WIDTH: i32 = 320;
pub const STATUS_BAR_HEIGHT: i32 = 22;

pub const PREVIEW_PLACEHOLDER_TEXT: &str =
    "Select a PDF document in the tree to preview it here.\nUse File > Open Folder... to browse another folder.";

pub const FOLDER_PICKER_TITLE: &str = "Open Folder";
