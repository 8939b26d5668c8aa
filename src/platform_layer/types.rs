/*
 * This module defines core data types used for communication between the
 * application logic and the platform layer. It includes identifiers for windows,
 * controls and tree items, configurations for UI elements (windows, menus,
 * layout), platform-agnostic event types (`AppEvent`), commands for the platform
 * layer (`PlatformCommand`), severity levels for status messages
 * (`MessageSeverity`), and semantic identifiers for menu actions (`MenuAction`).
 * It also defines the `PlatformEventHandler` trait that the application logic
 * must implement.
 *
 * Nothing here depends on a native toolkit, so the types compile on every target.
 */

use std::path::PathBuf;

// An opaque identifier for a native window, managed by the platform layer.
//
// The application logic layer uses this ID to refer to specific windows
// when sending commands or receiving events, without needing to know about
// native window handles like HWND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub(crate) usize);

// An opaque identifier for an item within a tree-like control (e.g., TreeView).
//
// This ID is generated and managed by the application logic layer and used to
// uniquely identify tree items in commands and events. The platform layer
// maps this to native tree item handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeItemId(pub u64);

/*
 * A logical identifier for a control inside a window.
 * Assigned by the UI description (see `app_logic::ui_constants`) and mapped by
 * the platform layer to native handles. On Win32 the raw value doubles as the
 * control's dialog ID, so it must fit in 16 bits and never be 0.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(i32);

impl ControlId {
    pub const fn new(raw_id: i32) -> Self {
        ControlId(raw_id)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Semantic Menu Action Identifiers ---

/*
 * Represents logical menu actions in a platform-agnostic way.
 * This enum is used in `MenuItemConfig` and `AppEvent` to identify menu
 * actions semantically, rather than relying on raw native command IDs.
 * The platform layer manages the mapping from these actions to
 * dynamically assigned native menu item IDs.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    OpenFolder,
    Exit,
}

// --- Data Structures for UI Description (Platform-Agnostic) ---

// Configuration for creating a new native window.
#[derive(Debug, Clone)]
pub struct WindowConfig<'a> {
    pub title: &'a str,
    pub width: i32,
    pub height: i32,
}

// Describes a single item to be displayed in a tree-like control.
//
// This structure is used by the application logic to define the content
// and hierarchy of a tree view, which the platform layer then renders.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeItemDescriptor {
    pub id: TreeItemId,
    pub text: String,
    pub is_folder: bool,
    pub children: Vec<TreeItemDescriptor>,
}

/*
 * Configuration for a single menu item, used by `PlatformCommand::CreateMainMenu`.
 * Menu items that are themselves popups (e.g., a "File" menu that opens a
 * submenu) have `action: None`.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemConfig {
    pub action: Option<MenuAction>,
    pub text: String,
    pub children: Vec<MenuItemConfig>, // For submenus
}

// --- Layout Primitives ---

/*
 * Defines how a control docks within its parent container.
 * Edge docks consume a fixed-size strip from the remaining area; `Fill` takes
 * whatever is left once every edge dock of the same parent has been applied.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DockStyle {
    Top,
    Bottom,
    Left,
    Right,
    Fill,
}

/*
 * A rule that associates a control with a docking style.
 * Rules are applied in ascending `order`. `parent_control_id` of `None` means the
 * window's client area is the container.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRule {
    pub control_id: ControlId,
    pub parent_control_id: Option<ControlId>,
    pub dock_style: DockStyle,
    pub order: u32,
    pub fixed_size: Option<i32>, // Height for Top/Bottom, width for Left/Right. Unused for Fill.
    pub margin: (i32, i32, i32, i32), // (top, right, bottom, left)
}

// --- Events from Platform to App Logic ---

/*
 * Represents platform-agnostic UI events generated by the native toolkit.
 * The platform layer translates native OS events into these types and
 * sends them to the application logic layer for handling.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    WindowCloseRequestedByUser {
        window_id: WindowId,
    },
    // Signals that a window has been resized. Layout is handled by the platform layer.
    WindowResized {
        window_id: WindowId,
        width: i32,
        height: i32,
    },
    // Signals that a window and its native resources have been destroyed.
    // The `WindowId` should be considered invalid after this event.
    WindowDestroyed {
        window_id: WindowId,
    },
    // The focused item of a tree view changed. `None` when the selection was cleared.
    TreeViewItemSelectionChanged {
        window_id: WindowId,
        item_id: Option<TreeItemId>,
    },
    MenuActionClicked {
        action: MenuAction,
    },
    FolderPickerDialogCompleted {
        window_id: WindowId,
        path: Option<PathBuf>,
    },
    // Signals that the initial static UI setup for the main window is complete.
    MainWindowUISetupComplete {
        window_id: WindowId,
    },
}

// Severity of a status message. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

// Represents platform-agnostic commands sent from the application logic to the platform layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCommand {
    SetWindowTitle {
        window_id: WindowId,
        title: String,
    },
    ShowWindow {
        window_id: WindowId,
    },
    CloseWindow {
        window_id: WindowId,
    },
    QuitApplication,
    CreateMainMenu {
        window_id: WindowId,
        menu_items: Vec<MenuItemConfig>,
    },
    CreateTreeView {
        window_id: WindowId,
        control_id: ControlId,
    },
    CreateLabel {
        window_id: WindowId,
        parent_control_id: Option<ControlId>,
        control_id: ControlId,
        initial_text: String,
    },
    // A container that shows either placeholder text or a document preview.
    CreatePreviewHost {
        window_id: WindowId,
        control_id: ControlId,
    },
    DefineLayout {
        window_id: WindowId,
        rules: Vec<LayoutRule>,
    },
    // Replaces the whole content of the tree view.
    PopulateTreeView {
        window_id: WindowId,
        control_id: ControlId,
        items: Vec<TreeItemDescriptor>,
    },
    UpdateLabelText {
        window_id: WindowId,
        control_id: ControlId,
        text: String,
        severity: MessageSeverity,
    },
    ShowFolderPickerDialog {
        window_id: WindowId,
        title: String,
        initial_dir: Option<PathBuf>,
    },
    // Hands a document to the preview host; any previous preview is released first.
    ShowDocumentPreview {
        window_id: WindowId,
        control_id: ControlId,
        path: PathBuf,
    },
    ShowPreviewPlaceholder {
        window_id: WindowId,
        control_id: ControlId,
        text: String,
    },
    // Signals to the platform layer that all initial UI description commands
    // for the main window have been enqueued.
    SignalMainWindowUISetupComplete {
        window_id: WindowId,
    },
}

// --- Trait for App Logic to Handle Events ---

// A trait to be implemented by the application logic layer to handle UI events.
pub trait PlatformEventHandler: Send + Sync + 'static {
    // Called by the platform layer when a native UI event has been processed.
    // The implementor handles the event and enqueues `PlatformCommand`s
    // for the platform layer to execute.
    fn handle_event(&mut self, event: AppEvent);

    // Called by the platform layer when the application is about to exit its main loop.
    fn on_quit(&mut self) {}

    // Attempts to dequeue a single `PlatformCommand` from the internal queue.
    // This is called by the platform layer's run loop.
    fn try_dequeue_command(&mut self) -> Option<PlatformCommand>;
}
