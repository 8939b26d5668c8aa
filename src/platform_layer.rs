/*
 * The platform layer: platform-agnostic command/event types and docking layout,
 * plus the Win32 backend that executes commands against native controls. The
 * backend modules only exist on Windows; everything else builds everywhere.
 */
#[cfg(target_os = "windows")]
pub mod app;
#[cfg(target_os = "windows")]
pub(crate) mod command_executor;
#[cfg(target_os = "windows")]
pub(crate) mod controls;
pub mod error;
pub mod layout;
pub mod types;
#[cfg(target_os = "windows")]
pub(crate) mod window_common;

#[cfg(target_os = "windows")]
pub use app::PlatformInterface;
pub use error::{PlatformError, Result as PlatformResult};
pub use types::{
    AppEvent, ControlId, MessageSeverity, PlatformCommand, PlatformEventHandler,
    TreeItemDescriptor, TreeItemId, WindowConfig, WindowId,
};
