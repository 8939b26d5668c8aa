/*
 * This module consolidates the core, platform-agnostic logic of the application.
 * It re-exports the tree data model (`FileSystemNode`) and the abstractions the
 * presenter depends on: `FileSystemReaderOperations` for raw directory listing,
 * `DirectoryIndexerOperations` for building the folder/PDF tree,
 * `SessionSettingsOperations` for the persisted last-folder setting, and the
 * pure selection dispatcher that decides whether a node can be previewed.
 */
pub mod config;
pub mod file_node;
pub mod file_system;
pub mod indexer;
pub mod path_utils;
pub mod selection;

// Re-export key structures and enums
pub use file_node::{FileSystemNode, NodeKind};

// Re-export file system related items
pub use file_system::{CoreFileSystemReader, FileSystemError, FileSystemReaderOperations};

pub use indexer::{CoreDirectoryIndexer, DirectoryIndexerOperations, PDF_FILE_PATTERN};

// Re-export config related items
pub use config::{ConfigError, CoreSessionSettingsStore, SessionSettingsOperations};

pub use selection::{PreviewDecision, decide_preview};
