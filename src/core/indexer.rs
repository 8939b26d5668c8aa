/*
 * Builds the folder/PDF tree shown in the browsing pane.
 *
 * The traversal is a depth-first pre-order walk over a `FileSystemReaderOperations`
 * implementation: for every directory the subdirectories are visited first (each
 * becoming a folder node), then one node is appended per PDF document in that
 * directory. A directory whose contents the operating system refuses to list is
 * still part of the tree, just without children. Every other failure aborts the
 * scan and is returned to the caller, which keeps whatever tree it had before.
 */
use super::file_node::FileSystemNode;
use super::file_system::{FileSystemError, FileSystemReaderOperations, Result};
use std::path::Path;
use std::sync::Arc;

/* Glob used to select the documents listed in each folder. */
pub const PDF_FILE_PATTERN: &str = "*.pdf";

pub trait DirectoryIndexerOperations: Send + Sync {
    /*
     * Produces the tree rooted at `root_path`.
     * Fails with `FileSystemError::InvalidPath` when the root is not an existing
     * directory.
     */
    fn index_directory(&self, root_path: &Path) -> Result<FileSystemNode>;
}

pub struct CoreDirectoryIndexer {
    file_system: Arc<dyn FileSystemReaderOperations>,
}

impl CoreDirectoryIndexer {
    pub fn new(file_system: Arc<dyn FileSystemReaderOperations>) -> Self {
        CoreDirectoryIndexer { file_system }
    }

    fn build_directory_node(&self, dir_path: &Path) -> Result<FileSystemNode> {
        let mut children = Vec::new();

        let subdirectories = match self.file_system.list_subdirectories(dir_path) {
            Ok(paths) => paths,
            Err(e) if e.is_permission_denied() => {
                log::debug!("DirectoryIndexer: Access denied to {dir_path:?}, keeping it empty.");
                return Ok(FileSystemNode::new_folder(dir_path.to_path_buf(), children));
            }
            Err(e) => return Err(e),
        };
        for subdirectory in subdirectories {
            children.push(self.build_directory_node(&subdirectory)?);
        }

        match self.file_system.list_files(dir_path, PDF_FILE_PATTERN) {
            Ok(files) => children.extend(files.into_iter().map(FileSystemNode::new_pdf_file)),
            Err(e) if e.is_permission_denied() => {
                log::debug!("DirectoryIndexer: Access denied to files of {dir_path:?}, skipping them.");
            }
            Err(e) => return Err(e),
        }

        Ok(FileSystemNode::new_folder(dir_path.to_path_buf(), children))
    }
}

impl DirectoryIndexerOperations for CoreDirectoryIndexer {
    fn index_directory(&self, root_path: &Path) -> Result<FileSystemNode> {
        if !self.file_system.directory_exists(root_path) {
            return Err(FileSystemError::InvalidPath(root_path.to_path_buf()));
        }
        log::debug!("DirectoryIndexer: Scanning {root_path:?} for PDF documents.");

        let root = self.build_directory_node(root_path)?;

        let (folders, pdf_files) = root.count_descendants();
        log::debug!(
            "DirectoryIndexer: Scan of {root_path:?} complete. {folders} folders, {pdf_files} PDF documents."
        );
        Ok(root)
    }
}
