/*
 * Decides what the preview pane should do when the tree selection changes.
 * The decision is a pure function of the selected node and the current state of
 * the file system: the cached node is never trusted on its own, so a document that
 * was deleted or renamed after the scan is not handed to the preview.
 */
use super::file_node::{FileSystemNode, NodeKind};
use super::file_system::FileSystemReaderOperations;
use std::path::{Path, PathBuf};

const PDF_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewDecision {
    NoAction,
    Display(PathBuf),
}

pub fn decide_preview(
    selected: Option<&FileSystemNode>,
    file_system: &dyn FileSystemReaderOperations,
) -> PreviewDecision {
    let Some(node) = selected else {
        return PreviewDecision::NoAction;
    };
    if node.kind() != NodeKind::PdfFile {
        return PreviewDecision::NoAction;
    }

    let path = node.path();
    if !has_pdf_extension(path) {
        log::debug!("SelectionDispatcher: {path:?} is not a PDF document, ignoring.");
        return PreviewDecision::NoAction;
    }
    if !file_system.file_exists(path) {
        log::debug!("SelectionDispatcher: {path:?} no longer exists, ignoring.");
        return PreviewDecision::NoAction;
    }
    PreviewDecision::Display(path.to_path_buf())
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(PDF_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_system::CoreFileSystemReader;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_no_selection_is_no_action() {
        let reader = CoreFileSystemReader::new();
        assert_eq!(decide_preview(None, &reader), PreviewDecision::NoAction);
    }

    #[test]
    fn test_folder_selection_is_no_action() {
        let dir = tempdir().unwrap();
        // Even a folder named like a document is never previewed.
        let folder_path = dir.path().join("looks_like.pdf");
        fs::create_dir(&folder_path).unwrap();
        let node = FileSystemNode::new_folder(folder_path, Vec::new());
        let reader = CoreFileSystemReader::new();

        assert_eq!(decide_preview(Some(&node), &reader), PreviewDecision::NoAction);
    }

    #[test]
    fn test_existing_pdf_is_displayed_every_time_it_is_selected() {
        let dir = tempdir().unwrap();
        let pdf_path = dir.path().join("Guide.PDF");
        File::create(&pdf_path).unwrap();
        let node = FileSystemNode::new_pdf_file(pdf_path.clone());
        let reader = CoreFileSystemReader::new();

        let first = decide_preview(Some(&node), &reader);
        let second = decide_preview(Some(&node), &reader);

        assert_eq!(first, PreviewDecision::Display(pdf_path));
        assert_eq!(first, second);
    }

    #[test]
    fn test_deleted_pdf_is_no_action() {
        let dir = tempdir().unwrap();
        let pdf_path = dir.path().join("gone.pdf");
        File::create(&pdf_path).unwrap();
        let node = FileSystemNode::new_pdf_file(pdf_path.clone());
        fs::remove_file(&pdf_path).unwrap();
        let reader = CoreFileSystemReader::new();

        assert_eq!(decide_preview(Some(&node), &reader), PreviewDecision::NoAction);
    }

    #[test]
    fn test_pdf_node_without_pdf_extension_is_no_action() {
        let dir = tempdir().unwrap();
        let odd_path = dir.path().join("notes.txt");
        File::create(&odd_path).unwrap();
        let node = FileSystemNode::new_pdf_file(odd_path);
        let reader = CoreFileSystemReader::new();

        assert_eq!(decide_preview(Some(&node), &reader), PreviewDecision::NoAction);
    }

    #[test]
    fn test_has_pdf_extension() {
        assert!(has_pdf_extension(Path::new("/a/b.pdf")));
        assert!(has_pdf_extension(Path::new("/a/B.Pdf")));
        assert!(!has_pdf_extension(Path::new("/a/b.pdfx")));
        assert!(!has_pdf_extension(Path::new("/a/pdf")));
    }
}
