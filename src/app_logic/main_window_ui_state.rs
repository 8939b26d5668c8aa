/*
 * This module defines the MainWindowUiState struct.
 * MainWindowUiState holds the state tied to the main application window: the
 * window identifier, the folder/PDF tree currently shown, and the mappings
 * between tree nodes and the `TreeItemId`s handed to the platform layer.
 */
use crate::core::FileSystemNode;
use crate::platform_layer::{TreeItemDescriptor, TreeItemId, WindowId};
use std::collections::HashMap;
use std::path::Path;

use super::handler::{PathToTreeItemIdMap, TreeItemIdToPathMap};
use super::ui_constants::APP_TITLE;

/*
 * Holds UI-specific state for the main application window.
 * The tree and both id maps always describe the same snapshot: they are only
 * ever replaced together by `replace_tree`.
 */
#[derive(Debug)]
pub struct MainWindowUiState {
    /* The unique identifier for the main application window. */
    pub window_id: WindowId,
    /* The tree currently shown, or `None` before the first successful load. */
    pub current_tree: Option<FileSystemNode>,
    pub path_to_tree_item_id: PathToTreeItemIdMap,
    pub tree_item_id_to_path: TreeItemIdToPathMap,
    /* A counter to generate unique TreeItemIds for the tree view. */
    pub next_tree_item_id_counter: u64,
}

impl MainWindowUiState {
    pub fn new(window_id: WindowId) -> Self {
        log::debug!("MainWindowUiState::new called for window_id: {window_id:?}");
        MainWindowUiState {
            window_id,
            current_tree: None,
            path_to_tree_item_id: HashMap::new(),
            tree_item_id_to_path: HashMap::new(),
            next_tree_item_id_counter: 1,
        }
    }

    /*
     * Makes `tree` the current tree and returns the descriptors to show for it.
     * The root folder itself is the single top-level item. Item ids restart at 1
     * and the previous mappings are discarded.
     */
    pub fn replace_tree(&mut self, tree: FileSystemNode) -> Vec<TreeItemDescriptor> {
        self.path_to_tree_item_id.clear();
        self.tree_item_id_to_path.clear();
        self.next_tree_item_id_counter = 1;

        let descriptors = FileSystemNode::build_tree_item_descriptors_recursive(
            std::slice::from_ref(&tree),
            &mut self.path_to_tree_item_id,
            &mut self.tree_item_id_to_path,
            &mut self.next_tree_item_id_counter,
        );
        self.current_tree = Some(tree);
        descriptors
    }

    pub fn current_root(&self) -> Option<&Path> {
        self.current_tree.as_ref().map(|tree| tree.path())
    }

    /* Resolves a tree item back to its node in the current tree. */
    pub fn node_for_item(&self, item_id: TreeItemId) -> Option<&FileSystemNode> {
        let path = self.tree_item_id_to_path.get(&item_id)?;
        self.current_tree.as_ref()?.find_node_by_path(path)
    }

    pub fn compose_window_title(root: Option<&Path>) -> String {
        match root {
            Some(path) => format!("{APP_TITLE} - {}", path.display()),
            None => APP_TITLE.to_string(),
        }
    }

    pub fn compose_status_text(tree: &FileSystemNode) -> String {
        let (folders, pdf_files) = tree.count_descendants();
        let folder_word = if folders == 1 { "folder" } else { "folders" };
        let document_word = if pdf_files == 1 {
            "PDF document"
        } else {
            "PDF documents"
        };
        format!("{folders} {folder_word}, {pdf_files} {document_word}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_tree(root: &str) -> FileSystemNode {
        let root = PathBuf::from(root);
        FileSystemNode::new_folder(
            root.clone(),
            vec![
                FileSystemNode::new_folder(
                    root.join("A"),
                    vec![FileSystemNode::new_pdf_file(root.join("A").join("a.pdf"))],
                ),
                FileSystemNode::new_pdf_file(root.join("b.pdf")),
            ],
        )
    }

    #[test]
    fn test_replace_tree_maps_every_node_with_root_as_single_top_item() {
        // Arrange
        let mut ui_state = MainWindowUiState::new(WindowId(1));

        // Act
        let descriptors = ui_state.replace_tree(sample_tree("/r"));

        // Assert
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].text, "r");
        assert!(descriptors[0].is_folder);
        assert_eq!(descriptors[0].children.len(), 2);
        assert_eq!(ui_state.tree_item_id_to_path.len(), 4);
        assert_eq!(ui_state.path_to_tree_item_id.len(), 4);
        assert_eq!(ui_state.current_root(), Some(Path::new("/r")));

        let a_pdf_id = ui_state.path_to_tree_item_id[&PathBuf::from("/r/A/a.pdf")];
        let node = ui_state.node_for_item(a_pdf_id).unwrap();
        assert_eq!(node.name(), "a.pdf");
    }

    #[test]
    fn test_replace_tree_discards_previous_mappings() {
        let mut ui_state = MainWindowUiState::new(WindowId(1));
        ui_state.replace_tree(sample_tree("/old"));
        let stale_id = ui_state.path_to_tree_item_id[&PathBuf::from("/old/b.pdf")];

        ui_state.replace_tree(FileSystemNode::new_folder(PathBuf::from("/new"), Vec::new()));

        assert_eq!(ui_state.tree_item_id_to_path.len(), 1);
        assert!(!ui_state.path_to_tree_item_id.contains_key(&PathBuf::from("/old/b.pdf")));
        assert!(ui_state.node_for_item(stale_id).is_none());
        assert_eq!(ui_state.next_tree_item_id_counter, 2);
    }

    #[test]
    fn test_node_for_unknown_item_is_none() {
        let mut ui_state = MainWindowUiState::new(WindowId(1));
        assert!(ui_state.node_for_item(TreeItemId(1)).is_none());
        ui_state.replace_tree(sample_tree("/r"));
        assert!(ui_state.node_for_item(TreeItemId(999)).is_none());
    }

    #[test]
    fn test_compose_window_title() {
        assert_eq!(MainWindowUiState::compose_window_title(None), "PDF Explorer");
        assert_eq!(
            MainWindowUiState::compose_window_title(Some(Path::new("/home/user/Papers"))),
            "PDF Explorer - /home/user/Papers"
        );
    }

    #[test]
    fn test_compose_status_text_counts_descendants() {
        assert_eq!(
            MainWindowUiState::compose_status_text(&sample_tree("/r")),
            "1 folder, 2 PDF documents"
        );
        let empty = FileSystemNode::new_folder(PathBuf::from("/empty"), Vec::new());
        assert_eq!(
            MainWindowUiState::compose_status_text(&empty),
            "0 folders, 0 PDF documents"
        );
    }
}
