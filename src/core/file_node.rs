use std::path::{Path, PathBuf};

use crate::app_logic::handler::{PathToTreeItemIdMap, TreeItemIdToPathMap};
use crate::platform_layer::{TreeItemDescriptor, TreeItemId};

/*
 * Distinguishes the two kinds of entries that can appear in the browsing tree.
 * Anything that is neither a directory nor a PDF document is never represented.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    PdfFile,
}

/*
 * Represents one folder or PDF document in the browsing tree.
 * The tree is a snapshot of the file system taken at scan time; nothing keeps it
 * in sync with later changes. Children are only ever present on folders, which is
 * enforced by keeping the fields private and offering one constructor per kind.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct FileSystemNode {
    path: PathBuf,
    name: String,
    kind: NodeKind,
    children: Vec<FileSystemNode>, // Subfolders first, then PDF files
}

impl FileSystemNode {
    /*
     * Creates a folder node with the given, already ordered, children.
     * The display name is derived from the path's final component.
     */
    pub fn new_folder(path: PathBuf, children: Vec<FileSystemNode>) -> Self {
        FileSystemNode {
            name: Self::display_name_for(&path),
            path,
            kind: NodeKind::Folder,
            children,
        }
    }

    pub fn new_pdf_file(path: PathBuf) -> Self {
        FileSystemNode {
            name: Self::display_name_for(&path),
            path,
            kind: NodeKind::PdfFile,
            children: Vec::new(),
        }
    }

    /*
     * Returns the text shown for a path in the tree: its base name, or the full
     * path text when there is no base name (e.g. `C:\` or `/`).
     */
    pub fn display_name_for(path: &Path) -> String {
        match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => path.to_string_lossy().into_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn children(&self) -> &[FileSystemNode] {
        &self.children
    }

    /*
     * Searches this node and its descendants for the node at `target`.
     * Only subtrees whose path is a prefix of the target are visited.
     */
    pub fn find_node_by_path(&self, target: &Path) -> Option<&FileSystemNode> {
        if self.path == target {
            return Some(self);
        }
        if !target.starts_with(&self.path) {
            return None;
        }
        self.children
            .iter()
            .find_map(|child| child.find_node_by_path(target))
    }

    /*
     * Counts the folders below this node (excluding the node itself) and the PDF
     * documents anywhere in the subtree. Returned as `(folders, pdf_files)`.
     */
    pub fn count_descendants(&self) -> (usize, usize) {
        let mut folders = 0;
        let mut pdf_files = 0;
        for child in &self.children {
            match child.kind {
                NodeKind::Folder => {
                    folders += 1;
                    let (sub_folders, sub_files) = child.count_descendants();
                    folders += sub_folders;
                    pdf_files += sub_files;
                }
                NodeKind::PdfFile => pdf_files += 1,
            }
        }
        (folders, pdf_files)
    }

    fn new_tree_item_descriptor(
        &self,
        id: TreeItemId,
        children: Vec<TreeItemDescriptor>,
    ) -> TreeItemDescriptor {
        TreeItemDescriptor {
            id,
            is_folder: self.is_folder(),
            children,
            text: self.name.clone(),
        }
    }

    /*
     * Converts a slice of nodes into `TreeItemDescriptor`s for the platform layer,
     * assigning consecutive ids in pre-order and recording the id/path mapping in
     * both directions so selection events can be resolved back to nodes.
     */
    pub fn build_tree_item_descriptors_recursive(
        nodes: &[FileSystemNode],
        path_to_tree_item_id: &mut PathToTreeItemIdMap,
        tree_item_id_to_path: &mut TreeItemIdToPathMap,
        next_tree_item_id_counter: &mut u64,
    ) -> Vec<TreeItemDescriptor> {
        let mut descriptors = Vec::new();
        for node in nodes {
            let id_val = *next_tree_item_id_counter;
            *next_tree_item_id_counter += 1;
            let item_id = TreeItemId(id_val);

            path_to_tree_item_id.insert(node.path.clone(), item_id);
            tree_item_id_to_path.insert(item_id, node.path.clone());

            let children = Self::build_tree_item_descriptors_recursive(
                &node.children,
                path_to_tree_item_id,
                tree_item_id_to_path,
                next_tree_item_id_counter,
            );
            descriptors.push(node.new_tree_item_descriptor(item_id, children));
        }
        descriptors
    }
}
