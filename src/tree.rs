use crate::store::{EntryHandle, EntryKind};
use serde::Serialize;
use std::collections::HashMap;

/// Items are keyed by the base name of their entry.
pub type TreeItemId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNodeKind {
    File,
    Directory { children: Vec<TreeItemId> },
}

/// One file or directory of the note tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: TreeItemId,
    pub kind: TreeNodeKind,
    pub handle: EntryHandle,
    pub can_move: bool,
    pub can_rename: bool,
}

impl TreeNode {
    /// Build a childless node for a store entry.
    pub fn from_handle(handle: EntryHandle) -> TreeNode {
        let kind = match handle.kind() {
            EntryKind::File => TreeNodeKind::File,
            EntryKind::Directory => TreeNodeKind::Directory {
                children: Vec::new(),
            },
        };
        TreeNode {
            id: handle.name(),
            kind,
            handle,
            can_move: true,
            can_rename: true,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, TreeNodeKind::Directory { .. })
    }

    /// Child ids in display order. Always empty for files.
    pub fn children(&self) -> &[TreeItemId] {
        match &self.kind {
            TreeNodeKind::File => &[],
            TreeNodeKind::Directory { children } => children,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<TreeItemId>> {
        match &mut self.kind {
            TreeNodeKind::File => None,
            TreeNodeKind::Directory { children } => Some(children),
        }
    }
}

/// Wire form of a [`TreeNode`], shaped after what tree-view widgets expect.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeItemView {
    pub index: TreeItemId,
    pub is_folder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeItemId>>,
    pub can_move: bool,
    pub can_rename: bool,
    pub path: String,
}

impl From<&TreeNode> for TreeItemView {
    fn from(node: &TreeNode) -> Self {
        let children = match &node.kind {
            TreeNodeKind::File => None,
            TreeNodeKind::Directory { children } => Some(children.clone()),
        };
        TreeItemView {
            index: node.id.clone(),
            is_folder: node.is_folder(),
            children,
            can_move: node.can_move,
            can_rename: node.can_rename,
            path: node.handle.path().to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeIndex {
    nodes: HashMap<TreeItemId, TreeNode>,
}

impl TreeIndex {
    pub fn new() -> TreeIndex {
        TreeIndex::default()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Insert a node under its id, returning whatever was there before.
    pub(crate) fn insert(&mut self, node: TreeNode) -> Option<TreeNode> {
        self.nodes.insert(node.id.clone(), node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Child ids that have no node of their own. Empty for a consistent index.
    pub fn dangling_children(&self) -> Vec<TreeItemId> {
        let mut dangling: Vec<TreeItemId> = self
            .nodes
            .values()
            .flat_map(|node| node.children().iter())
            .filter(|child| !self.nodes.contains_key(child.as_str()))
            .cloned()
            .collect();
        dangling.sort();
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(path: &str) -> TreeNode {
        TreeNode::from_handle(EntryHandle::new(path, EntryKind::Directory))
    }

    fn file(path: &str) -> TreeNode {
        TreeNode::from_handle(EntryHandle::new(path, EntryKind::File))
    }

    #[test]
    fn node_kind_drives_folder_flag() {
        let folder = dir("yanta-notes/journal");
        assert_eq!(folder.id, "journal");
        assert!(folder.is_folder());
        assert!(folder.can_move && folder.can_rename);

        let mut note = file("yanta-notes/a.md");
        assert!(!note.is_folder());
        assert!(note.children().is_empty());
        assert!(note.children_mut().is_none());
    }

    #[test]
    fn dangling_children_are_reported() {
        let mut index = TreeIndex::new();
        let mut root = dir("yanta-notes");
        if let Some(children) = root.children_mut() {
            children.push("a.md".to_string());
            children.push("ghost.md".to_string());
        }
        index.insert(root);
        index.insert(file("yanta-notes/a.md"));

        assert_eq!(index.dangling_children(), vec!["ghost.md".to_string()]);
    }

    #[test]
    fn view_omits_children_for_files() {
        let view = TreeItemView::from(&file("yanta-notes/a.md"));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["index"], "a.md");
        assert_eq!(json["isFolder"], false);
        assert!(json.get("children").is_none());

        let view = TreeItemView::from(&dir("yanta-notes"));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["children"], serde_json::json!([]));
    }
}
