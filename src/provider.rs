// The tree provider sits between the tree view and the note store. The view
// pulls items by id and expects the whole tree to be there; the store only
// answers one directory at a time. The provider walks the store once, keeps
// the result in a TreeIndex, and patches or rebuilds that index as the view
// creates and renames entries.

use crate::errors::{Result, TreeError, TreeErrorType};
use crate::listeners::{ListenerRegistry, Subscription, TreeChangeListener};
use crate::store::{BackingStore, EntryHandle, EntryKind};
use crate::tree::{TreeIndex, TreeItemId, TreeNode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

pub const DEFAULT_BASE_DIR: &str = "yanta-notes";

/// One provider shared by every request. The lock serializes operations, so
/// two first accesses never walk the store twice.
pub type SharedProvider = Arc<tokio::sync::Mutex<VirtualFileTreeProvider>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    NotInitialized,
    Initialized,
    /// The index no longer matches the store and is rebuilt on next access.
    Stale,
}

pub struct VirtualFileTreeProvider {
    store: Arc<dyn BackingStore>,
    root_id: TreeItemId,
    index: TreeIndex,
    state: ProviderState,
    listeners: ListenerRegistry,
}

/// Reject anything that is not a single path component.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        tracing::info!("Rejected item name {:?}", name);
        return Err(TreeError::new(
            TreeErrorType::InvalidName,
            format!("{:?} is not a valid file or folder name", name),
        ));
    }
    Ok(())
}

impl VirtualFileTreeProvider {
    pub fn new(store: Arc<dyn BackingStore>) -> VirtualFileTreeProvider {
        VirtualFileTreeProvider::with_base_dir(store, DEFAULT_BASE_DIR)
    }

    /// Build a provider whose root is the directory `base_dir` at the top of the store.
    pub fn with_base_dir(store: Arc<dyn BackingStore>, base_dir: &str) -> VirtualFileTreeProvider {
        VirtualFileTreeProvider {
            store,
            root_id: base_dir.to_string(),
            index: TreeIndex::new(),
            state: ProviderState::NotInitialized,
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn state(&self) -> ProviderState {
        self.state
    }

    /// The current index. Only trustworthy while the state is `Initialized`.
    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    /// Load the index from the store unless it is already loaded and current.
    #[instrument(skip(self), fields(root = %self.root_id))]
    pub async fn ensure_initialized(&mut self) -> Result<()> {
        if self.state == ProviderState::Initialized {
            return Ok(());
        }
        let root_path = PathBuf::from(&self.root_id);
        let root = if self.store.exists(&root_path).await? {
            EntryHandle::new(root_path, EntryKind::Directory)
        } else {
            tracing::info!("Note directory {} does not exist, creating it", self.root_id);
            self.store.create_dir(&root_path).await?
        };

        let index = self.walk(root).await?;
        let dangling = index.dangling_children();
        if !dangling.is_empty() {
            tracing::warn!(?dangling, "Loaded tree has children without nodes");
        }
        tracing::info!("Loaded {} tree items from {}", index.len(), self.root_id);
        self.index = index;
        self.state = ProviderState::Initialized;
        Ok(())
    }

    /// Depth-first walk of the store below `root`, one store call at a time.
    async fn walk(&self, root: EntryHandle) -> Result<TreeIndex> {
        let mut index = TreeIndex::new();
        let mut pending = vec![root];

        while let Some(dir) = pending.pop() {
            let children = self.store.children(&dir).await?;
            let mut node = TreeNode::from_handle(dir);
            let mut subdirs = Vec::new();
            if let Some(child_ids) = node.children_mut() {
                for child in children {
                    child_ids.push(child.name());
                    if child.is_dir() {
                        subdirs.push(child);
                    } else {
                        Self::insert_walked(&mut index, TreeNode::from_handle(child));
                    }
                }
            }
            Self::insert_walked(&mut index, node);
            // Reversed so the first child is walked first
            pending.extend(subdirs.into_iter().rev());
        }
        Ok(index)
    }

    fn insert_walked(index: &mut TreeIndex, node: TreeNode) {
        let path = node.handle.path().to_path_buf();
        if let Some(previous) = index.insert(node) {
            tracing::warn!(
                "Item {} at {} replaces the item with the same name at {}",
                previous.id,
                path.display(),
                previous.handle.path().display()
            );
        }
    }

    #[instrument(skip(self))]
    pub async fn get_tree_item(&mut self, id: &str) -> Result<TreeNode> {
        self.ensure_initialized().await?;
        self.index.get(id).cloned().ok_or_else(|| {
            tracing::info!("No tree item with id {}", id);
            TreeError::not_found(format!("Error getting tree item with id: {}", id))
        })
    }

    #[instrument(skip(self))]
    pub async fn get_tree_items(&mut self, ids: &[TreeItemId]) -> Result<Vec<TreeNode>> {
        self.ensure_initialized().await?;
        ids.iter()
            .map(|id| {
                self.index.get(id).cloned().ok_or_else(|| {
                    tracing::info!("No tree item with id {}", id);
                    TreeError::not_found(format!("Error getting tree items with id: {}", id))
                })
            })
            .collect()
    }

    /// Accepted so the view can report drag-and-drop reorders. Nothing is
    /// persisted; the store's own ordering wins on the next load.
    pub async fn on_change_item_children(
        &mut self,
        id: &str,
        new_children: &[TreeItemId],
    ) -> Result<()> {
        tracing::debug!(item = id, ?new_children, "Ignoring children change");
        Ok(())
    }

    pub fn on_did_change_tree_data<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[TreeItemId]) + Send + Sync + 'static,
    {
        let listener: TreeChangeListener = Arc::new(listener);
        self.listeners.register(listener)
    }

    /// Rename `item` within its directory.
    ///
    /// `item` is updated in place so a caller holding it sees the new name
    /// right away. Every handle below a renamed directory is now wrong, so the
    /// index is marked stale and reloaded on next access. Listeners are told
    /// about the parent directory.
    #[instrument(skip(self, item), fields(item = %item.id))]
    pub async fn on_rename_item(&mut self, item: &mut TreeNode, new_name: &str) -> Result<()> {
        validate_name(new_name)?;
        if item.id == self.root_id && item.handle.parent().is_none() {
            return Err(TreeError::new(
                TreeErrorType::InvalidPath,
                "The note directory cannot be renamed".to_string(),
            ));
        }
        // Ids are base names, so the new name must be free across the whole tree
        self.ensure_initialized().await?;
        if self.index.contains(new_name) {
            tracing::warn!("Cannot rename {} to {}: name is taken", item.id, new_name);
            return Err(TreeError::conflict(format!(
                "An item named {} already exists",
                new_name
            )));
        }
        let parent = item.handle.parent().map(Path::to_path_buf).ok_or_else(|| {
            TreeError::parent_not_found(format!("Parent of {} not found", item.id))
        })?;
        let destination = parent.join(new_name);

        if !self.store.exists(item.handle.path()).await? {
            tracing::info!("Item {} is no longer in the store", item.id);
            return Err(TreeError::not_found(format!(
                "{} no longer exists",
                item.handle.path().display()
            )));
        }
        if self.store.exists(&destination).await? {
            tracing::warn!("Cannot rename {} to {}: name is taken", item.id, new_name);
            return Err(TreeError::conflict(format!(
                "{} already exists",
                destination.display()
            )));
        }

        let moved = self.store.move_to(&item.handle, &destination).await?;
        tracing::info!("Renamed {} to {}", item.id, new_name);
        item.id = new_name.to_string();
        item.handle = moved;
        self.state = ProviderState::Stale;

        let parent_id = parent
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root_id.clone());
        self.listeners.notify(&[parent_id]);
        Ok(())
    }

    /// Create a folder next to the focused item. See [`Self::create_file`].
    pub async fn create_folder(&mut self, focused: Option<&str>, name: &str) -> Result<TreeNode> {
        self.create_entry(focused, name, EntryKind::Directory).await
    }

    /// Create an empty file. A focused folder receives the new entry as a
    /// child; a focused file gets it as a sibling. Without focus the entry
    /// goes into the note directory.
    pub async fn create_file(&mut self, focused: Option<&str>, name: &str) -> Result<TreeNode> {
        self.create_entry(focused, name, EntryKind::File).await
    }

    #[instrument(skip(self))]
    async fn create_entry(
        &mut self,
        focused: Option<&str>,
        name: &str,
        kind: EntryKind,
    ) -> Result<TreeNode> {
        validate_name(name)?;
        self.ensure_initialized().await?;

        let focused_id = focused.unwrap_or(self.root_id.as_str()).to_string();
        let parent_id = self.resolve_parent(&focused_id)?;
        let parent_path = self
            .index
            .get(&parent_id)
            .map(|parent| parent.handle.path().to_path_buf())
            .ok_or_else(|| TreeError::parent_not_found(format!("Parent {} not found", parent_id)))?;
        let target = parent_path.join(name);

        // Files and folders share one namespace per directory
        if self.store.exists(&target).await? {
            let what = match kind {
                EntryKind::File => "File",
                EntryKind::Directory => "Folder",
            };
            tracing::warn!("{} {} already exists", what, target.display());
            return Err(TreeError::conflict(format!("{} already exists", what)));
        }
        if self.index.contains(name) {
            tracing::warn!("An item named {} already exists elsewhere in the tree", name);
            return Err(TreeError::conflict(format!(
                "An item named {} already exists",
                name
            )));
        }

        let handle = match kind {
            EntryKind::File => self.store.write(&target, b"").await?,
            EntryKind::Directory => self.store.create_dir(&target).await?,
        };
        let node = TreeNode::from_handle(handle);
        self.index.insert(node.clone());
        match self.index.get_mut(&parent_id).and_then(TreeNode::children_mut) {
            Some(children) => children.push(node.id.clone()),
            None => {
                return Err(TreeError::parent_not_found(format!(
                    "Parent {} not found",
                    parent_id
                )))
            }
        }
        tracing::info!("Created {} in {}", node.id, parent_id);

        self.listeners.notify(&[parent_id]);
        Ok(node)
    }

    /// The directory a new entry goes into when `focused_id` has focus.
    fn resolve_parent(&self, focused_id: &str) -> Result<TreeItemId> {
        let focused = self.index.get(focused_id).ok_or_else(|| {
            TreeError::parent_not_found(format!("Current focused index {} not found", focused_id))
        })?;
        if focused.is_folder() {
            return Ok(focused.id.clone());
        }

        let parent_id = focused
            .handle
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TreeError::parent_not_found("Parent not found".to_string()))?;
        match self.index.get(&parent_id) {
            Some(parent) if parent.is_folder() => Ok(parent_id),
            _ => {
                tracing::error!("Parent {} of {} is missing from the index", parent_id, focused_id);
                Err(TreeError::parent_not_found(format!(
                    "Parent {} of {} not found",
                    parent_id, focused_id
                )))
            }
        }
    }

    /// Read the content of a note.
    #[instrument(skip(self))]
    pub async fn read_item_content(&mut self, id: &str) -> Result<Vec<u8>> {
        let node = self.file_node(id).await?;
        Ok(self.store.read(node.handle.path()).await?)
    }

    /// Replace the content of a note. The tree shape is unchanged, so no
    /// listener is notified.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn write_item_content(&mut self, id: &str, data: &[u8]) -> Result<()> {
        let node = self.file_node(id).await?;
        self.store.write(node.handle.path(), data).await?;
        Ok(())
    }

    async fn file_node(&mut self, id: &str) -> Result<TreeNode> {
        let node = self.get_tree_item(id).await?;
        if node.is_folder() {
            return Err(TreeError::new(
                TreeErrorType::InvalidPath,
                format!("{} is a folder", id),
            ));
        }
        Ok(node)
    }
}
