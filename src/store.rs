// The note store the tree is built from. Entries are addressed by paths relative
// to the store root, with "/" separated components. The notes themselves live
// under a single base directory inside the store.

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// Reference to one entry in a [`BackingStore`].
///
/// A handle is just a location and a kind. It does not keep the entry alive,
/// and it goes stale when the entry (or one of its ancestors) is moved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    path: PathBuf,
    kind: EntryKind,
}

impl EntryHandle {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Base name of the entry.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the containing directory, or `None` for an entry at the store root.
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Handle-based persistent store backing the tree.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// True if a file or a directory exists at `path`.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Create a directory. Missing parents are created as well.
    async fn create_dir(&self, path: &Path) -> io::Result<EntryHandle>;

    /// Write a file, replacing any previous content.
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<EntryHandle>;

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Direct children of a directory, sorted by name.
    async fn children(&self, dir: &EntryHandle) -> io::Result<Vec<EntryHandle>>;

    /// Move an entry (and everything below it) to `dest`.
    ///
    /// Fails with `AlreadyExists` if something is already at `dest`.
    async fn move_to(&self, handle: &EntryHandle, dest: &Path) -> io::Result<EntryHandle>;
}

/// Normalize a store path. Absolute prefixes and `.` are dropped; `..` is
/// rejected so nothing can address entries outside the store.
pub(crate) fn normalize(path: &Path) -> io::Result<PathBuf> {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => result.push(part),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path escapes the store: {}", path.display()),
                ))
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_name_and_parent() {
        let handle = EntryHandle::new("yanta-notes/journal/today.md", EntryKind::File);
        assert_eq!(handle.name(), "today.md");
        assert_eq!(handle.parent(), Some(Path::new("yanta-notes/journal")));
        assert!(!handle.is_dir());

        let root = EntryHandle::new("yanta-notes", EntryKind::Directory);
        assert_eq!(root.name(), "yanta-notes");
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn normalize_rejects_parent_components() {
        assert_eq!(
            normalize(Path::new("/yanta-notes/./a.md")).unwrap(),
            PathBuf::from("yanta-notes/a.md")
        );
        let err = normalize(Path::new("yanta-notes/../../etc")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
